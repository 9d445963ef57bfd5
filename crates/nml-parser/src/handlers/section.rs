/*
 * handlers/section.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::error::{ErrorKind, ParseResult};
use crate::pattern::CachedMatch;
use crate::scanner::Scanner;
use crate::token::trim_identifier;
use nml_syntax::{Element, Ruler, Section};

impl Scanner<'_, '_> {
    /// `# Title`, `#* Unnumbered`, `#** Not in the outline`
    pub(super) fn handle_section(&mut self, prev: usize, found: &CachedMatch) -> ParseResult<usize> {
        let start = self.enter_line(prev, found.start);
        let end = self.line_end(start);
        let line = &self.content()[start..end];

        let level = line.bytes().take_while(|b| *b == b'#').count();
        let rest = &line[level..];
        let (numbered, toc, rest) = if let Some(rest) = rest.strip_prefix("**") {
            (false, false, rest)
        } else if let Some(rest) = rest.strip_prefix('*') {
            (false, true, rest)
        } else {
            (true, true, rest)
        };

        let title = trim_identifier(rest);
        if title.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                start,
                line.len(),
                "Invalid Section",
                "Sections cannot have empty names",
            ));
        }

        self.doc.push(Element::Section(Section {
            title: title.to_string(),
            level,
            numbered,
            toc,
        }));
        Ok(end)
    }

    /// A line of at least three `=`
    pub(super) fn handle_ruler(&mut self, prev: usize, found: &CachedMatch) -> ParseResult<usize> {
        let start = self.enter_line(prev, found.start);
        let end = self.line_end(start);
        let line = &self.content()[start..end];

        if let Some(bad) = line.find(|c| c != '=') {
            return Err(self.error(
                ErrorKind::InvalidSyntax,
                start + bad,
                1,
                "Invalid Ruler",
                "Line may only contain '='",
            ));
        }

        self.doc.push(Element::Ruler(Ruler {
            length: line.len() - 3,
        }));
        Ok(end)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::Engine;
    use crate::error::ErrorKind;
    use nml_syntax::{Element, Ruler, Section};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_section_kinds() {
        let doc = Engine::new()
            .parse_str("test", "# One\n##* Two\n###**  Three \n")
            .unwrap();
        let sections: Vec<&Section> = doc
            .tree()
            .iter()
            .filter_map(|element| match element {
                Element::Section(section) => Some(section),
                _ => None,
            })
            .collect();
        assert_eq!(
            sections,
            vec![
                &Section {
                    title: "One".into(),
                    level: 1,
                    numbered: true,
                    toc: true
                },
                &Section {
                    title: "Two".into(),
                    level: 2,
                    numbered: false,
                    toc: true
                },
                &Section {
                    title: "Three".into(),
                    level: 3,
                    numbered: false,
                    toc: false
                },
            ]
        );
        assert_eq!(doc.outline().entries().len(), 2);
    }

    #[test]
    fn test_empty_section() {
        let err = Engine::new().parse_str("test", "text\n#  \n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyContent);
        assert_eq!(err.category(), "Invalid Section");
    }

    #[test]
    fn test_ruler() {
        let doc = Engine::new().parse_str("test", "=====\n").unwrap();
        assert_eq!(
            doc.tree().iter().collect::<Vec<_>>(),
            vec![&Element::Ruler(Ruler { length: 2 })]
        );

        let err = Engine::new().parse_str("test", "===x\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSyntax);
        assert_eq!(err.message(), "Line may only contain '='");
    }
}
