/*
 * handlers/figure.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::error::{ErrorKind, ParseResult};
use crate::pattern::CachedMatch;
use crate::scanner::Scanner;
use crate::token::{char_split, get_token, read_continued, skip_blanks};
use nml_syntax::{Element, Figure, Reference, ReferenceKind};

impl Scanner<'_, '_> {
    /// `![name](path) description`
    pub(super) fn handle_figure(&mut self, prev: usize, found: &CachedMatch) -> ParseResult<usize> {
        const CATEGORY: &str = "Invalid Figure";
        let content = self.content();
        let start = self.enter_line(prev, found.start);
        let line_end = self.line_end(start);

        let Some((name, name_end)) = get_token(content, "]", start + 2, Some(line_end)) else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                start + 1,
                1,
                CATEGORY,
                "Missing closing ']' after figure name",
            ));
        };
        if name.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                start + 1,
                1,
                CATEGORY,
                "Figures cannot have empty names",
            ));
        }
        if content.as_bytes().get(name_end + 1) != Some(&b'(') {
            return Err(self.error(
                ErrorKind::MalformedToken,
                name_end,
                1,
                CATEGORY,
                "Missing '(' + path + ')' after figure name",
            ));
        }
        if self.doc.has_figure(&name) {
            return Err(self.error(
                ErrorKind::DuplicateName,
                start + 2,
                name_end - start - 2,
                CATEGORY,
                format!("A figure named '{}' already exists", name),
            ));
        }

        let path = get_token(content, ")", name_end + 2, Some(line_end));
        let Some((path, path_end)) = path.filter(|(path, _)| !path.is_empty()) else {
            return Err(self.error(
                ErrorKind::EmptyContent,
                name_end + 2,
                1,
                CATEGORY,
                "Missing path in figure",
            ));
        };

        let description_start = skip_blanks(content, path_end + 1, line_end);
        let (mut description, end) = read_continued(content, description_start, false);
        description.push('\n');
        let (parsed, _) =
            self.sub_parse("[figure description]", description, Some(description_start))?;

        self.doc.push(Element::Figure(Figure {
            path,
            name,
            description: parsed.into_tree(),
            id: 0,
        }));
        Ok(end)
    }

    /// `§{name}` or `§{name, custom text}`
    pub(super) fn handle_figure_reference(
        &mut self,
        prev: usize,
        found: &CachedMatch,
    ) -> ParseResult<usize> {
        const CATEGORY: &str = "Invalid Figure Reference";
        if let Some(next) = self.escape_add_text(prev, found.start, "§{") {
            return Ok(next);
        }

        let token = get_token(self.content(), "}", found.end(), None);
        let Some((reference, reference_end)) =
            token.filter(|(reference, _)| !reference.is_empty() && !reference.contains('\n'))
        else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                found.start,
                found.len,
                CATEGORY,
                "Missing terminating '}' after opening '{'",
            ));
        };

        let mut args = char_split(&reference, ',');
        if args.len() > 2 {
            return Err(self.error(
                ErrorKind::InvalidSyntax,
                found.start,
                found.len,
                CATEGORY,
                format!(
                    "Too many arguments given ({}), syntax is `§{{object name, [custom name]}}`",
                    args.len()
                ),
            ));
        }
        let name = if args.len() == 2 { args.pop().unwrap_or_default() } else { String::new() };
        let referencing = args.pop().unwrap_or_default();
        if !self.doc.has_figure(&referencing) {
            return Err(self.error(
                ErrorKind::UnknownReference,
                found.start,
                reference_end - found.start + 1,
                CATEGORY,
                format!("Trying to reference unknown figure '{}'", referencing),
            ));
        }

        self.doc.push(Element::Reference(Reference {
            referencing,
            name,
            kind: ReferenceKind::Figure,
        }));
        Ok(reference_end + 1)
    }
}
