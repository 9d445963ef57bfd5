/*
 * handlers/definition.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::error::{ErrorKind, ParseResult};
use crate::fs::normalize;
use crate::pattern::CachedMatch;
use crate::scanner::Scanner;
use crate::token::read_continued;
use nml_syntax::{ProxyError, Variable};
use tracing::trace;

/// How a definition stores its value, from the name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefinitionKind {
    Text,
    /// `#+Name' path`
    Path,
    /// `#+Name& Other`
    Proxy,
    /// `#+Name% Other`
    Call,
}

impl DefinitionKind {
    fn from_name(name: &str) -> (DefinitionKind, &str) {
        if let Some(base) = name.strip_suffix('\'') {
            (DefinitionKind::Path, base)
        } else if let Some(base) = name.strip_suffix('&') {
            (DefinitionKind::Proxy, base)
        } else if let Some(base) = name.strip_suffix('%') {
            (DefinitionKind::Call, base)
        } else {
            (DefinitionKind::Text, name)
        }
    }

    fn category(self) -> &'static str {
        match self {
            DefinitionKind::Text => "Invalid Definition",
            DefinitionKind::Path => "Invalid Path Definition",
            DefinitionKind::Proxy => "Invalid Proxy Definition",
            DefinitionKind::Call => "Invalid Call Definition",
        }
    }
}

impl Scanner<'_, '_> {
    /// `#+Name value`
    pub(super) fn handle_definition(
        &mut self,
        prev: usize,
        found: &CachedMatch,
    ) -> ParseResult<usize> {
        let content = self.content();
        let start = self.enter_line(prev, found.start);
        let line = &content[start..self.line_end(start)];

        let name = line[2..].split(' ').next().unwrap_or_default();
        let (kind, base) = DefinitionKind::from_name(name);
        let category = kind.category();
        if base.is_empty() {
            return Err(self.error(
                ErrorKind::InvalidSyntax,
                start,
                2,
                category,
                "Variable has no name",
            ));
        }
        if name.len() + 3 >= line.len() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                start,
                name.len() + 2,
                category,
                format!("Variable '{}' has no value", name),
            ));
        }
        if name.contains(['(', ')']) {
            return Err(self.error(
                ErrorKind::InvalidSyntax,
                start,
                name.len() + 2,
                category,
                "Variable name cannot contain parenthesis",
            ));
        }

        let value_start = start + name.len() + 3;
        let (value, end) = read_continued(content, value_start, false);
        if value.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                start,
                name.len() + 2,
                category,
                format!("Variable '{}' has no value", name),
            ));
        }

        let variable = match kind {
            DefinitionKind::Text => Variable::Text(value),
            DefinitionKind::Path => {
                Variable::Path(normalize(&self.session.cwd.join(value.trim())))
            }
            DefinitionKind::Proxy => {
                let target = value.trim();
                self.doc.check_proxy(base, target).map_err(|e| {
                    let kind = match e {
                        ProxyError::Missing(_) => ErrorKind::UnknownReference,
                        ProxyError::Cycle(_) | ProxyError::Dangling(_) => ErrorKind::CyclicProxy,
                    };
                    self.error(kind, value_start, value.len(), category, e.to_string())
                })?;
                Variable::Proxy(target.to_string())
            }
            DefinitionKind::Call => {
                let target = value.trim();
                let Some(resolved) = self.resolve(target) else {
                    return Err(self.error(
                        ErrorKind::UnknownReference,
                        value_start,
                        value.len(),
                        category,
                        format!("Variable '{}' does not exist!", target),
                    ));
                };
                Variable::Text(resolved)
            }
        };

        if let Some(renderer) = self.session.engine.renderer()
            && renderer.is_reserved_variable(base)
        {
            let shown = match &variable {
                Variable::Text(text) => text.clone(),
                Variable::Path(path) => path.display().to_string(),
                Variable::Proxy(target) => self.resolve(target).unwrap_or_default(),
            };
            renderer.check_variable(base, &shown).map_err(|message| {
                self.error(
                    ErrorKind::InvalidSyntax,
                    start,
                    line.len(),
                    category,
                    format!("Invalid value for '{}' ({}): {}", base, renderer.name(), message),
                )
            })?;
        }

        trace!(name = base, ?variable, "variable defined");
        self.doc.set_variable(base, variable);
        Ok(end)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RenderOptions;
    use crate::engine::Engine;
    use crate::error::ErrorKind;
    use crate::renderer::Renderer;
    use nml_syntax::{Document, Variable};
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    fn parse(source: &str) -> Document {
        Engine::new().parse_str("test", source).unwrap()
    }

    #[test]
    fn test_text_and_continuation() {
        let doc = parse("#+Title Hello \\\nworld\n#+Lines a\\\\\nb\n");
        assert_eq!(doc.variable("Title"), Some(&Variable::Text("Hello world".into())));
        assert_eq!(doc.variable("Lines"), Some(&Variable::Text("a\nb".into())));
    }

    #[test]
    fn test_path_proxy_and_call() {
        let engine = Engine::new().with_working_dir("/docs");
        let doc = engine
            .parse_str("test", "#+Img' img/cat.png\n#+Alias& Img\n#+Copy% Alias\n")
            .unwrap();
        assert_eq!(
            doc.variable("Img"),
            Some(&Variable::Path(PathBuf::from("/docs/img/cat.png")))
        );
        assert_eq!(doc.variable("Alias"), Some(&Variable::Proxy("Img".into())));
        assert_eq!(doc.variable("Copy"), Some(&Variable::Text("img/cat.png".into())));
        assert_eq!(
            doc.resolve_variable("Alias", Path::new("/docs")).as_deref(),
            Some("img/cat.png")
        );
    }

    #[test]
    fn test_definition_errors() {
        let parse = |source: &str| Engine::new().parse_str("test", source).unwrap_err();

        let err = parse("#+Empty\n");
        assert_eq!(err.kind(), ErrorKind::EmptyContent);
        assert_eq!(err.message(), "Variable 'Empty' has no value");

        let err = parse("#+' x\n");
        assert_eq!(err.message(), "Variable has no name");
        assert_eq!(err.category(), "Invalid Path Definition");

        let err = parse("#+f(x) 1\n");
        assert_eq!(err.message(), "Variable name cannot contain parenthesis");

        let err = parse("#+A& Missing\n");
        assert_eq!(err.kind(), ErrorKind::UnknownReference);
        assert_eq!(err.message(), "Variable 'Missing' does not exist!");

        let err = parse("#+A% Missing\n");
        assert_eq!(err.kind(), ErrorKind::UnknownReference);

        let err = parse("#+A x\n#+A& A\n");
        assert_eq!(err.kind(), ErrorKind::CyclicProxy);
    }

    struct StrictRenderer;

    impl Renderer for StrictRenderer {
        fn name(&self) -> &str {
            "Strict"
        }

        fn is_reserved_variable(&self, name: &str) -> bool {
            name == "TocDepth"
        }

        fn check_variable(&self, _name: &str, value: &str) -> Result<(), String> {
            value
                .parse::<u8>()
                .map(|_| ())
                .map_err(|_| format!("`{}` is not a depth", value))
        }

        fn render(&self, _: &Document, _: &RenderOptions, _: &mut dyn Write) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_reserved_variable_checked_by_renderer() {
        let engine = Engine::new().with_renderer(StrictRenderer);
        assert!(engine.parse_str("test", "#+TocDepth 3\n").is_ok());

        let err = engine.parse_str("test", "#+TocDepth deep\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSyntax);
        assert_eq!(
            err.message(),
            "Invalid value for 'TocDepth' (Strict): `deep` is not a depth"
        );
    }
}
