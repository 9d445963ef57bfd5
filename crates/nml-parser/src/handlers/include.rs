/*
 * handlers/include.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::error::{ErrorKind, ParseResult};
use crate::fs::normalize;
use crate::pattern::CachedMatch;
use crate::scanner::Scanner;
use crate::token::trim_identifier;
use std::path::Path;
use tracing::debug;

impl Scanner<'_, '_> {
    /// `#:Inc file`: parse another file in place.
    ///
    /// The file is parsed with its own directory as working directory. Its
    /// elements and side-tables are merged into this document, and the
    /// custom patterns it registered stay active here.
    pub(super) fn handle_include(&mut self, prev: usize, found: &CachedMatch) -> ParseResult<usize> {
        const CATEGORY: &str = "Invalid Include";
        let content = self.content();
        let start = self.enter_line(prev, found.start);
        let end = self.line_end(start);
        let file = trim_identifier(content.get(start + 6..end).unwrap_or_default());
        if file.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                start,
                6,
                CATEGORY,
                "Include requires a filename",
            ));
        }

        let path = normalize(&self.session.cwd.join(file));
        let source = self
            .session
            .engine
            .file_system()
            .read_to_string(&path)
            .map_err(|e| {
                self.error(
                    ErrorKind::IncludeIO,
                    start + 6,
                    file.len(),
                    CATEGORY,
                    format!("Unable to open file '{}'", file),
                )
                .with_hint(format!("{}: {}", path.display(), e))
            })?;
        debug!(path = %path.display(), "including");

        let buffer = self.buffer.nested(path.display().to_string(), source);
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let (included, table) = {
            let mut guard = self.session.enter_dir(dir);
            Scanner::run(&mut *guard, &buffer, Some(&self.doc), self.table.clone())?
        };

        let imported = self.table.import(&table);
        debug!(path = %path.display(), imported, "included");
        self.doc.merge(included);
        Ok(end)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::Engine;
    use crate::error::ErrorKind;
    use crate::fs::MemoryFileSystem;
    use nml_syntax::{Element, Variable};
    use std::path::PathBuf;

    #[test]
    fn test_include_from_subdirectory() {
        let engine = Engine::new()
            .with_working_dir("/book")
            .with_file_system(MemoryFileSystem::with_files([
                ("/book/chapters/one.nml", "#+Logo' logo.png\n#:Inc two.nml\n"),
                ("/book/chapters/two.nml", "![fig](a.png) caption\n"),
            ]));
        let doc = engine
            .parse_str("main", "#:Inc chapters/one.nml\n#+After' end.png\n§{fig}")
            .unwrap();

        assert_eq!(
            doc.variable("Logo"),
            Some(&Variable::Path(PathBuf::from("/book/chapters/logo.png")))
        );
        // The working directory is back to the including file's
        assert_eq!(
            doc.variable("After"),
            Some(&Variable::Path(PathBuf::from("/book/end.png")))
        );
        assert_eq!(doc.figure("fig").map(|entry| entry.id), Some(1));
        assert!(matches!(doc.last(), Some(Element::Reference(_))));
    }

    #[test]
    fn test_missing_include() {
        let engine = Engine::new().with_file_system(MemoryFileSystem::new());
        let err = engine.parse_str("main", "#:Inc nope.nml\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncludeIO);
        assert_eq!(err.message(), "Unable to open file 'nope.nml'");

        let err = engine.parse_str("main", "#:Inc    \n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyContent);
    }

    #[test]
    fn test_self_include_is_bounded() {
        let engine = Engine::new()
            .with_working_dir("")
            .with_file_system(MemoryFileSystem::with_files([("loop.nml", "#:Inc loop.nml\n")]));
        let err = engine.parse_file("loop.nml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NestingTooDeep);
    }
}
