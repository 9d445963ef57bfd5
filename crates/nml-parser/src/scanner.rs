/*
 * scanner.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The scanner loop.
//!
//! Every table entry remembers its next match from the cursor. Each step
//! takes the earliest one (lower table index on ties), hands it to its
//! handler and moves the cursor to wherever the handler stopped. Text
//! between matches becomes `Text` elements. Nested content is parsed by a
//! fresh [`Scanner`] over a synthesized buffer.

use crate::engine::Engine;
use crate::error::{ErrorKind, ParseError, ParseResult};
use crate::pattern::{PatternKind, PatternTable};
use crate::state::ScanState;
use nml_error_reporting::generic_error;
use nml_source_map::Buffer;
use nml_syntax::{Break, Document, Element, ListEnd, NodeId};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use tracing::{debug, trace};

/// State shared by a top-level parse and all of its nested parses.
pub struct Session<'e> {
    pub engine: &'e Engine,
    /// Directory relative paths resolve against
    pub cwd: PathBuf,
    /// Number of scanners currently running
    pub depth: usize,
}

impl<'e> Session<'e> {
    pub fn new(engine: &'e Engine, cwd: PathBuf) -> Self {
        Session {
            engine,
            cwd,
            depth: 0,
        }
    }

    /// Switch the working directory until the guard is dropped.
    pub fn enter_dir(&mut self, dir: PathBuf) -> DirGuard<'_, 'e> {
        let saved = std::mem::replace(&mut self.cwd, dir);
        DirGuard {
            session: self,
            saved,
        }
    }
}

/// Restores the session's previous working directory on drop.
pub struct DirGuard<'s, 'e> {
    session: &'s mut Session<'e>,
    saved: PathBuf,
}

impl<'e> Deref for DirGuard<'_, 'e> {
    type Target = Session<'e>;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl DerefMut for DirGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl Drop for DirGuard<'_, '_> {
    fn drop(&mut self) {
        let left = std::mem::replace(&mut self.session.cwd, std::mem::take(&mut self.saved));
        debug!(left = %left.display(), restored = %self.session.cwd.display(), "working directory restored");
    }
}

pub struct Scanner<'a, 'e> {
    pub(crate) session: &'a mut Session<'e>,
    pub(crate) buffer: &'a Buffer,
    pub(crate) table: PatternTable,
    pub(crate) state: ScanState,
    pub(crate) doc: Document,
}

impl<'a, 'e> Scanner<'a, 'e> {
    /// Parse `buffer` into a new document inheriting from `parent`.
    ///
    /// Returns the document and the pattern table as the parse left it.
    pub fn run(
        session: &'a mut Session<'e>,
        buffer: &'a Buffer,
        parent: Option<&Document>,
        table: PatternTable,
    ) -> ParseResult<(Document, PatternTable)> {
        let max_depth = session.engine.config().max_nesting_depth;
        if session.depth >= max_depth {
            return Err(ParseError::at(
                ErrorKind::NestingTooDeep,
                buffer,
                0,
                0,
                "Nesting Too Deep",
                format!("Nested parses exceed the maximum depth of {}", max_depth),
            )
            .with_hint("Check for a file that includes itself"));
        }

        session.depth += 1;
        debug!(buffer = buffer.name(), depth = session.depth, "scan start");
        let mut scanner = Scanner {
            session,
            buffer,
            table,
            state: ScanState::new(),
            doc: parent.map_or_else(Document::new, Document::inherit),
        };
        let result = scanner.scan();
        scanner.session.depth -= 1;
        result?;

        debug!(
            buffer = buffer.name(),
            depth = scanner.session.depth,
            elements = scanner.doc.tree().len(),
            "scan end"
        );
        Ok((scanner.doc, scanner.table))
    }

    fn scan(&mut self) -> ParseResult<()> {
        let content = self.buffer.content();
        let mut cursor = 0;
        loop {
            self.state.refresh(&self.table, content, cursor);
            let Some((index, found)) = self.state.earliest() else {
                break;
            };
            let found = found.clone();
            let Some(entry) = self.table.get(index) else {
                return Err(ParseError::internal(generic_error!(format!(
                    "Pattern index {} is out of range",
                    index
                ))));
            };
            let kind = entry.kind.clone();
            trace!(pattern = %entry.id, offset = found.start, "match");

            if kind != PatternKind::List {
                self.close_lists();
            }
            self.state.current = Some(found.clone());
            let next = self.dispatch(&kind, cursor, &found)?;
            if next <= found.start {
                return Err(ParseError::internal(generic_error!(format!(
                    "Handler for '{}' did not advance past offset {}",
                    self.table.get(index).map_or("?", |entry| entry.id.as_str()),
                    found.start
                ))));
            }
            cursor = next;
        }
        self.state.current = None;

        self.close_lists();
        let rest = content.get(cursor.min(content.len())..).unwrap_or_default();
        self.add_text(rest);
        self.check_styles(content.len().saturating_sub(1))?;
        self.normalize_breaks();
        Ok(())
    }

    /// Parse `content` as a nested document.
    ///
    /// With `offset`, diagnostics inside the nested buffer are reported at
    /// that position of the current buffer.
    pub(crate) fn sub_parse(
        &mut self,
        name: &str,
        content: String,
        offset: Option<usize>,
    ) -> ParseResult<(Document, PatternTable)> {
        let buffer = match offset {
            Some(at) => self.buffer.nested_at(name, content, at),
            None => self.buffer.nested(name, content),
        };
        Scanner::run(self.session, &buffer, Some(&self.doc), self.table.clone())
    }

    pub(crate) fn content(&self) -> &'a str {
        self.buffer.content()
    }

    /// Error located in the current buffer.
    pub(crate) fn error(
        &self,
        kind: ErrorKind,
        offset: usize,
        len: usize,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> ParseError {
        ParseError::at(kind, self.buffer, offset, len, category, message)
    }

    /// Value of a variable, paths shown relative to the working directory.
    pub(crate) fn resolve(&self, name: &str) -> Option<String> {
        self.doc.resolve_variable(name, &self.session.cwd)
    }

    pub(crate) fn variable_or(&self, name: &str, default: &str) -> String {
        self.doc.variable_or(name, default, &self.session.cwd)
    }

    /// Append text with newlines removed, merging into a trailing `Text`.
    pub(crate) fn add_text(&mut self, text: &str) {
        let text: String = text.chars().filter(|c| *c != '\n').collect();
        if text.is_empty() {
            return;
        }
        self.close_lists();
        match self.doc.last_mut() {
            Some(Element::Text(last)) => last.content.push_str(&text),
            _ => {
                self.doc.push(Element::text(text));
            }
        }
    }

    /// Emit the text before a mid-line trigger at `at`, resolving escapes.
    ///
    /// With an odd number of backslashes before the trigger, half of them
    /// (rounded down) and `literal` are emitted as text and the offset after
    /// the literal is returned. Otherwise half of them are emitted and the
    /// trigger keeps its meaning (`None`). Backslashes before `prev` belong to
    /// an earlier token and are not counted.
    pub(crate) fn escape_add_text(&mut self, prev: usize, at: usize, literal: &str) -> Option<usize> {
        let content = self.content();
        let bytes = content.as_bytes();
        let mut escapes = 0;
        while at > prev + escapes && bytes[at - 1 - escapes] == b'\\' {
            escapes += 1;
        }

        if escapes % 2 == 1 {
            self.add_text(&content[prev..at - escapes / 2 - 1]);
            self.add_text(literal);
            Some(at + literal.len())
        } else {
            self.add_text(&content[prev..at - escapes / 2]);
            None
        }
    }

    /// Close every open list level.
    pub(crate) fn close_lists(&mut self) {
        if self.state.lists.is_empty() {
            return;
        }
        while let Some(frame) = self.state.lists.pop() {
            self.doc.push(Element::ListEnd(ListEnd {
                ordered: frame.ordered,
            }));
        }
        self.clear_bullet_variables();
    }

    pub(crate) fn clear_bullet_variables(&mut self) {
        for name in ["Bullet", "BulletStyle", "BulletCounter"] {
            self.doc.remove_variable(name);
        }
    }

    /// Fail if an inline or custom style is still open.
    pub(crate) fn check_styles(&self, offset: usize) -> ParseResult<()> {
        if let Some(style) = self.state.style.iter().next() {
            return Err(self.error(
                ErrorKind::UnterminatedStyle,
                offset,
                1,
                "Unterminated Style",
                style.name().unwrap_or("?"),
            ));
        }
        if let Some(custom) = self
            .doc
            .custom_types()
            .find(|custom| self.state.is_custom_style_open(custom.name()))
        {
            return Err(self.error(
                ErrorKind::UnterminatedStyle,
                offset,
                1,
                "Unterminated Custom Style",
                custom.name(),
            ));
        }
        Ok(())
    }

    /// Turn a single line break between two inline elements into a space.
    fn normalize_breaks(&mut self) {
        let ids: Vec<NodeId> = self.doc.tree().ids().collect();
        for window in ids.windows(3) {
            let [before, line_break, after] = [window[0], window[1], window[2]];
            let tree = self.doc.tree();
            let (Some(first), Some(middle), Some(last)) =
                (tree.get(before), tree.get(line_break), tree.get(after))
            else {
                continue;
            };
            if !matches!(middle, Element::Break(Break { size: 0 }))
                || !first.is_text_like()
                || !last.is_text_like()
            {
                continue;
            }

            let tree = self.doc.tree_mut();
            match tree.get_mut(before) {
                Some(Element::Text(text)) => text.content.push(' '),
                _ => {
                    tree.insert_before(line_break, Element::text(" "));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use nml_syntax::Style;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ParseResult<Document> {
        Engine::new().parse_str("test", source)
    }

    fn elements(doc: &Document) -> Vec<Element> {
        doc.tree().iter().cloned().collect()
    }

    #[test]
    fn test_plain_text() {
        let doc = parse("just text\n").unwrap();
        assert_eq!(elements(&doc), vec![Element::text("just text")]);
    }

    #[test]
    fn test_line_break_becomes_space() {
        let doc = parse("one\ntwo").unwrap();
        assert_eq!(
            elements(&doc),
            vec![
                Element::text("one "),
                Element::Break(Break { size: 0 }),
                Element::text("two"),
            ]
        );
    }

    #[test]
    fn test_space_inserted_after_style_pop() {
        let doc = parse("**a**\nb").unwrap();
        assert_eq!(
            elements(&doc),
            vec![
                Element::StylePush(Style::BOLD),
                Element::text("a"),
                Element::StylePop(Style::BOLD),
                Element::text(" "),
                Element::Break(Break { size: 0 }),
                Element::text("b"),
            ]
        );
    }

    #[test]
    fn test_paragraph_break() {
        let doc = parse("one\n\n\ntwo").unwrap();
        assert_eq!(
            elements(&doc),
            vec![
                Element::text("one"),
                Element::Break(Break { size: 2 }),
                Element::text("two"),
            ]
        );
    }

    #[test]
    fn test_escape_parity() {
        let doc = parse(r"\**a").unwrap();
        assert_eq!(elements(&doc), vec![Element::text("**a")]);

        let doc = parse(r"\\**a**").unwrap();
        assert_eq!(
            elements(&doc),
            vec![
                Element::text("\\"),
                Element::StylePush(Style::BOLD),
                Element::text("a"),
                Element::StylePop(Style::BOLD),
            ]
        );

        let doc = parse(r"\\\**a").unwrap();
        assert_eq!(elements(&doc), vec![Element::text("\\**a")]);
    }

    #[test]
    fn test_unterminated_style() {
        let err = parse("**open\n\nnext").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnterminatedStyle);
        assert_eq!(err.message(), "Bold");

        let err = parse("=open").unwrap_err();
        assert_eq!(err.message(), "Verbatim");
    }

    #[test]
    fn test_nesting_limit() {
        let engine = Engine::new().with_config(ParserConfig {
            max_nesting_depth: 1,
        });
        assert!(engine.parse_str("test", "flat").is_ok());
        let err = engine.parse_str("test", "- entry\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NestingTooDeep);
    }
}
