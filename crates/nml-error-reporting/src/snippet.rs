//! Source excerpts attached to diagnostics.

use nml_source_map::Buffer;
use serde::{Deserialize, Serialize};

/// Width of the excerpt window, in characters
pub const EXCERPT_WIDTH: usize = 70;

/// The offending line of a buffer plus the highlighted region.
///
/// Line and column are 1-based and already shifted by the buffer origin.
/// `highlight_start` and `highlight_len` count characters within
/// `line_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSnippet {
    pub name: String,
    /// Enclosing buffer names, outermost first
    pub ancestors: Vec<String>,
    pub line: usize,
    pub column: usize,
    pub line_text: String,
    pub highlight_start: usize,
    pub highlight_len: usize,
}

impl SourceSnippet {
    /// Snippet covering `len` bytes at `offset` in `buffer`.
    ///
    /// The highlight is clipped to the line containing `offset` and is at
    /// least one character wide.
    pub fn from_buffer(buffer: &Buffer, offset: usize, len: usize) -> Self {
        let offset = buffer.floor_boundary(offset);
        let (line_start, line_end) = buffer.line_bounds(offset);
        let content = buffer.content();
        let line_text = &content[line_start..line_end];

        let highlight_start = content[line_start..offset].chars().count();
        let highlight_end = buffer.floor_boundary((offset + len).min(line_end));
        let highlight_len = content[offset..highlight_end.max(offset)]
            .chars()
            .count()
            .max(1);

        let location = buffer.location(offset);
        SourceSnippet {
            name: buffer.name().to_string(),
            ancestors: buffer.ancestors().to_vec(),
            line: location.row + 1,
            column: location.column + 1,
            line_text: line_text.to_string(),
            highlight_start,
            highlight_len,
        }
    }

    /// `name:line:col`
    pub fn position(&self) -> String {
        format!("{}:{}:{}", self.name, self.line, self.column)
    }

    pub fn gutter_width(&self) -> usize {
        self.line.to_string().len() + 3
    }

    /// The numbered line and the `~~~^` indicator beneath it.
    ///
    /// Long lines are cut to a window of [`EXCERPT_WIDTH`] characters that
    /// keeps the end of the highlight visible.
    ///
    /// ```
    /// use nml_error_reporting::SourceSnippet;
    /// use nml_source_map::Buffer;
    ///
    /// let buffer = Buffer::new("doc.nml", "see §{missing}\n");
    /// let snippet = SourceSnippet::from_buffer(&buffer, 4, 11);
    /// assert_eq!(snippet.render_excerpt(), "   1 | see §{missing}\n     | ~~~~^\n");
    /// ```
    pub fn render_excerpt(&self) -> String {
        let chars: Vec<char> = self.line_text.chars().collect();
        let shown_len = self.highlight_len.min(EXCERPT_WIDTH);
        let window_start = (shown_len + self.highlight_start).max(EXCERPT_WIDTH) - EXCERPT_WIDTH;
        let caret = self.highlight_start - window_start.min(self.highlight_start);

        let from = window_start.min(chars.len());
        let to = (window_start + EXCERPT_WIDTH).min(chars.len());
        let shown: String = chars[from..to].iter().collect();

        let width = self.gutter_width();
        format!(
            "{:>width$} | {}\n{:>width$} | {:~>pad$}\n",
            self.line,
            shown,
            "",
            "^",
            width = width,
            pad = caret + 1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_snippet_from_root_buffer() {
        let buffer = Buffer::new("doc.nml", "first\nsecond line\n");
        let snippet = SourceSnippet::from_buffer(&buffer, 13, 4);

        assert_eq!(snippet.name, "doc.nml");
        assert_eq!(snippet.line, 2);
        assert_eq!(snippet.column, 8);
        assert_eq!(snippet.line_text, "second line");
        assert_eq!(snippet.highlight_start, 7);
        assert_eq!(snippet.highlight_len, 4);
        assert_eq!(snippet.position(), "doc.nml:2:8");
    }

    #[test]
    fn test_highlight_clipped_to_line() {
        let buffer = Buffer::new("doc.nml", "ab\ncd\n");
        let snippet = SourceSnippet::from_buffer(&buffer, 1, 10);
        assert_eq!(snippet.highlight_len, 1);
    }

    #[test]
    fn test_highlight_at_end_of_buffer() {
        let buffer = Buffer::new("doc.nml", "**open");
        let snippet = SourceSnippet::from_buffer(&buffer, 6, 1);
        assert_eq!(snippet.highlight_start, 6);
        assert_eq!(snippet.highlight_len, 1);
        assert_eq!(snippet.render_excerpt(), "   1 | **open\n     | ~~~~~~^\n");
    }

    #[test]
    fn test_nested_snippet_keeps_ancestors_and_origin() {
        let root = Buffer::new("doc.nml", "intro\n- entry §{x}\n");
        let entry = root.nested_at("[list entry]", "entry §{x}\n", 8);
        let snippet = SourceSnippet::from_buffer(&entry, 6, 5);

        assert_eq!(snippet.ancestors, vec!["doc.nml".to_string()]);
        assert_eq!(snippet.line, 2);
        assert_eq!(snippet.column, 9);
        assert_eq!(snippet.highlight_start, 6);
    }

    #[test]
    fn test_gutter_grows_with_line_number() {
        let mut content = "\n".repeat(120);
        content.push_str("x\n");
        let buffer = Buffer::new("doc.nml", content);
        let snippet = SourceSnippet::from_buffer(&buffer, 120, 1);

        assert_eq!(snippet.line, 121);
        assert_eq!(snippet.gutter_width(), 6);
        assert_eq!(snippet.render_excerpt(), "   121 | x\n       | ^\n");
    }

    #[test]
    fn test_long_line_is_windowed() {
        let mut line = "a".repeat(100);
        line.push_str("**");
        let buffer = Buffer::new("doc.nml", line);
        let snippet = SourceSnippet::from_buffer(&buffer, 100, 2);

        let excerpt = snippet.render_excerpt();
        let first = excerpt.lines().next().unwrap();
        // 32 hidden characters, the window ends right after the highlight
        assert_eq!(first, format!("   1 | {}**", "a".repeat(68)));
        let second = excerpt.lines().nth(1).unwrap();
        assert_eq!(second, format!("     | {}^", "~".repeat(68)));
    }
}
