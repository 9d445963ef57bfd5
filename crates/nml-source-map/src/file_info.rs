//! Line index over a piece of text

use crate::types::Location;
use serde::{Deserialize, Serialize};

/// Line break index for fast offset lookups
///
/// Stores the byte offset of every newline so that offset-to-row
/// conversion is a binary search instead of a rescan of the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInformation {
    /// Byte offsets of each newline character
    line_breaks: Vec<usize>,

    /// Total length in bytes
    total_length: usize,
}

impl FileInformation {
    /// Build the index by scanning `content` once.
    ///
    /// ```
    /// use nml_source_map::FileInformation;
    ///
    /// let info = FileInformation::new("line 1\nline 2\nline 3");
    /// assert_eq!(info.line_count(), 3);
    /// ```
    pub fn new(content: &str) -> Self {
        let line_breaks: Vec<usize> = content
            .char_indices()
            .filter_map(|(idx, ch)| if ch == '\n' { Some(idx) } else { None })
            .collect();

        FileInformation {
            line_breaks,
            total_length: content.len(),
        }
    }

    /// Row containing `offset`. A newline belongs to the line it terminates.
    pub fn row_of(&self, offset: usize) -> Option<usize> {
        if offset > self.total_length {
            return None;
        }
        Some(match self.line_breaks.binary_search(&offset) {
            Ok(idx) | Err(idx) => idx,
        })
    }

    /// Convert a byte offset to a Location. The column is counted in bytes;
    /// [`crate::Buffer::location`] converts it to characters.
    ///
    /// ```
    /// use nml_source_map::FileInformation;
    ///
    /// let info = FileInformation::new("hello\nworld");
    /// let loc = info.offset_to_location(6).unwrap();
    /// assert_eq!((loc.row, loc.column), (1, 0));
    /// ```
    pub fn offset_to_location(&self, offset: usize) -> Option<Location> {
        let row = self.row_of(offset)?;
        let (line_start, _) = self.line_span(row)?;

        Some(Location {
            offset,
            row,
            column: offset - line_start,
        })
    }

    /// Byte span of a row, excluding its terminating newline
    pub fn line_span(&self, row: usize) -> Option<(usize, usize)> {
        if row > self.line_breaks.len() {
            return None;
        }
        let start = if row == 0 {
            0
        } else {
            self.line_breaks[row - 1] + 1
        };
        let end = self
            .line_breaks
            .get(row)
            .copied()
            .unwrap_or(self.total_length);
        Some((start, end))
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Number of lines; text without newlines still has one line
    pub fn line_count(&self) -> usize {
        self.line_breaks.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file() {
        let info = FileInformation::new("");
        assert_eq!(info.total_length(), 0);
        assert_eq!(info.line_count(), 1);

        let loc = info.offset_to_location(0).unwrap();
        assert_eq!((loc.row, loc.column), (0, 0));
        assert_eq!(info.line_span(0), Some((0, 0)));
    }

    #[test]
    fn test_single_line() {
        let info = FileInformation::new("hello world");
        assert_eq!(info.line_count(), 1);

        let loc = info.offset_to_location(6).unwrap();
        assert_eq!((loc.row, loc.column), (0, 6));

        // End of file is addressable
        let loc = info.offset_to_location(11).unwrap();
        assert_eq!((loc.row, loc.column), (0, 11));
    }

    #[test]
    fn test_newline_belongs_to_its_line() {
        let info = FileInformation::new("ab\ncd\n");
        assert_eq!(info.row_of(2), Some(0));
        assert_eq!(info.row_of(3), Some(1));
        assert_eq!(info.row_of(5), Some(1));
        assert_eq!(info.row_of(6), Some(2));
    }

    #[test]
    fn test_line_spans() {
        let info = FileInformation::new("first\n\nthird");
        assert_eq!(info.line_count(), 3);
        assert_eq!(info.line_span(0), Some((0, 5)));
        assert_eq!(info.line_span(1), Some((6, 6)));
        assert_eq!(info.line_span(2), Some((7, 12)));
        assert_eq!(info.line_span(3), None);
    }

    #[test]
    fn test_out_of_bounds() {
        let info = FileInformation::new("abc");
        assert!(info.offset_to_location(4).is_none());
        assert!(info.row_of(100).is_none());
    }

    #[test]
    fn test_multibyte_columns_are_bytes() {
        let info = FileInformation::new("§a\nb");
        // '§' is two bytes
        let loc = info.offset_to_location(2).unwrap();
        assert_eq!((loc.row, loc.column), (0, 2));
    }
}
