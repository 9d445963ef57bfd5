//! Named source buffers
//!
//! A [`Buffer`] is the unit the scanner works on. Root buffers come from a
//! file or a string; nested buffers are synthesized from a region of a
//! parent (a list entry, a quote body, an expanded variable) and keep the
//! parent chain for error reporting.

use crate::file_info::FileInformation;
use crate::types::Location;
use serde::{Deserialize, Serialize};

/// Where a buffer's first character sits in the buffer that produced it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// Row offset (0-indexed)
    pub row: usize,
    /// Column offset of the first line (0-indexed, in characters)
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buffer {
    name: String,
    content: String,
    origin: Origin,
    /// Names of enclosing buffers, outermost first
    ancestors: Vec<String>,
    #[serde(skip_serializing, default)]
    info: Option<FileInformation>,
}

impl Buffer {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_origin(name, content, Origin::default(), Vec::new())
    }

    fn with_origin(
        name: impl Into<String>,
        content: impl Into<String>,
        origin: Origin,
        ancestors: Vec<String>,
    ) -> Self {
        let content = content.into();
        let info = Some(FileInformation::new(&content));
        Buffer {
            name: name.into(),
            content,
            origin,
            ancestors,
            info,
        }
    }

    /// Child buffer with no positional relation to this one (an included
    /// file, the result of an extension call).
    pub fn nested(&self, name: impl Into<String>, content: impl Into<String>) -> Buffer {
        Self::with_origin(name, content, Origin::default(), self.child_ancestors())
    }

    /// Child buffer whose content starts at `offset` in this buffer.
    pub fn nested_at(
        &self,
        name: impl Into<String>,
        content: impl Into<String>,
        offset: usize,
    ) -> Buffer {
        let loc = self.location(offset);
        let origin = Origin {
            row: loc.row,
            column: loc.column,
        };
        Self::with_origin(name, content, origin, self.child_ancestors())
    }

    fn child_ancestors(&self) -> Vec<String> {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(self.name.clone());
        ancestors
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    /// Nesting depth; root buffers are at depth 0
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    fn info(&self) -> FileInformation {
        // Deserialized buffers lose the index
        match &self.info {
            Some(info) => info.clone(),
            None => FileInformation::new(&self.content),
        }
    }

    /// Largest char boundary not after `offset`, clamped to the content.
    pub fn floor_boundary(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.content.len());
        while !self.content.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    /// Text from `start` up to (not including) the next newline.
    pub fn line_from(&self, start: usize) -> &str {
        let start = self.floor_boundary(start);
        let rest = &self.content[start..];
        match rest.find('\n') {
            Some(end) => &rest[..end],
            None => rest,
        }
    }

    /// Byte span of the line containing `offset`, without the newline.
    pub fn line_bounds(&self, offset: usize) -> (usize, usize) {
        let offset = self.floor_boundary(offset);
        let info = self.info();
        info.row_of(offset)
            .and_then(|row| info.line_span(row))
            .unwrap_or((0, self.content.len()))
    }

    /// Absolute position of `offset`, shifted by this buffer's origin.
    /// Columns count characters.
    pub fn location(&self, offset: usize) -> Location {
        let offset = self.floor_boundary(offset);
        let info = self.info();
        let row = info.row_of(offset).unwrap_or(0);
        let (line_start, _) = info.line_span(row).unwrap_or((0, 0));
        let column = self.content[line_start..offset].chars().count();

        if row == 0 {
            Location {
                offset,
                row: self.origin.row,
                column: self.origin.column + column,
            }
        } else {
            Location {
                offset,
                row: self.origin.row + row,
                column,
            }
        }
    }
}
