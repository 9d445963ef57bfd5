/*
 * style.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Built-in text styles.

use serde::{Deserialize, Serialize};

/// A set of built-in styles stored as a bitset.
///
/// `StylePush`/`StylePop` elements carry a single style; the scanner keeps
/// the set of currently open ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(u8);

impl Style {
    pub const NONE: Style = Style(0);
    pub const BOLD: Style = Style(1);
    pub const UNDERLINE: Style = Style(1 << 1);
    pub const ITALIC: Style = Style(1 << 2);
    pub const VERBATIM: Style = Style(1 << 3);

    /// Single styles in bit order
    pub const ALL: [Style; 4] = [Style::BOLD, Style::UNDERLINE, Style::ITALIC, Style::VERBATIM];

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Style) -> bool {
        !other.is_empty() && self.0 & other.0 == other.0
    }

    /// Flip `other`; returns true if it is now set.
    pub fn toggle(&mut self, other: Style) -> bool {
        self.0 ^= other.0;
        self.contains(other)
    }

    /// The single styles contained in this set
    pub fn iter(self) -> impl Iterator<Item = Style> {
        Style::ALL.into_iter().filter(move |s| self.contains(*s))
    }

    /// Display name of a single style; combined sets have none.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Style::BOLD => Some("Bold"),
            Style::UNDERLINE => Some("Underline"),
            Style::ITALIC => Some("Italic"),
            Style::VERBATIM => Some("Verbatim"),
            _ => None,
        }
    }
}
