/*
 * outline.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Section numbering and table of contents.

use crate::element::Section;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub title: String,
    pub level: usize,
    pub numbered: bool,
    /// Counter path, e.g. `[2, 1]` for section 2.1
    pub numbering: Vec<usize>,
}

impl OutlineEntry {
    /// `2.1`
    pub fn number(&self) -> String {
        self.numbering
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Running section counters plus the table of contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    counters: Vec<usize>,
    entries: Vec<OutlineEntry>,
}

impl Outline {
    /// Count `section` and, if it belongs in the table of contents, list it.
    pub fn record(&mut self, section: &Section) {
        let level = section.level.max(1);
        while self.counters.len() < level {
            self.counters.push(0);
        }
        self.counters.truncate(level);
        if let Some(last) = self.counters.last_mut() {
            *last += 1;
        }

        if section.toc {
            self.entries.push(OutlineEntry {
                title: section.title.clone(),
                level,
                numbered: section.numbered,
                numbering: self.counters.clone(),
            });
        }
    }

    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn section(title: &str, level: usize, toc: bool) -> Section {
        Section {
            title: title.to_string(),
            level,
            numbered: toc,
            toc,
        }
    }

    #[test]
    fn test_numbering_follows_levels() {
        let mut outline = Outline::default();
        outline.record(&section("One", 1, true));
        outline.record(&section("One.One", 2, true));
        outline.record(&section("One.Two", 2, true));
        outline.record(&section("Two", 1, true));
        outline.record(&section("Two.One.One", 3, true));

        let numbers: Vec<String> = outline.entries().iter().map(OutlineEntry::number).collect();
        assert_eq!(numbers, vec!["1", "1.1", "1.2", "2", "2.0.1"]);
    }

    #[test]
    fn test_hidden_sections_still_count() {
        let mut outline = Outline::default();
        outline.record(&section("Hidden", 1, false));
        outline.record(&section("Shown", 1, true));

        assert_eq!(outline.entries().len(), 1);
        assert_eq!(outline.entries()[0].number(), "2");
    }
}
