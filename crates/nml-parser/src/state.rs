/*
 * state.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Per-parse mutable state.

use crate::pattern::{CachedMatch, PatternTable};
use nml_syntax::{OrderedBullet, Style};
use std::collections::HashMap;

/// One open list level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFrame {
    pub ordered: bool,
    /// Counter of the next entry
    pub counter: usize,
    /// Numbering of ordered frames, checked on every entry
    pub bullet: Option<OrderedBullet>,
}

/// Result of the last search of one table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSlot {
    Unsearched,
    Missing,
    Found(CachedMatch),
}

#[derive(Debug, Default)]
pub struct ScanState {
    pub lists: Vec<ListFrame>,
    pub style: Style,
    /// Open state of each custom style, by name
    pub custom_styles: HashMap<String, bool>,
    /// Nesting depth of each custom presentation, by name
    pub presentation_depth: HashMap<String, usize>,
    cache: Vec<MatchSlot>,
    /// Match being handled
    pub current: Option<CachedMatch>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_custom_style_open(&self, name: &str) -> bool {
        self.custom_styles.get(name).copied().unwrap_or(false)
    }

    /// Flip a custom style, returning whether it is now open.
    pub fn toggle_custom_style(&mut self, name: &str) -> bool {
        let open = self.custom_styles.entry(name.to_string()).or_insert(false);
        *open = !*open;
        *open
    }

    /// Search every stale entry of `table` from `cursor`.
    ///
    /// A cached match at or after `cursor` is still the first match from
    /// `cursor`, and an entry with no match stays without one. The cache is
    /// rebuilt when the table grew.
    pub fn refresh(&mut self, table: &PatternTable, content: &str, cursor: usize) {
        if self.cache.len() != table.len() {
            self.cache = vec![MatchSlot::Unsearched; table.len()];
        }
        let cursor = cursor.min(content.len());
        for (slot, entry) in self.cache.iter_mut().zip(table.entries()) {
            let stale = match slot {
                MatchSlot::Unsearched => true,
                MatchSlot::Missing => false,
                MatchSlot::Found(found) => found.start < cursor,
            };
            if stale {
                *slot = entry
                    .trigger
                    .find_from(content, cursor)
                    .map_or(MatchSlot::Missing, MatchSlot::Found);
            }
        }
    }

    /// Index and match of the earliest cached match. Ties go to the lower
    /// table index.
    pub fn earliest(&self) -> Option<(usize, &CachedMatch)> {
        let mut best: Option<(usize, &CachedMatch)> = None;
        for (index, slot) in self.cache.iter().enumerate() {
            if let MatchSlot::Found(found) = slot
                && best.is_none_or(|(_, current)| found.start < current.start)
            {
                best = Some((index, found));
            }
        }
        best
    }
}
