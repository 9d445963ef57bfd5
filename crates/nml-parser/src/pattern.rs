/*
 * pattern.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The ordered pattern table.
//!
//! Each entry pairs a trigger with the handler kind that consumes it. Table
//! order is priority order: when two triggers match at the same offset the
//! earlier entry wins. Custom types defined by a document add entries in
//! fixed bands of the table.

use crate::error::{ErrorKind, ParseError, ParseResult};
use nml_error_reporting::generic_error;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// A match remembered by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedMatch {
    pub start: usize,
    pub len: usize,
    pub text: String,
}

impl CachedMatch {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// A regex plus the characters that must not directly follow a match.
#[derive(Debug, Clone)]
pub struct Trigger {
    regex: Regex,
    not_followed_by: &'static [char],
}

impl Trigger {
    pub fn new(regex: Regex) -> Self {
        Trigger {
            regex,
            not_followed_by: &[],
        }
    }

    fn not_followed_by(mut self, chars: &'static [char]) -> Self {
        self.not_followed_by = chars;
        self
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// First acceptable match starting at or after `start`.
    ///
    /// `^` only matches at the start of `haystack`, so line anchors written
    /// as `(^|\n)` fire on the first line once and on newlines afterwards.
    pub fn find_from(&self, haystack: &str, start: usize) -> Option<CachedMatch> {
        let mut from = start;
        while from <= haystack.len() {
            let found = self.regex.find_at(haystack, from)?;
            let rejected = haystack[found.end()..]
                .chars()
                .next()
                .is_some_and(|next| self.not_followed_by.contains(&next));
            if !rejected {
                return Some(CachedMatch {
                    start: found.start(),
                    len: found.len(),
                    text: found.as_str().to_string(),
                });
            }
            // Retry one character further
            from = found.start()
                + haystack[found.start()..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
        }
        None
    }
}

/// Handler selected by a table entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternKind {
    List,
    Section,
    Ruler,
    Figure,
    FigureReference,
    Link,
    Annotation,
    ExternalReference,
    Definition,
    Include,
    DefineStyle,
    DefinePresentation,
    DefineProcess,
    Eval,
    Call,
    RawInline,
    Raw,
    Comment,
    Code,
    Quote,
    LatexMath,
    LatexLine,
    LatexNormal,
    Center,
    Box,
    LeftLine,
    Bold,
    Underline,
    Italic,
    Verbatim,
    LongBreak,
    ShortBreak,
    /// Toggle of the named custom style
    CustomStyle(String),
    CustomPresentationBegin(String),
    CustomPresentationEnd(String),
    CustomProcess(String),
}

impl PatternKind {
    pub fn is_custom(&self) -> bool {
        matches!(
            self,
            PatternKind::CustomStyle(_)
                | PatternKind::CustomPresentationBegin(_)
                | PatternKind::CustomPresentationEnd(_)
                | PatternKind::CustomProcess(_)
        )
    }
}

#[derive(Debug, Clone)]
pub struct PatternEntry {
    /// Unique within a table
    pub id: String,
    pub kind: PatternKind,
    pub trigger: Trigger,
}

impl PatternEntry {
    pub fn new(id: impl Into<String>, kind: PatternKind, trigger: Trigger) -> Self {
        PatternEntry {
            id: id.into(),
            kind,
            trigger,
        }
    }

    /// Entry for a regex written in a document. Regexes that fail to
    /// compile or that match the empty string are rejected with the
    /// compiler's message.
    pub fn custom(id: impl Into<String>, kind: PatternKind, regex: &str) -> Result<Self, String> {
        let regex = Regex::new(regex).map_err(|e| e.to_string())?;
        if regex.is_match("") {
            return Err(format!("Regex `{}` matches the empty string", regex.as_str()));
        }
        Ok(Self::new(id, kind, Trigger::new(regex)))
    }
}

/// Anchor ids of the custom bands
pub const STYLE_BAND: &str = "verbatim";
pub const PRESENTATION_BAND: &str = "box";
pub const PROCESS_BAND: &str = "eval";

fn builtin_entries() -> Vec<PatternEntry> {
    let rows: [(&str, PatternKind, &str, &'static [char]); 32] = [
        ("list", PatternKind::List, r"(^|\n)[ \t]*[-*]+[ \t]", &[]),
        ("section", PatternKind::Section, r"(^|\n)#+(\*{1,2})?[ \t]", &[]),
        ("ruler", PatternKind::Ruler, r"(^|\n)={3,}", &[]),
        ("figure", PatternKind::Figure, r"(^|\n)!\[", &[]),
        ("figure-ref", PatternKind::FigureReference, r"§\{", &[]),
        ("link", PatternKind::Link, r"\[([^\[\n][^\n]*)?\]\([^\n]*\)", &[]),
        ("annotation", PatternKind::Annotation, r"\^\{\{", &[]),
        ("external-ref", PatternKind::ExternalReference, r"§\[[^\n]*\]\[[^\n]*\]\(", &[]),
        ("definition", PatternKind::Definition, r"(^|\n)#\+", &[]),
        ("include", PatternKind::Include, r"(^|\n)#:Inc ", &[]),
        ("def-style", PatternKind::DefineStyle, r"(^|\n)#:DefStyle ", &[]),
        (
            "def-presentation",
            PatternKind::DefinePresentation,
            r"(^|\n)#:DefPresentation ",
            &[],
        ),
        ("def-process", PatternKind::DefineProcess, r"(^|\n)#:DefProcess ", &[]),
        ("eval", PatternKind::Eval, r"%%", &[]),
        ("call", PatternKind::Call, r"%", &[]),
        ("raw-inline", PatternKind::RawInline, r"\{\{\{", &[]),
        ("raw", PatternKind::Raw, r"\{\{", &[]),
        ("comment", PatternKind::Comment, r"::", &[]),
        ("code", PatternKind::Code, r"(^|\n)```", &[]),
        ("quote", PatternKind::Quote, r"(^|\n)>", &[]),
        ("latex-math", PatternKind::LatexMath, r"\$", &['$', '|']),
        ("latex-line", PatternKind::LatexLine, r"\$\$", &['$']),
        ("latex-normal", PatternKind::LatexNormal, r"\$\|", &[]),
        ("center", PatternKind::Center, r"\[\[", &['[', '|']),
        ("box", PatternKind::Box, r"\[\[\[", &[]),
        ("left-line", PatternKind::LeftLine, r"\[\[\|", &[]),
        ("bold", PatternKind::Bold, r"\*\*", &[]),
        ("underline", PatternKind::Underline, r"__", &[]),
        ("italic", PatternKind::Italic, r"\*", &['*']),
        ("verbatim", PatternKind::Verbatim, r"=", &[]),
        ("long-break", PatternKind::LongBreak, r"\n{2,}[^#]", &[]),
        ("short-break", PatternKind::ShortBreak, r"\n[^\n]", &[]),
    ];

    rows.into_iter()
        .map(|(id, kind, regex, not_followed_by)| {
            let regex = Regex::new(regex).expect("builtin pattern regex");
            PatternEntry::new(id, kind, Trigger::new(regex).not_followed_by(not_followed_by))
        })
        .collect()
}

static BUILTIN: Lazy<PatternTable> = Lazy::new(|| PatternTable {
    entries: builtin_entries(),
});

#[derive(Debug, Clone)]
pub struct PatternTable {
    entries: Vec<PatternEntry>,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PatternTable {
    /// The default table every top-level parse starts from
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&PatternEntry> {
        self.entries.get(index)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Insert `entry` in the band following `anchor`: after the anchor and
    /// after custom entries already placed behind it.
    pub fn insert_after(&mut self, anchor: &str, entry: PatternEntry) -> ParseResult<usize> {
        let Some(anchor_pos) = self.position(anchor) else {
            return Err(ParseError::internal(generic_error!(format!(
                "Pattern anchor '{}' is not in the table",
                anchor
            ))));
        };
        let mut index = anchor_pos + 1;
        while self
            .entries
            .get(index)
            .is_some_and(|next| next.kind.is_custom())
        {
            index += 1;
        }
        debug!(id = %entry.id, anchor, index, "pattern registered");
        self.entries.insert(index, entry);
        Ok(index)
    }

    /// Copy the entries of `other` this table lacks, each right after the
    /// entry preceding it in `other`.
    pub fn import(&mut self, other: &PatternTable) -> usize {
        let mut imported = 0;
        for (index, entry) in other.entries.iter().enumerate() {
            if self.contains(&entry.id) {
                continue;
            }
            let at = index
                .checked_sub(1)
                .and_then(|prev| self.position(&other.entries[prev].id))
                .map_or(0, |prev| prev + 1);
            debug!(id = %entry.id, index = at, "pattern imported");
            self.entries.insert(at, entry.clone());
            imported += 1;
        }
        imported
    }
}

/// Reject a document regex with the scanner's error shape.
pub fn compile_custom(
    id: String,
    kind: PatternKind,
    regex: &str,
    category: &str,
) -> ParseResult<PatternEntry> {
    PatternEntry::custom(id, kind, regex).map_err(|message| {
        ParseError::new(
            ErrorKind::InvalidSyntax,
            category,
            format!("Invalid regex `{}`: {}", regex, message),
        )
    })
}
