/*
 * handlers/mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! One handler per pattern kind.
//!
//! A handler receives the cursor the scan stopped at (`prev`) and the
//! match. Everything between them is plain text the handler emits first.
//! It returns the offset scanning resumes from, which must lie past the
//! match start.

mod blocks;
mod custom;
mod definition;
mod figure;
mod include;
mod inline;
mod list;
mod section;

use crate::error::ParseResult;
use crate::pattern::{CachedMatch, PatternKind};
use crate::scanner::Scanner;
use nml_syntax::{PresentationKind, Style, TexMode};

impl Scanner<'_, '_> {
    pub(crate) fn dispatch(
        &mut self,
        kind: &PatternKind,
        prev: usize,
        found: &CachedMatch,
    ) -> ParseResult<usize> {
        match kind {
            PatternKind::List => self.handle_list(prev, found),
            PatternKind::Section => self.handle_section(prev, found),
            PatternKind::Ruler => self.handle_ruler(prev, found),
            PatternKind::Figure => self.handle_figure(prev, found),
            PatternKind::FigureReference => self.handle_figure_reference(prev, found),
            PatternKind::Link => self.handle_link(prev, found),
            PatternKind::Annotation => self.handle_annotation(prev, found),
            PatternKind::ExternalReference => self.handle_external_reference(prev, found),
            PatternKind::Definition => self.handle_definition(prev, found),
            PatternKind::Include => self.handle_include(prev, found),
            PatternKind::DefineStyle => self.handle_define_style(prev, found),
            PatternKind::DefinePresentation => self.handle_define_presentation(prev, found),
            PatternKind::DefineProcess => self.handle_define_process(prev, found),
            PatternKind::Eval => self.handle_eval(prev, found),
            PatternKind::Call => self.handle_call(prev, found),
            PatternKind::RawInline => self.handle_raw(prev, found, true),
            PatternKind::Raw => self.handle_raw(prev, found, false),
            PatternKind::Comment => self.handle_comment(prev, found),
            PatternKind::Code => self.handle_code(prev, found),
            PatternKind::Quote => self.handle_quote(prev, found),
            PatternKind::LatexMath => self.handle_latex(prev, found, TexMode::Math),
            PatternKind::LatexLine => self.handle_latex(prev, found, TexMode::MathLine),
            PatternKind::LatexNormal => self.handle_latex(prev, found, TexMode::Normal),
            PatternKind::Center => self.handle_presentation(prev, found, PresentationKind::Center),
            PatternKind::Box => self.handle_presentation(prev, found, PresentationKind::Box),
            PatternKind::LeftLine => {
                self.handle_presentation(prev, found, PresentationKind::LeftLine)
            }
            PatternKind::Bold => self.handle_style(prev, found, Style::BOLD),
            PatternKind::Underline => self.handle_style(prev, found, Style::UNDERLINE),
            PatternKind::Italic => self.handle_style(prev, found, Style::ITALIC),
            PatternKind::Verbatim => self.handle_style(prev, found, Style::VERBATIM),
            PatternKind::LongBreak => self.handle_long_break(prev, found),
            PatternKind::ShortBreak => self.handle_short_break(prev, found),
            PatternKind::CustomStyle(name) => self.handle_custom_style(prev, found, name),
            PatternKind::CustomPresentationBegin(name) => {
                self.handle_custom_presentation(prev, found, name, true)
            }
            PatternKind::CustomPresentationEnd(name) => {
                self.handle_custom_presentation(prev, found, name, false)
            }
            PatternKind::CustomProcess(name) => self.handle_custom_process(prev, found, name),
        }
    }

    /// Emit the text before a line-anchored match and return the offset of
    /// the line it starts.
    pub(crate) fn enter_line(&mut self, prev: usize, start: usize) -> usize {
        let content = self.content();
        self.add_text(&content[prev..start]);
        if content.as_bytes().get(start) == Some(&b'\n') {
            start + 1
        } else {
            start
        }
    }

    /// Offset of the newline ending the line at `start`, or the end of
    /// the content.
    pub(crate) fn line_end(&self, start: usize) -> usize {
        start + self.buffer.line_from(start).len()
    }
}
