//! Builder API for diagnostic messages.

use crate::catalog::get_error_info;
use crate::diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage};
use crate::snippet::SourceSnippet;

/// Code used by [`crate::generic_error!`]
pub const GENERIC_CODE: &str = "N-0-99";

/// Builds a [`DiagnosticMessage`] step by step.
///
/// ```
/// use nml_error_reporting::DiagnosticMessageBuilder;
///
/// let error = DiagnosticMessageBuilder::error("Unterminated Style")
///     .with_code("N-1-4")
///     .problem("'Bold' style was not closed")
///     .add_hint("Close it with another `**`?")
///     .build();
/// assert_eq!(error.hints.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    message: DiagnosticMessage,
}

impl DiagnosticMessageBuilder {
    fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            message: DiagnosticMessage::new(kind, title),
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Info, title)
    }

    /// Error titled after its catalog entry. Unknown codes keep the code
    /// as the title.
    pub fn from_code(code: &str) -> Self {
        let title = get_error_info(code).map_or_else(|| code.to_string(), |info| info.title.clone());
        Self::error(title).with_code(code)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.message.code = Some(code.into());
        self
    }

    pub fn problem(mut self, problem: impl Into<String>) -> Self {
        self.message.problem = Some(problem.into());
        self
    }

    fn add(mut self, kind: DetailKind, content: impl Into<String>) -> Self {
        self.message.details.push(DetailItem {
            kind,
            content: content.into(),
        });
        self
    }

    pub fn add_detail(self, content: impl Into<String>) -> Self {
        self.add(DetailKind::Error, content)
    }

    pub fn add_info(self, content: impl Into<String>) -> Self {
        self.add(DetailKind::Info, content)
    }

    pub fn add_note(self, content: impl Into<String>) -> Self {
        self.add(DetailKind::Note, content)
    }

    pub fn add_hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn with_location(mut self, location: SourceSnippet) -> Self {
        self.message.location = Some(location);
        self
    }

    pub fn build(self) -> DiagnosticMessage {
        self.message
    }

    /// Used through [`crate::generic_error!`].
    pub fn generic_error(message: impl Into<String>, file: &str, line: u32) -> DiagnosticMessage {
        Self::error(format!("{} ({}:{})", message.into(), file, line))
            .with_code(GENERIC_CODE)
            .build()
    }
}
