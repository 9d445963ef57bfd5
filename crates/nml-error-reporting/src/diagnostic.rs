//! Core diagnostic message types.

use crate::snippet::SourceSnippet;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    Error,
    Warning,
    Info,
}

impl DiagnosticKind {
    fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
            DiagnosticKind::Info => "Info",
        }
    }
}

/// How detail items are bulleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailKind {
    /// ✖ bullet
    Error,
    /// ℹ bullet
    Info,
    /// • bullet
    Note,
}

impl DetailKind {
    fn bullet(self) -> &'static str {
        match self {
            DetailKind::Error => "✖",
            DetailKind::Info => "ℹ",
            DetailKind::Note => "•",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            DetailKind::Error => "error",
            DetailKind::Info => "info",
            DetailKind::Note => "note",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailItem {
    pub kind: DetailKind,
    pub content: String,
}

/// A diagnostic message.
///
/// The title is the category of the failure ("Invalid Figure Reference"),
/// the problem is the sentence describing this occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    /// Error code such as `N-1-1`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub title: String,

    pub kind: DiagnosticKind,

    pub problem: Option<String>,

    pub details: Vec<DetailItem>,

    /// Guidance for fixing, rendered with a `?` bullet
    pub hints: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceSnippet>,
}

impl DiagnosticMessage {
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            location: None,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Render as plain text.
    ///
    /// With a location the message uses the scanner format:
    ///
    /// ```text
    /// doc.nml:
    /// [list entry]:2:9: Invalid Figure Reference: Trying to reference unknown figure 'x'
    ///    2 | entry §{x}
    ///      | ~~~~~~^
    /// ```
    ///
    /// Without one it falls back to `Error [code]: title` followed by the
    /// problem, details and hints.
    ///
    /// ```
    /// use nml_error_reporting::DiagnosticMessageBuilder;
    ///
    /// let msg = DiagnosticMessageBuilder::error("Include Failed")
    ///     .problem("Unable to open file 'missing.nml'")
    ///     .add_hint("Paths are relative to the including file?")
    ///     .build();
    /// let text = msg.to_text();
    /// assert!(text.starts_with("Error: Include Failed\n"));
    /// assert!(text.contains("? Paths are relative"));
    /// ```
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        match &self.location {
            Some(snippet) => {
                for ancestor in &snippet.ancestors {
                    let _ = writeln!(result, "{}:", ancestor);
                }
                let _ = write!(result, "{}: {}", snippet.position(), self.title);
                if let Some(problem) = &self.problem {
                    let _ = write!(result, ": {}", problem);
                }
                result.push('\n');
                result.push_str(&snippet.render_excerpt());
            }
            None => {
                match &self.code {
                    Some(code) => {
                        let _ = writeln!(result, "{} [{}]: {}", self.kind.label(), code, self.title);
                    }
                    None => {
                        let _ = writeln!(result, "{}: {}", self.kind.label(), self.title);
                    }
                }
                if let Some(problem) = &self.problem {
                    let _ = writeln!(result, "{}", problem);
                }
            }
        }

        for detail in &self.details {
            let _ = writeln!(result, "{} {}", detail.kind.bullet(), detail.content);
        }
        for hint in &self.hints {
            let _ = writeln!(result, "? {}", hint);
        }

        result
    }

    /// Render the located part through ariadne. Returns `None` when the
    /// message has no location.
    pub fn to_ariadne_text(&self) -> Option<String> {
        let snippet = self.location.as_ref()?;
        let mut result = self.render_ariadne_source_context(snippet)?;
        for detail in &self.details {
            let _ = writeln!(result, "{} {}", detail.kind.bullet(), detail.content);
        }
        for hint in &self.hints {
            let _ = writeln!(result, "? {}", hint);
        }
        Some(result)
    }

    /// Render as a JSON value.
    ///
    /// ```
    /// use nml_error_reporting::DiagnosticMessage;
    ///
    /// let json = DiagnosticMessage::error("Cyclic Proxy").with_code("N-2-2").to_json();
    /// assert_eq!(json["kind"], "error");
    /// assert_eq!(json["code"], "N-2-2");
    /// ```
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let kind_str = match self.kind {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Info => "info",
        };

        let mut obj = json!({
            "kind": kind_str,
            "title": self.title,
        });

        if let Some(code) = &self.code {
            obj["code"] = json!(code);
        }
        if let Some(problem) = &self.problem {
            obj["problem"] = json!(problem);
        }
        if !self.details.is_empty() {
            let details: Vec<_> = self
                .details
                .iter()
                .map(|d| json!({"kind": d.kind.as_str(), "content": d.content}))
                .collect();
            obj["details"] = json!(details);
        }
        if !self.hints.is_empty() {
            obj["hints"] = json!(self.hints);
        }
        if let Some(location) = &self.location {
            obj["location"] = json!(location);
        }

        obj
    }

    fn render_ariadne_source_context(&self, snippet: &SourceSnippet) -> Option<String> {
        use ariadne::{Color, Config, Label, Report, ReportKind, Source};

        // Blank lines in front of the excerpt make ariadne print the real
        // line number.
        let padding = "\n".repeat(snippet.line.saturating_sub(1));
        let source = format!("{}{}\n", padding, snippet.line_text);
        let start = snippet.line - 1 + snippet.highlight_start;
        let span = start..start + snippet.highlight_len;

        let (report_kind, color) = match self.kind {
            DiagnosticKind::Error => (ReportKind::Error, Color::Red),
            DiagnosticKind::Warning => (ReportKind::Warning, Color::Yellow),
            DiagnosticKind::Info => (ReportKind::Advice, Color::Cyan),
        };

        let path = snippet.name.clone();
        let mut report = Report::build(report_kind, path.clone(), start)
            .with_config(Config::default().with_color(false));

        report = match &self.code {
            Some(code) => report.with_message(format!("[{}] {}", code, self.title)),
            None => report.with_message(&self.title),
        };

        let label_message = self.problem.as_deref().unwrap_or(&self.title);
        report = report.with_label(
            Label::new((path.clone(), span))
                .with_message(label_message)
                .with_color(color),
        );
        if !snippet.ancestors.is_empty() {
            report = report.with_note(format!("inside {}", snippet.ancestors.join(" > ")));
        }

        let mut output = Vec::new();
        report
            .finish()
            .write((path, Source::from(source.as_str())), &mut output)
            .ok()?;

        String::from_utf8(output).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DiagnosticMessageBuilder;
    use nml_source_map::Buffer;
    use pretty_assertions::assert_eq;

    fn located(buffer: &Buffer, offset: usize, len: usize) -> DiagnosticMessage {
        DiagnosticMessageBuilder::error("Invalid Figure Reference")
            .with_code("N-2-1")
            .problem("Trying to reference unknown figure 'x'")
            .with_location(SourceSnippet::from_buffer(buffer, offset, len))
            .build()
    }

    #[test]
    fn test_to_text_simple_error() {
        let msg = DiagnosticMessage::error("Something went wrong");
        assert_eq!(msg.to_text(), "Error: Something went wrong\n");
    }

    #[test]
    fn test_to_text_with_code() {
        let msg = DiagnosticMessage::error("Something went wrong").with_code("N-1-1");
        assert_eq!(msg.to_text(), "Error [N-1-1]: Something went wrong\n");
    }

    #[test]
    fn test_to_text_located() {
        let buffer = Buffer::new("doc.nml", "see §{x} here\n");
        let msg = located(&buffer, 4, 5);
        assert_eq!(
            msg.to_text(),
            "doc.nml:1:5: Invalid Figure Reference: Trying to reference unknown figure 'x'\n   1 | see §{x} here\n     | ~~~~^\n"
        );
    }

    #[test]
    fn test_to_text_lists_ancestors_first() {
        let root = Buffer::new("doc.nml", "intro\n- entry §{x}\n");
        let entry = root.nested_at("[list entry]", "entry §{x}\n", 8);
        let text = located(&entry, 6, 5).to_text();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "doc.nml:");
        assert!(lines[1].starts_with("[list entry]:2:9: Invalid Figure Reference"));
    }

    #[test]
    fn test_to_text_details_and_hints() {
        let msg = DiagnosticMessageBuilder::error("Invalid Numbering")
            .problem("`0` cannot be represented using letters")
            .add_detail("Bullet format is `a)`")
            .add_info("Letters start at 1")
            .add_hint("Set '#+BulletCounter' to 1 or more?")
            .build();

        let text = msg.to_text();
        assert!(text.contains("Error: Invalid Numbering"));
        assert!(text.contains("✖ Bullet format is `a)`"));
        assert!(text.contains("ℹ Letters start at 1"));
        assert!(text.contains("? Set '#+BulletCounter' to 1 or more?"));
    }

    #[test]
    fn test_ariadne_requires_location() {
        let msg = DiagnosticMessage::error("No location");
        assert!(msg.to_ariadne_text().is_none());
    }

    #[test]
    fn test_ariadne_output_mentions_file_and_message() {
        let buffer = Buffer::new("doc.nml", "line one\nsee §{x}\n");
        let msg = located(&buffer, 13, 5);
        let text = msg.to_ariadne_text().unwrap();

        assert!(text.contains("[N-2-1] Invalid Figure Reference"));
        assert!(text.contains("doc.nml"));
        assert!(text.contains("Trying to reference unknown figure 'x'"));
        assert!(text.contains("see §{x}"));
    }

    #[test]
    fn test_to_json_full_message() {
        let buffer = Buffer::new("doc.nml", "see §{x}\n");
        let mut msg = located(&buffer, 4, 5);
        msg.hints.push("Define the figure first?".to_string());

        let json = msg.to_json();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["code"], "N-2-1");
        assert_eq!(json["problem"], "Trying to reference unknown figure 'x'");
        assert_eq!(json["hints"][0], "Define the figure first?");
        assert_eq!(json["location"]["name"], "doc.nml");
        assert_eq!(json["location"]["line"], 1);
        assert_eq!(json["location"]["column"], 5);
    }

    #[test]
    fn test_to_json_omits_missing_fields() {
        let json = DiagnosticMessage::warning("Careful").to_json();
        assert_eq!(json["kind"], "warning");
        assert!(json.get("code").is_none());
        assert!(json.get("location").is_none());
        assert!(json.get("details").is_none());
    }
}
