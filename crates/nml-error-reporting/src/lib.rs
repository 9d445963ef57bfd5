//! Diagnostics for the NML parser.
//!
//! A [`DiagnosticMessage`] carries a category title, an error code from the
//! embedded catalog, the sentence describing the problem and optionally a
//! [`SourceSnippet`] pointing into the buffer that failed. Messages render
//! as the classic `file:line:col` text with a `~~~^` excerpt, through
//! ariadne for terminals, or as JSON.

pub mod builder;
pub mod catalog;
pub mod diagnostic;
pub mod macros;
pub mod snippet;

pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_error_info, get_subsystem};
pub use diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage};
pub use snippet::{EXCERPT_WIDTH, SourceSnippet};
