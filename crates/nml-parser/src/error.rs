/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for NML parsing.

use nml_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder, SourceSnippet};
use nml_source_map::Buffer;
use thiserror::Error;

/// What went wrong, independent of where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A closing delimiter is missing before the end of input
    MalformedToken,
    /// A token body that must not be empty is empty
    EmptyContent,
    /// An inline or custom style is still open at a paragraph boundary
    UnterminatedStyle,
    /// Figure, variable or proxy target lookup failed
    UnknownReference,
    /// A proxy chain loops or ends on an undefined variable
    CyclicProxy,
    /// A list counter cannot be written in the bullet's numbering
    InvalidNumbering,
    /// A file could not be read
    IncludeIO,
    /// A token has the wrong shape
    InvalidSyntax,
    /// A figure or custom type name is already registered
    DuplicateName,
    /// The extension bridge failed or lacks a callable
    Extension,
    /// Sub-parses nested deeper than the configured maximum
    NestingTooDeep,
    /// A bug in the parser itself
    Internal,
}

impl ErrorKind {
    /// Error catalog code
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Internal => "N-0-1",
            ErrorKind::MalformedToken => "N-1-1",
            ErrorKind::EmptyContent => "N-1-2",
            ErrorKind::InvalidSyntax => "N-1-3",
            ErrorKind::UnterminatedStyle => "N-1-4",
            ErrorKind::UnknownReference => "N-2-1",
            ErrorKind::CyclicProxy => "N-2-2",
            ErrorKind::DuplicateName => "N-2-3",
            ErrorKind::InvalidNumbering => "N-3-1",
            ErrorKind::IncludeIO => "N-4-1",
            ErrorKind::Extension => "N-5-1",
            ErrorKind::NestingTooDeep => "N-6-1",
        }
    }
}

/// A fatal parse failure with its rendered diagnostic.
#[derive(Debug, Clone, Error)]
#[error("{}", .diagnostic.to_text())]
pub struct ParseError {
    kind: ErrorKind,
    diagnostic: DiagnosticMessage,
}

impl ParseError {
    /// Error without a source location.
    pub fn new(kind: ErrorKind, category: impl Into<String>, message: impl Into<String>) -> Self {
        let diagnostic = DiagnosticMessageBuilder::error(category)
            .with_code(kind.code())
            .problem(message)
            .build();
        ParseError { kind, diagnostic }
    }

    /// Error pointing at `len` bytes from `offset` in `buffer`.
    pub fn at(
        kind: ErrorKind,
        buffer: &Buffer,
        offset: usize,
        len: usize,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let diagnostic = DiagnosticMessageBuilder::error(category)
            .with_code(kind.code())
            .problem(message)
            .with_location(SourceSnippet::from_buffer(buffer, offset, len))
            .build();
        ParseError { kind, diagnostic }
    }

    /// Wrap a prebuilt diagnostic as an internal error.
    pub fn internal(diagnostic: DiagnosticMessage) -> Self {
        ParseError {
            kind: ErrorKind::Internal,
            diagnostic,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.diagnostic.hints.push(hint.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn diagnostic(&self) -> &DiagnosticMessage {
        &self.diagnostic
    }

    /// The human message, without location or category
    pub fn message(&self) -> &str {
        self.diagnostic.problem.as_deref().unwrap_or_default()
    }

    /// The category, e.g. `Invalid Link`
    pub fn category(&self) -> &str {
        &self.diagnostic.title
    }
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;
