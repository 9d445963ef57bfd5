/*
 * custom.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! User-defined token types.
//!
//! Custom types pair a trigger with extension callables. Only the names are
//! stored here; the parser looks the callables up through its extension
//! bridge when the trigger fires.

use serde::{Deserialize, Serialize};

/// `#:DefStyle <Name> <Regex>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomStyle {
    pub name: String,
    pub regex: String,
    pub begin: String,
    pub end: String,
    /// Callable applied to the styled elements when the style closes
    pub apply: Option<String>,
}

/// `#:DefPresentation <Name> <RegexBegin> <RegexEnd>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPresentation {
    pub name: String,
    pub regex_begin: String,
    pub regex_end: String,
    pub begin: String,
    pub end: String,
}

/// `#:DefProcess <Name> <RegexBegin> <TokenEnd>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomProcess {
    pub name: String,
    pub regex_begin: String,
    pub token_end: String,
    pub apply: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomType {
    Style(CustomStyle),
    Presentation(CustomPresentation),
    Process(CustomProcess),
}

impl CustomType {
    pub fn name(&self) -> &str {
        match self {
            CustomType::Style(style) => &style.name,
            CustomType::Presentation(presentation) => &presentation.name,
            CustomType::Process(process) => &process.name,
        }
    }

    pub fn as_style(&self) -> Option<&CustomStyle> {
        match self {
            CustomType::Style(style) => Some(style),
            _ => None,
        }
    }

    pub fn as_presentation(&self) -> Option<&CustomPresentation> {
        match self {
            CustomType::Presentation(presentation) => Some(presentation),
            _ => None,
        }
    }

    pub fn as_process(&self) -> Option<&CustomProcess> {
        match self {
            CustomType::Process(process) => Some(process),
            _ => None,
        }
    }
}
