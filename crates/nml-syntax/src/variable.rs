/*
 * variable.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Value bound by a `#+Name value` definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variable {
    /// Plain text
    Text(String),
    /// `#+Name' path`, already joined with the directory it was defined in
    Path(PathBuf),
    /// `#+Name& Other`, resolves `Other` at read time
    Proxy(String),
}

impl Variable {
    /// Display form of a path variable, relative to `base` when possible.
    pub fn display_path(path: &Path, base: &Path) -> String {
        pathdiff::diff_paths(path, base)
            .filter(|relative| !relative.as_os_str().is_empty())
            .unwrap_or_else(|| path.to_path_buf())
            .display()
            .to_string()
    }
}

/// Why a proxy definition was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// The proxied variable does not exist
    #[error("Variable '{0}' does not exist!")]
    Missing(String),

    /// Following the chain comes back to a name already visited
    #[error("Attempting to define a cyclic proxy variable! {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    /// The chain ends on a name that is not defined
    #[error("Proxy chain leads to undefined variable! {}", .0.join(" -> "))]
    Dangling(Vec<String>),
}
