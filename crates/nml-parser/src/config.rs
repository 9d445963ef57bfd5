/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Parser and renderer configuration.
//!
//! Configuration files are TOML:
//!
//! ```toml
//! [parser]
//! max_nesting_depth = 64
//!
//! [render]
//! tex_enabled = true
//! tex_dir = "tex"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default bound on nested sub-parses
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Deepest allowed chain of nested parses (list entries, quotes,
    /// includes, ...). Exceeding it fails the parse.
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Options handed to a renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub tex_enabled: bool,
    pub tex_dir: PathBuf,
    pub cache_enabled: bool,
    pub cache_dir: PathBuf,
    pub aux_processing_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NmlConfig {
    pub parser: ParserConfig,
    pub render: RenderOptions,
}

impl NmlConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NmlConfig::default();
        assert_eq!(config.parser.max_nesting_depth, 128);
        assert!(!config.render.tex_enabled);
        assert_eq!(NmlConfig::from_toml_str("").unwrap(), config);
    }

    #[test]
    fn test_partial_toml() {
        let config = NmlConfig::from_toml_str(
            r#"
[parser]
max_nesting_depth = 8

[render]
cache_enabled = true
cache_dir = "/tmp/nml-cache"
"#,
        )
        .unwrap();

        assert_eq!(config.parser.max_nesting_depth, 8);
        assert!(config.render.cache_enabled);
        assert_eq!(config.render.cache_dir, PathBuf::from("/tmp/nml-cache"));
        assert!(!config.render.tex_enabled);
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(NmlConfig::from_toml_str("[parser]\nmax_nesting_depth = \"deep\"").is_err());
    }
}
