//! Error code catalog.
//!
//! Maps codes such as `N-1-1` to their subsystem and default wording. The
//! catalog is embedded at compile time from `error_catalog.json`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata for an error code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorCodeInfo {
    /// Subsystem name (e.g., "syntax", "list", "include")
    pub subsystem: String,

    /// Short title for the error
    pub title: String,

    /// Default message
    pub message_template: String,

    /// Version that introduced the code
    pub since_version: String,
}

/// Global error catalog, parsed on first use.
///
/// # Panics
///
/// Panics if the embedded JSON is invalid.
pub static ERROR_CATALOG: Lazy<HashMap<String, ErrorCodeInfo>> = Lazy::new(|| {
    let json_data = include_str!("../error_catalog.json");
    serde_json::from_str(json_data).expect("Invalid error catalog JSON")
});

/// Look up error code information.
///
/// ```
/// use nml_error_reporting::catalog::get_error_info;
///
/// let info = get_error_info("N-2-2").unwrap();
/// assert_eq!(info.title, "Cyclic Proxy");
/// ```
pub fn get_error_info(code: &str) -> Option<&ErrorCodeInfo> {
    ERROR_CATALOG.get(code)
}

/// Subsystem name for an error code.
///
/// ```
/// use nml_error_reporting::catalog::get_subsystem;
///
/// assert_eq!(get_subsystem("N-0-1"), Some("internal"));
/// ```
pub fn get_subsystem(code: &str) -> Option<&str> {
    ERROR_CATALOG.get(code).map(|info| info.subsystem.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        assert!(!ERROR_CATALOG.is_empty());
    }

    #[test]
    fn test_codes_follow_format() {
        for code in ERROR_CATALOG.keys() {
            let parts: Vec<&str> = code.split('-').collect();
            assert_eq!(parts.len(), 3, "bad code {code}");
            assert_eq!(parts[0], "N");
            assert!(parts[1].parse::<u32>().is_ok(), "bad code {code}");
            assert!(parts[2].parse::<u32>().is_ok(), "bad code {code}");
        }
    }

    #[test]
    fn test_internal_error_exists() {
        let info = get_error_info("N-0-1").unwrap();
        assert_eq!(info.subsystem, "internal");
        assert_eq!(info.title, "Internal Error");
    }

    #[test]
    fn test_get_subsystem() {
        assert_eq!(get_subsystem("N-3-1"), Some("list"));
        assert_eq!(get_subsystem("N-999-999"), None);
    }

    #[test]
    fn test_nonexistent_code() {
        assert!(get_error_info("N-999-999").is_none());
    }
}
