//! Macros for creating diagnostic messages.

/// Create an error with code `N-0-99` that records the file and line where
/// it was raised.
///
/// ```
/// use nml_error_reporting::generic_error;
///
/// let error = generic_error!("pattern anchor missing");
/// assert_eq!(error.code, Some("N-0-99".to_string()));
/// assert!(error.title.contains("pattern anchor missing"));
/// assert!(error.title.contains(file!()));
/// ```
#[macro_export]
macro_rules! generic_error {
    ($message:expr) => {
        $crate::DiagnosticMessageBuilder::generic_error($message, file!(), line!())
    };
}

#[cfg(test)]
mod tests {
    use crate::{DiagnosticKind, generic_error};

    #[test]
    fn test_generic_error_macro() {
        let error = generic_error!("Test error message");

        assert_eq!(error.kind, DiagnosticKind::Error);
        assert_eq!(error.code, Some("N-0-99".to_string()));
        assert!(error.title.contains("Test error message"));
        assert!(error.title.contains(file!()));
        assert!(error.title.contains(':'));
    }

    #[test]
    fn test_macro_with_format() {
        let value = 42;
        let error = generic_error!(format!("Invalid value: {}", value));

        assert!(error.title.contains("Invalid value: 42"));
    }

    #[test]
    fn test_macro_error_can_be_rendered() {
        let error = generic_error!("Render test");
        let text = error.to_text();

        assert!(text.contains("[N-0-99]"));
        assert!(text.contains("Render test"));
    }
}
