//! Result and error types for markcheck.

use thiserror::Error;

/// Result type for markcheck operations
pub type MarkcheckResult<T> = Result<T, MarkcheckError>;

/// Errors that can occur while driving the catalog or writing results
#[derive(Debug, Error)]
pub enum MarkcheckError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// No element matched the selector
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// In-page script failed or returned an unexpected shape
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Resource fetch failed below the HTTP layer
    #[error("Fetch of {url} failed: {message}")]
    Fetch {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// The catalog structure itself is broken (aborts the run)
    #[error("Catalog structure error: {message}")]
    Structural {
        /// Error message
        message: String,
    },

    /// Test-data workbook could not be read or written
    #[error("Workbook error: {message}")]
    Workbook {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl MarkcheckError {
    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::Page {
            message: message.into(),
        }
    }

    /// Create a structural error
    #[must_use]
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
        }
    }

    /// Create a workbook error
    #[must_use]
    pub fn workbook(message: impl Into<String>) -> Self {
        Self::Workbook {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error must abort the run instead of becoming a row note
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Structural { .. })
    }

    /// Whether this error means "the awaited thing never showed up"
    #[must_use]
    pub const fn is_absence(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. } | Self::Timeout { .. })
    }

    /// Whether the run cannot continue with the next row.
    ///
    /// Structural catalog breakage, an unwritable workbook and bad
    /// configuration stop everything; page-level errors only cost the row.
    #[must_use]
    pub const fn aborts_run(&self) -> bool {
        matches!(
            self,
            Self::Structural { .. }
                | Self::Workbook { .. }
                | Self::Config { .. }
                | Self::BrowserLaunch { .. }
                | Self::Io(_)
                | Self::Yaml(_)
        )
    }
}

/// Turn "element absent / wait timed out" into `Ok(None)`
pub trait AbsentOk<T> {
    /// `Ok(Some)` on success, `Ok(None)` on absence, other errors unchanged
    fn absent_ok(self) -> MarkcheckResult<Option<T>>;
}

impl<T> AbsentOk<T> for MarkcheckResult<T> {
    fn absent_ok(self) -> MarkcheckResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_absence() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_classification() {
        assert!(MarkcheckError::structural("no href").is_structural());
        assert!(!MarkcheckError::page("boom").is_structural());
        assert!(!MarkcheckError::Timeout { ms: 10 }.is_structural());
    }

    #[test]
    fn test_absence_classification() {
        let missing = MarkcheckError::ElementNotFound {
            selector: "#x".to_string(),
        };
        assert!(missing.is_absence());
        assert!(MarkcheckError::Timeout { ms: 2000 }.is_absence());
        assert!(!MarkcheckError::workbook("locked").is_absence());
    }

    #[test]
    fn test_aborts_run() {
        assert!(MarkcheckError::structural("no href").aborts_run());
        assert!(MarkcheckError::workbook("locked").aborts_run());
        assert!(!MarkcheckError::page("detached").aborts_run());
        assert!(!MarkcheckError::Timeout { ms: 1 }.aborts_run());
    }

    #[test]
    fn test_absent_ok() {
        let missing: MarkcheckResult<u8> = Err(MarkcheckError::Timeout { ms: 5 });
        assert!(missing.absent_ok().unwrap().is_none());
        let found: MarkcheckResult<u8> = Ok(7);
        assert_eq!(found.absent_ok().unwrap(), Some(7));
        let broken: MarkcheckResult<u8> = Err(MarkcheckError::page("gone"));
        assert!(broken.absent_ok().is_err());
    }

    #[test]
    fn test_display_messages() {
        let err = MarkcheckError::Navigation {
            url: "https://shop.test/".to_string(),
            message: "net::ERR".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Navigation to https://shop.test/ failed: net::ERR"
        );
        assert_eq!(
            MarkcheckError::Timeout { ms: 3000 }.to_string(),
            "Operation timed out after 3000ms"
        );
    }
}
