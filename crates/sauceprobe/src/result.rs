//! Result and error types for sauceprobe.

use thiserror::Error;

/// Result type for sauceprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Required UI state is absent (no items, no images)
    #[error("Precondition failed: {message}")]
    Precondition {
        /// Error message
        message: String,
    },

    /// Actual UI value differs from the expected one
    #[error("{subject}: expected '{expected}', but found '{actual}'")]
    Mismatch {
        /// What was being compared
        subject: String,
        /// Expected value
        expected: String,
        /// Actual value
        actual: String,
    },

    /// A bounded wait ran out of time
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Description of the awaited condition
        waited_for: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Persona string has no policy
    #[error("Unknown user type: {name}")]
    UnknownPersona {
        /// The unrecognized persona name
        name: String,
    },

    /// Step text does not match any known step pattern
    #[error("No step matches: {text}")]
    UnknownStep {
        /// The step text
        text: String,
    },

    /// Element could not be located
    #[error("Element not found: {locator}")]
    ElementNotFound {
        /// Locator description
        locator: String,
    },

    /// Click/type/clear on an element failed
    #[error("Interaction with {target} failed: {message}")]
    Interaction {
        /// Element description
        target: String,
        /// Error message
        message: String,
    },

    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
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

    /// Page error
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a precondition error
    #[must_use]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create a mismatch error
    #[must_use]
    pub fn mismatch(
        subject: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::Mismatch {
            subject: subject.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an interaction error
    #[must_use]
    pub fn interaction(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Interaction {
            target: target.into(),
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

    /// Whether this error came from a bounded wait running out
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_carries_both_values() {
        let err = ProbeError::mismatch("cart item count", 4, 3);
        let text = err.to_string();
        assert!(text.contains("cart item count"));
        assert!(text.contains("'4'"));
        assert!(text.contains("'3'"));
    }

    #[test]
    fn test_unknown_persona_message() {
        let err = ProbeError::UnknownPersona {
            name: "visual_user".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown user type: visual_user");
    }

    #[test]
    fn test_timeout_detection() {
        let err = ProbeError::Timeout {
            waited_for: "inventory list".to_string(),
            ms: 10_000,
        };
        assert!(err.is_timeout());
        assert!(err.to_string().contains("10000ms"));
        assert!(!ProbeError::precondition("x").is_timeout());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ProbeError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
