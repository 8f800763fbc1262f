//! Verification outcomes for UI assertions.

use crate::persona::CartExpectation;
use crate::result::{ProbeError, ProbeResult};

/// Result of comparing an expected UI value with the actual one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Actual matched expected
    Matched,
    /// Actual differed
    Mismatch {
        /// What was compared
        subject: String,
        /// Expected value
        expected: String,
        /// Actual value
        actual: String,
    },
}

impl VerificationOutcome {
    /// Exact text comparison
    #[must_use]
    pub fn text_equals(subject: &str, expected: &str, actual: &str) -> Self {
        if expected == actual {
            Self::Matched
        } else {
            Self::mismatch(subject, expected, actual)
        }
    }

    /// Substring check
    #[must_use]
    pub fn contains(subject: &str, haystack: &str, needle: &str) -> Self {
        if haystack.contains(needle) {
            Self::Matched
        } else {
            Self::mismatch(subject, format!("containing '{needle}'"), haystack)
        }
    }

    /// Count against an expectation
    #[must_use]
    pub fn count(subject: &str, expectation: CartExpectation, actual: usize) -> Self {
        if expectation.accepts(actual) {
            Self::Matched
        } else {
            Self::mismatch(subject, expectation, actual)
        }
    }

    fn mismatch(subject: &str, expected: impl ToString, actual: impl ToString) -> Self {
        Self::Mismatch {
            subject: subject.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Whether the comparison matched
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched)
    }

    /// Convert into a result, mapping a mismatch to [`ProbeError::Mismatch`]
    ///
    /// # Errors
    ///
    /// Returns the mismatch as an error
    pub fn into_result(self) -> ProbeResult<()> {
        match self {
            Self::Matched => Ok(()),
            Self::Mismatch {
                subject,
                expected,
                actual,
            } => Err(ProbeError::Mismatch {
                subject,
                expected,
                actual,
            }),
        }
    }
}
