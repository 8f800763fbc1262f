//! Journey reports.
//!
//! A [`JourneyReport`] records one run of one journey: every step with its
//! status, duration and error text, plus the run id and sampler seed needed
//! to replay it. Reports serialize to JSON for CI artifacts.

use crate::result::ProbeResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Step result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step passed
    Passed,
    /// Step failed
    Failed,
    /// Step not run because an earlier step failed
    Skipped,
}

impl StepStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Position in the journey (0-based)
    pub index: usize,
    /// Canonical step text
    pub text: String,
    /// Step status
    pub status: StepStatus,
    /// Time spent on the step
    pub duration_ms: u64,
    /// Error message if failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure screenshot, if one was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl StepReport {
    /// Create a passing step result
    #[must_use]
    pub fn passed(index: usize, text: impl Into<String>, duration: Duration) -> Self {
        Self {
            index,
            text: text.into(),
            status: StepStatus::Passed,
            duration_ms: millis(duration),
            error: None,
            screenshot: None,
        }
    }

    /// Create a failing step result
    #[must_use]
    pub fn failed(
        index: usize,
        text: impl Into<String>,
        duration: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            index,
            text: text.into(),
            status: StepStatus::Failed,
            duration_ms: millis(duration),
            error: Some(error.into()),
            screenshot: None,
        }
    }

    /// Create a skipped step result
    #[must_use]
    pub fn skipped(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            status: StepStatus::Skipped,
            duration_ms: 0,
            error: None,
            screenshot: None,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

/// Result of one journey run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyReport {
    /// Unique run id
    pub run_id: Uuid,
    /// Journey name
    pub journey: String,
    /// Persona the journey ran as, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    /// Sampler seed
    pub seed: u64,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Total duration
    pub duration_ms: u64,
    /// Step results in order
    pub steps: Vec<StepReport>,
}

impl JourneyReport {
    /// Start an empty report
    #[must_use]
    pub fn start(journey: impl Into<String>, persona: Option<String>, seed: u64) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            journey: journey.into(),
            persona,
            seed,
            started_at: Utc::now(),
            duration_ms: 0,
            steps: Vec::new(),
        }
    }

    /// Record the total duration
    pub fn finish(&mut self, duration: Duration) {
        self.duration_ms = millis(duration);
    }

    /// Whether every step passed
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.status.is_passed())
    }

    /// The failed step, if any
    #[must_use]
    pub fn failed_step(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.status.is_failed())
    }

    /// Count steps with the given status
    #[must_use]
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as JSON
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save_json(&self, path: &Path) -> ProbeResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "journey report written");
        Ok(())
    }
}
