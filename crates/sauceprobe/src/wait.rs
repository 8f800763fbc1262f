//! Bounded condition polling.
//!
//! Every wait call site states what happens when time runs out through
//! [`OnTimeout`]: a hard [`ProbeError::Timeout`] or a logged warning. Fixed
//! delays go through [`Waiter::settle`] so they show up in the logs with a
//! reason attached.

use crate::driver::BrowserDriver;
use crate::locator::Selector;
use crate::persona::CartExpectation;
use crate::result::{ProbeError, ProbeResult};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Extend the timeout by `extra`
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn extended_by(mut self, extra: Duration) -> Self {
        self.timeout_ms = self.timeout_ms.saturating_add(extra.as_millis() as u64);
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// What a wait does when its timeout elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnTimeout {
    /// Return [`ProbeError::Timeout`]
    Fail,
    /// Log a warning and carry on
    WarnAndContinue,
}

// =============================================================================
// CONDITIONS
// =============================================================================

/// Observable page state a wait can poll for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// At least one element matches
    Present(Selector),
    /// The first match is displayed
    Displayed(Selector),
    /// No element matches
    Absent(Selector),
    /// Current URL contains the fragment
    UrlContains(String),
    /// Match count satisfies the expectation
    CountSatisfies {
        /// Elements to count
        selector: Selector,
        /// Accepted counts
        expectation: CartExpectation,
    },
}

impl Condition {
    /// Evaluate once against the driver
    ///
    /// # Errors
    ///
    /// Propagates driver errors
    pub async fn check(&self, driver: &dyn BrowserDriver) -> ProbeResult<bool> {
        match self {
            Self::Present(sel) => Ok(driver.count_matching(sel).await? > 0),
            Self::Displayed(sel) => match driver.query_selector(sel).await? {
                Some(el) => driver.is_displayed(&el).await,
                None => Ok(false),
            },
            Self::Absent(sel) => Ok(driver.count_matching(sel).await? == 0),
            Self::UrlContains(fragment) => Ok(driver.current_url().await?.contains(fragment)),
            Self::CountSatisfies {
                selector,
                expectation,
            } => {
                let count = driver.count_matching(selector).await?;
                Ok(expectation.accepts(count))
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(sel) => write!(f, "presence of {sel}"),
            Self::Displayed(sel) => write!(f, "visibility of {sel}"),
            Self::Absent(sel) => write!(f, "absence of {sel}"),
            Self::UrlContains(fragment) => write!(f, "URL containing '{fragment}'"),
            Self::CountSatisfies {
                selector,
                expectation,
            } => write!(f, "{expectation} elements matching {selector}"),
        }
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Outcome of a wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Whether the condition was met
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

impl WaitResult {
    /// Create a successful wait result
    #[must_use]
    pub fn success(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: true,
            elapsed,
            waited_for: waited_for.into(),
        }
    }

    /// Create a timeout wait result
    #[must_use]
    pub fn timeout(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: false,
            elapsed,
            waited_for: waited_for.into(),
        }
    }
}

// =============================================================================
// WAITER
// =============================================================================

/// Polls conditions against a driver
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create with custom options
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Default options used by [`Self::wait_for`]
    #[must_use]
    pub const fn options(&self) -> WaitOptions {
        self.options
    }

    /// Poll until the condition holds or the timeout elapses.
    ///
    /// A driver error during a check counts as "not yet".
    pub async fn poll(
        &self,
        driver: &dyn BrowserDriver,
        condition: &Condition,
        options: &WaitOptions,
    ) -> WaitResult {
        let start = Instant::now();
        loop {
            match condition.check(driver).await {
                Ok(true) => return WaitResult::success(start.elapsed(), condition.to_string()),
                Ok(false) => {}
                Err(e) => tracing::trace!(error = %e, %condition, "condition check failed"),
            }
            if start.elapsed() >= options.timeout() {
                return WaitResult::timeout(start.elapsed(), condition.to_string());
            }
            tokio::time::sleep(options.poll_interval()).await;
        }
    }

    /// Wait with the default options
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Timeout`] when the condition is not met and
    /// `on_timeout` is [`OnTimeout::Fail`]
    pub async fn wait_for(
        &self,
        driver: &dyn BrowserDriver,
        condition: &Condition,
        on_timeout: OnTimeout,
    ) -> ProbeResult<WaitResult> {
        self.wait_for_with(driver, condition, &self.options, on_timeout)
            .await
    }

    /// Wait with explicit options
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Timeout`] when the condition is not met and
    /// `on_timeout` is [`OnTimeout::Fail`]
    pub async fn wait_for_with(
        &self,
        driver: &dyn BrowserDriver,
        condition: &Condition,
        options: &WaitOptions,
        on_timeout: OnTimeout,
    ) -> ProbeResult<WaitResult> {
        let result = self.poll(driver, condition, options).await;
        if result.success {
            tracing::debug!(waited_for = %result.waited_for, elapsed_ms = result.elapsed.as_millis() as u64, "wait satisfied");
            return Ok(result);
        }
        match on_timeout {
            OnTimeout::Fail => Err(ProbeError::Timeout {
                waited_for: result.waited_for,
                ms: options.timeout_ms,
            }),
            OnTimeout::WarnAndContinue => {
                tracing::warn!(
                    waited_for = %result.waited_for,
                    timeout_ms = options.timeout_ms,
                    "wait timed out, continuing"
                );
                Ok(result)
            }
        }
    }

    /// Fixed delay for states with no observable signal
    pub async fn settle(&self, duration: Duration, reason: &str) {
        tracing::info!(ms = duration.as_millis() as u64, reason, "settling");
        tokio::time::sleep(duration).await;
    }
}
