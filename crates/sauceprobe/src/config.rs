//! Suite configuration.
//!
//! Loaded from YAML; every field has a default so an empty file (or no file)
//! yields a configuration that targets the public storefront.
//!
//! ```yaml
//! base_url: https://www.saucedemo.com
//! password: secret_sauce
//! seed: 42
//! browser:
//!   headless: true
//! timings:
//!   element_timeout_ms: 10000
//! journeys:
//!   smoke:
//!     - the user logs in with valid credentials username "standard_user" and password "secret_sauce"
//!     - the user should be able to logout
//! ```

use crate::persona::PolicyTable;
use crate::result::{ProbeError, ProbeResult};
use crate::tasks::CheckoutForm;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Public storefront URL
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com";

/// Password shared by every demo account
pub const DEFAULT_PASSWORD: &str = "secret_sauce";

// =============================================================================
// TIMINGS
// =============================================================================

/// Wait and settle durations, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Bounded wait applied to element and URL conditions
    pub element_timeout_ms: u64,
    /// Interval between condition checks
    pub poll_interval_ms: u64,
    /// Extra wait granted to the performance glitch persona at login
    pub glitch_login_grace_ms: u64,
    /// Fixed settle used where the page exposes no readiness signal
    pub network_settle_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            element_timeout_ms: 10_000,
            poll_interval_ms: 100,
            glitch_login_grace_ms: 10_000,
            network_settle_ms: 2_000,
        }
    }
}

impl Timings {
    /// Short timings for the in-process storefront
    #[must_use]
    pub const fn brisk() -> Self {
        Self {
            element_timeout_ms: 1_000,
            poll_interval_ms: 20,
            glitch_login_grace_ms: 1_000,
            network_settle_ms: 50,
        }
    }

    /// Element timeout as Duration
    #[must_use]
    pub const fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Glitch login grace as Duration
    #[must_use]
    pub const fn glitch_login_grace(&self) -> Duration {
        Duration::from_millis(self.glitch_login_grace_ms)
    }

    /// Network settle as Duration
    #[must_use]
    pub const fn network_settle(&self) -> Duration {
        Duration::from_millis(self.network_settle_ms)
    }
}

// =============================================================================
// BROWSER SETTINGS
// =============================================================================

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = `CHROMIUM_PATH` or auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserSettings {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// =============================================================================
// SUITE CONFIG
// =============================================================================

/// Top-level configuration for a suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Storefront root URL
    pub base_url: String,
    /// Password used by step text that omits one
    pub password: String,
    /// Browser launch settings
    pub browser: BrowserSettings,
    /// Wait durations
    pub timings: Timings,
    /// Form used by "fills in the required checkout information"
    pub checkout: CheckoutForm,
    /// Sampler seed; random when absent
    pub seed: Option<u64>,
    /// Named journeys as step text
    pub journeys: BTreeMap<String, Vec<String>>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            browser: BrowserSettings::default(),
            timings: Timings::default(),
            checkout: CheckoutForm::default(),
            seed: None,
            journeys: BTreeMap::new(),
        }
    }
}

impl SuiteConfig {
    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns error if the YAML is malformed or fails validation
    pub fn from_yaml(text: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> ProbeResult<Self> {
        tracing::debug!(path = %path.display(), "loading suite config");
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check values that serde cannot
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first bad value
    pub fn validate(&self) -> ProbeResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProbeError::config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timings.poll_interval_ms == 0 {
            return Err(ProbeError::config("poll_interval_ms must be positive"));
        }
        if self.timings.poll_interval_ms > self.timings.element_timeout_ms {
            return Err(ProbeError::config(
                "poll_interval_ms must not exceed element_timeout_ms",
            ));
        }
        if let Some((name, _)) = self.journeys.iter().find(|(_, steps)| steps.is_empty()) {
            return Err(ProbeError::config(format!("journey '{name}' has no steps")));
        }
        Ok(())
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set timings
    #[must_use]
    pub const fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Set sampler seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set browser settings
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserSettings) -> Self {
        self.browser = browser;
        self
    }

    /// Add a named journey
    #[must_use]
    pub fn with_journey(mut self, name: impl Into<String>, steps: Vec<String>) -> Self {
        self.journeys.insert(name.into(), steps);
        self
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn site_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Persona policies for these timings
    #[must_use]
    pub const fn policies(&self) -> PolicyTable {
        PolicyTable::with_glitch_grace(self.timings.glitch_login_grace())
    }
}
