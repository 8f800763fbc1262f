//! The actor: one shopper session and the primitives tasks are built from.
//!
//! An [`Actor`] owns its driver session together with the locator catalog,
//! the persona policy table, wait settings and a seeded sampler. Tasks borrow
//! the actor mutably for the duration of one step.

use crate::catalog::Catalog;
use crate::config::{SuiteConfig, Timings};
use crate::driver::{BrowserDriver, ElementHandle};
use crate::locator::Locator;
use crate::persona::{Persona, PersonaPolicy, PolicyTable};
use crate::result::{ProbeError, ProbeResult};
use crate::sampler::{IndexSampler, Seed};
use crate::tasks::{AddToCartReport, ImageLoadReport, Task};
use crate::wait::{Condition, OnTimeout, WaitOptions, WaitResult, Waiter};
use std::sync::Arc;
use std::time::Duration;

/// Observations remembered across steps
#[derive(Debug, Clone, Default)]
pub struct Notes {
    /// Last add-to-cart outcome
    pub added: Option<AddToCartReport>,
    /// Last image check outcome
    pub images: Option<ImageLoadReport>,
}

/// A shopper driving one browser session
#[derive(Debug)]
pub struct Actor {
    name: String,
    driver: Box<dyn BrowserDriver>,
    catalog: Arc<Catalog>,
    policies: Arc<PolicyTable>,
    timings: Timings,
    waiter: Waiter,
    base_url: String,
    sampler: IndexSampler,
    notes: Notes,
}

impl Actor {
    /// Create an actor with stock catalog, policies and timings
    #[must_use]
    pub fn new(name: impl Into<String>, driver: Box<dyn BrowserDriver>) -> Self {
        let timings = Timings::default();
        Self {
            name: name.into(),
            driver,
            catalog: Arc::new(Catalog::saucedemo()),
            policies: Arc::new(PolicyTable::with_glitch_grace(timings.glitch_login_grace())),
            timings,
            waiter: Waiter::with_options(Self::options_for(&timings)),
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            sampler: IndexSampler::default(),
            notes: Notes::default(),
        }
    }

    /// Create an actor configured from a suite config
    #[must_use]
    pub fn from_config(
        name: impl Into<String>,
        driver: Box<dyn BrowserDriver>,
        config: &SuiteConfig,
    ) -> Self {
        let actor = Self::new(name, driver)
            .with_timings(config.timings)
            .with_policies(Arc::new(config.policies()))
            .with_base_url(config.site_root());
        match config.seed {
            Some(seed) => actor.with_seed(seed),
            None => actor,
        }
    }

    fn options_for(timings: &Timings) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timings.element_timeout_ms)
            .with_poll_interval(timings.poll_interval_ms)
    }

    /// Use a different locator catalog
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Use a different policy table
    #[must_use]
    pub fn with_policies(mut self, policies: Arc<PolicyTable>) -> Self {
        self.policies = policies;
        self
    }

    /// Set timings; also rebuilds the stock policy table's glitch grace
    #[must_use]
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self.waiter = Waiter::with_options(Self::options_for(&timings));
        self.policies = Arc::new(PolicyTable::with_glitch_grace(timings.glitch_login_grace()));
        self
    }

    /// Set the storefront root URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Seed the product sampler
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.sampler = IndexSampler::new(Seed::from_u64(seed));
        self
    }

    /// Actor name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storefront root URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared locator catalog
    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Timings in effect
    #[must_use]
    pub const fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Sampler seed, for replaying a run
    #[must_use]
    pub const fn seed(&self) -> Seed {
        self.sampler.seed()
    }

    /// Borrow the driver
    #[must_use]
    pub fn driver(&self) -> &dyn BrowserDriver {
        self.driver.as_ref()
    }

    /// Borrow the driver mutably
    pub fn driver_mut(&mut self) -> &mut dyn BrowserDriver {
        self.driver.as_mut()
    }

    /// Observations from earlier steps
    #[must_use]
    pub const fn notes(&self) -> &Notes {
        &self.notes
    }

    /// Mutable observations
    pub fn notes_mut(&mut self) -> &mut Notes {
        &mut self.notes
    }

    /// Resolve the policy for a persona
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::UnknownPersona`] for unrecognized personas
    pub fn policy_for(&self, persona: &Persona) -> ProbeResult<PersonaPolicy> {
        self.policies.policy_for(persona)
    }

    /// `min(k, n)` distinct indexes from `0..n`
    pub fn sample_distinct(&mut self, k: usize, n: usize) -> Vec<usize> {
        self.sampler.sample_distinct(k, n)
    }

    /// Perform a task
    ///
    /// # Errors
    ///
    /// Propagates the task's failure
    pub async fn attempts_to<T: Task + ?Sized>(&mut self, task: &T) -> ProbeResult<()> {
        let description = task.describe();
        tracing::info!(actor = %self.name, task = %description, "performing");
        let outcome = task.perform_as(self).await;
        if let Err(ref e) = outcome {
            tracing::error!(actor = %self.name, task = %description, error = %e, "task failed");
        }
        outcome
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// Navigate to an absolute URL
    ///
    /// # Errors
    ///
    /// Propagates navigation failures
    pub async fn open(&mut self, url: &str) -> ProbeResult<()> {
        tracing::debug!(url, "navigating");
        self.driver.navigate(url).await
    }

    /// Current page URL
    ///
    /// # Errors
    ///
    /// Propagates driver errors
    pub async fn current_url(&self) -> ProbeResult<String> {
        self.driver.current_url().await
    }

    /// Wait for presence and return the first match
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::ElementNotFound`] if nothing matches in time
    pub async fn ensure_present(&self, locator: &Locator) -> ProbeResult<ElementHandle> {
        let cond = Condition::Present(locator.selector().clone());
        let options = self.waiter.options();
        let result = self.waiter.poll(self.driver(), &cond, &options).await;
        if !result.success {
            return Err(ProbeError::ElementNotFound {
                locator: locator.to_string(),
            });
        }
        self.driver
            .query_selector(locator.selector())
            .await?
            .ok_or_else(|| ProbeError::ElementNotFound {
                locator: locator.to_string(),
            })
    }

    /// Wait for the first match to be displayed and return it
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Timeout`] if the element is not displayed in time
    pub async fn ensure_displayed(&self, locator: &Locator) -> ProbeResult<ElementHandle> {
        let cond = Condition::Displayed(locator.selector().clone());
        self.waiter
            .wait_for(self.driver(), &cond, OnTimeout::Fail)
            .await?;
        self.ensure_present(locator).await
    }

    /// All current matches, without waiting
    ///
    /// # Errors
    ///
    /// Propagates driver errors
    pub async fn find_all(&self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>> {
        self.driver.query_selector_all(locator.selector()).await
    }

    /// Ensure present, then click
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or the click fails
    pub async fn click_on(&mut self, locator: &Locator) -> ProbeResult<()> {
        let element = self.ensure_present(locator).await?;
        tracing::debug!(target_name = locator.name(), "click");
        self.driver.click(&element).await
    }

    /// Ensure present, clear, then type
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or input fails
    pub async fn enter_into(&mut self, locator: &Locator, text: &str) -> ProbeResult<()> {
        let element = self.ensure_present(locator).await?;
        tracing::debug!(target_name = locator.name(), "enter text");
        self.driver.clear(&element).await?;
        self.driver.type_text(&element, text).await
    }

    /// Ensure present, then read the rendered text
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing
    pub async fn read_text(&self, locator: &Locator) -> ProbeResult<String> {
        let element = self.ensure_present(locator).await?;
        self.driver.text(&element).await
    }

    /// Wait for a condition with the actor's default timeout
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Timeout`] under [`OnTimeout::Fail`]
    pub async fn wait_until(
        &self,
        condition: &Condition,
        on_timeout: OnTimeout,
    ) -> ProbeResult<WaitResult> {
        self.waiter
            .wait_for(self.driver(), condition, on_timeout)
            .await
    }

    /// Wait for a condition with the default timeout extended by `extra`
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Timeout`] under [`OnTimeout::Fail`]
    pub async fn wait_until_extended(
        &self,
        condition: &Condition,
        extra: Duration,
        on_timeout: OnTimeout,
    ) -> ProbeResult<WaitResult> {
        let options = self.waiter.options().extended_by(extra);
        self.waiter
            .wait_for_with(self.driver(), condition, &options, on_timeout)
            .await
    }

    /// Fixed delay where the page exposes no signal
    pub async fn settle(&self, duration: Duration, reason: &str) {
        self.waiter.settle(duration, reason).await;
    }

    /// Capture a screenshot of the current page
    ///
    /// # Errors
    ///
    /// Propagates driver errors
    pub async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        self.driver.screenshot().await
    }

    /// Close the session
    ///
    /// # Errors
    ///
    /// Propagates driver errors
    pub async fn close(&mut self) -> ProbeResult<()> {
        self.driver.close().await
    }
}
