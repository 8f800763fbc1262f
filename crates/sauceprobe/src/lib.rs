//! Sauceprobe: persona-driven Screenplay journeys for the Saucedemo storefront
//!
//! An [`Actor`] owns a browser session and performs [`Task`]s. Tasks are
//! grouped by the page they act on (login, inventory, cart, checkout,
//! completion) and read their persona-dependent behavior from a
//! [`PolicyTable`] instead of branching on usernames inline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   SAUCEPROBE Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Step text  │    │ Journey    │    │ Actor +    │            │
//! │   │ / builtin  │───►│ Runner     │───►│ Tasks      │            │
//! │   │ journeys   │    │ (reports)  │    │            │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             │                   │
//! │                          ┌──────────────────┴─────────┐         │
//! │                          ▼                            ▼         │
//! │                   ┌────────────┐              ┌────────────┐    │
//! │                   │ Storefront │              │ Chromium   │    │
//! │                   │ Sim        │              │ (CDP)      │    │
//! │                   └────────────┘              └────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sauceprobe::prelude::*;
//!
//! # async fn demo() -> ProbeResult<()> {
//! let policies = PolicyTable::default();
//! let journey = BuiltinJourney::Purchase.build(
//!     &Persona::StandardUser,
//!     DEFAULT_PASSWORD,
//!     &CheckoutForm::default(),
//!     &policies,
//! )?;
//! let mut actor = Actor::new("shopper", Box::new(StorefrontSim::saucedemo()));
//! let report = JourneyRunner::new().run(&journey, &mut actor).await;
//! assert!(report.passed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_frames))]

mod actor;
mod catalog;
mod config;
mod driver;
mod journey;
mod locator;
mod persona;
mod report;
mod result;
mod sampler;
mod verify;

/// In-memory storefront driver
pub mod sim;

/// Screenplay tasks grouped by page
pub mod tasks;

/// Condition polling
pub mod wait;

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
mod cdp;

pub use actor::{Actor, Notes};
pub use catalog::{
    shared_selectors, CartPage, Catalog, CheckoutPage, CompletePage, InventoryPage, LoginPage,
    PageObject,
};
pub use config::{BrowserSettings, SuiteConfig, Timings, DEFAULT_BASE_URL, DEFAULT_PASSWORD};
pub use driver::{BrowserDriver, ElementHandle};
pub use journey::{BuiltinJourney, Journey, JourneyRunner, Step, StepMatcher, MASKED_PASSWORD};
pub use locator::{Locator, Selector};
pub use persona::{
    CartExpectation, CheckoutWait, ItemQuota, LoginExpectation, Persona, PersonaPolicy,
    PolicyTable,
};
pub use report::{JourneyReport, StepReport, StepStatus};
pub use result::{ProbeError, ProbeResult};
pub use sampler::{IndexSampler, Seed};
pub use sim::StorefrontSim;
pub use tasks::Task;
pub use verify::VerificationOutcome;
pub use wait::{Condition, OnTimeout, WaitOptions, WaitResult, Waiter};

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;

/// Commonly used items
pub mod prelude {
    pub use super::tasks::{
        AddToCartReport, CartTask, CheckoutForm, CheckoutTask, CompleteTask, ImageLoadReport,
        InventoryTask, LoginTask, Task,
    };
    pub use super::{
        Actor, BrowserDriver, BrowserSettings, BuiltinJourney, Catalog, Condition, ElementHandle,
        Journey, JourneyReport, JourneyRunner, Locator, OnTimeout, PageObject, Persona,
        PersonaPolicy, PolicyTable, ProbeError, ProbeResult, Selector, Step, StepReport,
        StepStatus, StorefrontSim, SuiteConfig, Timings, DEFAULT_BASE_URL, DEFAULT_PASSWORD,
    };

    #[cfg(feature = "browser")]
    pub use super::ChromiumDriver;
}
