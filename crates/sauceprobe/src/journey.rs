//! Journeys: ordered steps, step text binding, and the runner.
//!
//! ```text
//! step text ──StepMatcher──▶ Step ──▶ exactly one Task ──▶ Actor
//!                               │
//!   Journey = [Step, Step, ...] ┘   JourneyRunner: sequential,
//!                                   first failure skips the rest
//! ```

use crate::actor::Actor;
use crate::persona::{CheckoutWait, Persona, PolicyTable};
use crate::report::{JourneyReport, StepReport};
use crate::result::{ProbeError, ProbeResult};
use crate::tasks::{
    CartTask, CheckoutForm, CheckoutTask, CompleteTask, InventoryTask, LoginTask, Task,
    THANK_YOU_HEADER,
};
use regex::{Captures, Regex};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;
use tokio::time::Instant;
use tracing::Instrument;

// =============================================================================
// STEP
// =============================================================================

/// One human-readable step, bound to exactly one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Login screen
    Login(LoginTask),
    /// Inventory screen
    Inventory(InventoryTask),
    /// Cart screen
    Cart(CartTask),
    /// Checkout screens
    Checkout(CheckoutTask),
    /// Confirmation screen
    Complete(CompleteTask),
}

impl Step {
    /// Parse step text with the shared matcher
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::UnknownStep`] if no pattern matches
    pub fn parse(text: &str, default_form: &CheckoutForm) -> ProbeResult<Self> {
        StepMatcher::shared()?.parse(text, default_form)
    }

    /// The task this step performs
    #[must_use]
    pub fn task(&self) -> &dyn Task {
        match self {
            Self::Login(t) => t as &dyn Task,
            Self::Inventory(t) => t as &dyn Task,
            Self::Cart(t) => t as &dyn Task,
            Self::Checkout(t) => t as &dyn Task,
            Self::Complete(t) => t as &dyn Task,
        }
    }

    /// Perform the step's task
    ///
    /// # Errors
    ///
    /// Propagates the task's failure
    pub async fn perform_as(&self, actor: &mut Actor) -> ProbeResult<()> {
        actor.attempts_to(self.task()).await
    }
}

/// Stands in for passwords in rendered step text
pub const MASKED_PASSWORD: &str = "********";

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login(LoginTask::NavigateToSite) => f.write_str("the user opens the storefront"),
            Self::Login(LoginTask::LogIn { persona, .. }) => write!(
                f,
                "the user logs in with valid credentials username \"{persona}\" and password \"{MASKED_PASSWORD}\""
            ),
            Self::Login(LoginTask::Authenticate { persona, .. }) => write!(
                f,
                "the user authenticates as \"{persona}\" with password \"{MASKED_PASSWORD}\""
            ),
            Self::Inventory(InventoryTask::AddRandomItems { persona }) => {
                write!(f, "the user adds products to the cart for \"{persona}\"")
            }
            Self::Inventory(InventoryTask::ValidateItemImages) => {
                f.write_str("the user validates item images")
            }
            Self::Inventory(InventoryTask::Logout) => f.write_str("the user should be able to logout"),
            Self::Cart(CartTask::ValidateItemCount { persona }) => {
                write!(f, "the user validates the cart items for \"{persona}\"")
            }
            Self::Cart(CartTask::ProceedToCheckout) => f.write_str("the user proceeds to checkout"),
            Self::Checkout(CheckoutTask::FillForm(form)) => write!(
                f,
                "the user fills in checkout information \"{}\" \"{}\" \"{}\"",
                form.first_name, form.last_name, form.postal_code
            ),
            Self::Checkout(CheckoutTask::VerifyReachedStepTwo { persona }) => {
                write!(f, "the user should reach the order overview for \"{persona}\"")
            }
            Self::Checkout(CheckoutTask::ClickFinish { persona }) => {
                write!(f, "the user finishes the order for \"{persona}\"")
            }
            Self::Checkout(CheckoutTask::VerifyFormError { expected }) => {
                write!(f, "the checkout form should show the error \"{expected}\"")
            }
            Self::Complete(CompleteTask::VerifyOrderCompletion { header })
                if header == THANK_YOU_HEADER =>
            {
                f.write_str("the order should be confirmed")
            }
            Self::Complete(CompleteTask::VerifyOrderCompletion { header }) => {
                write!(f, "the confirmation message \"{header}\" should be displayed")
            }
            Self::Complete(CompleteTask::BackToHome) => {
                f.write_str("the user should be able to go back to home")
            }
        }
    }
}

// =============================================================================
// STEP MATCHER
// =============================================================================

type Build = fn(&Captures<'_>, &CheckoutForm) -> Step;

/// Regex table binding step text to steps
#[derive(Debug)]
pub struct StepMatcher {
    keyword: Regex,
    patterns: Vec<(Regex, Build)>,
}

const Q: &str = r#""([^"]*)""#;

impl StepMatcher {
    /// Compile the step patterns
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a pattern fails to compile
    pub fn new() -> ProbeResult<Self> {
        let table = vec![
            rule("the user opens the storefront", |_, _| {
                Step::Login(LoginTask::NavigateToSite)
            }),
            rule(
                format!("the user logs in with valid credentials username {Q} and password {Q}"),
                |c, _| Step::Login(LoginTask::log_in(Persona::parse(&c[1]), &c[2])),
            ),
            rule(
                format!("the user authenticates as {Q} with password {Q}"),
                |c, _| Step::Login(LoginTask::authenticate(Persona::parse(&c[1]), &c[2])),
            ),
            rule(
                "the user adds products to the cart and proceeds to checkout",
                |_, _| {
                    Step::Inventory(InventoryTask::AddRandomItems {
                        persona: Persona::StandardUser,
                    })
                },
            ),
            rule(format!("the user adds products to the cart for {Q}"), |c, _| {
                Step::Inventory(InventoryTask::AddRandomItems {
                    persona: Persona::parse(&c[1]),
                })
            }),
            rule("the user validates item images", |_, _| {
                Step::Inventory(InventoryTask::ValidateItemImages)
            }),
            rule("the user should be able to logout", |_, _| {
                Step::Inventory(InventoryTask::Logout)
            }),
            rule(format!("the user validates the cart items for {Q}"), |c, _| {
                Step::Cart(CartTask::ValidateItemCount {
                    persona: Persona::parse(&c[1]),
                })
            }),
            rule(
                "the user (?:proceeds to checkout|should see the order overview and complete the purchase)",
                |_, _| Step::Cart(CartTask::ProceedToCheckout),
            ),
            rule("(?:the user )?fills in the required checkout information", |_, form| {
                Step::Checkout(CheckoutTask::FillForm(form.clone()))
            }),
            rule(
                format!("the user fills in checkout information {Q} {Q} {Q}"),
                |c, _| Step::Checkout(CheckoutTask::FillForm(CheckoutForm::new(&c[1], &c[2], &c[3]))),
            ),
            rule(format!("the user should reach the order overview for {Q}"), |c, _| {
                Step::Checkout(CheckoutTask::VerifyReachedStepTwo {
                    persona: Persona::parse(&c[1]),
                })
            }),
            rule(format!("the user finishes the order for {Q}"), |c, _| {
                Step::Checkout(CheckoutTask::ClickFinish {
                    persona: Persona::parse(&c[1]),
                })
            }),
            rule(format!("the checkout form should show the error {Q}"), |c, _| {
                Step::Checkout(CheckoutTask::VerifyFormError {
                    expected: c[1].to_string(),
                })
            }),
            rule("the order should be confirmed", |_, _| {
                Step::Complete(CompleteTask::verify_order_completion())
            }),
            rule(format!("the confirmation message {Q} should be displayed"), |c, _| {
                Step::Complete(CompleteTask::VerifyOrderCompletion {
                    header: c[1].to_string(),
                })
            }),
            rule("the user should be able to go back to home", |_, _| {
                Step::Complete(CompleteTask::BackToHome)
            }),
        ];

        let patterns = table
            .into_iter()
            .map(|(pattern, build)| Ok((compile(&format!("^{pattern}$"))?, build)))
            .collect::<ProbeResult<Vec<_>>>()?;
        Ok(Self {
            keyword: compile(r"^(?:Given|When|Then|And|But|\*)\s+")?,
            patterns,
        })
    }

    /// Process-wide matcher
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the patterns failed to compile
    pub fn shared() -> ProbeResult<&'static Self> {
        static MATCHER: OnceLock<Result<StepMatcher, String>> = OnceLock::new();
        MATCHER
            .get_or_init(|| Self::new().map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| ProbeError::config(e.clone()))
    }

    /// Number of step patterns
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Parse one step; a leading Gherkin keyword is ignored
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::UnknownStep`] if no pattern matches
    pub fn parse(&self, text: &str, default_form: &CheckoutForm) -> ProbeResult<Step> {
        let trimmed = text.trim();
        let body = self.keyword.replace(trimmed, "");
        self.patterns
            .iter()
            .find_map(|(regex, build)| regex.captures(&body).map(|c| build(&c, default_form)))
            .ok_or_else(|| ProbeError::UnknownStep {
                text: trimmed.to_string(),
            })
    }
}

fn rule(pattern: impl Into<String>, build: Build) -> (String, Build) {
    (pattern.into(), build)
}

fn compile(pattern: &str) -> ProbeResult<Regex> {
    Regex::new(pattern).map_err(|e| ProbeError::config(format!("bad step pattern: {e}")))
}

// =============================================================================
// JOURNEY
// =============================================================================

/// A named, ordered list of steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    name: String,
    persona: Option<Persona>,
    steps: Vec<Step>,
}

impl Journey {
    /// Create a journey
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            persona: None,
            steps,
        }
    }

    /// Tag the journey with the persona it runs as
    #[must_use]
    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = Some(persona);
        self
    }

    /// Build a journey from step text
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::UnknownStep`] for the first unparseable line
    pub fn from_step_text<S: AsRef<str>>(
        name: impl Into<String>,
        lines: &[S],
        default_form: &CheckoutForm,
    ) -> ProbeResult<Self> {
        let steps = lines
            .iter()
            .map(|line| Step::parse(line.as_ref(), default_form))
            .collect::<ProbeResult<Vec<_>>>()?;
        Ok(Self::new(name, steps))
    }

    /// Journey name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Persona, if tagged
    #[must_use]
    pub const fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }

    /// Steps in order
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// Journeys that ship with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinJourney {
    /// Log in, fill the cart, check out, confirm
    Purchase,
    /// Log in only
    Login,
    /// Log in and check product images
    Images,
    /// Submit an empty checkout form and check the error
    FormError,
    /// Log in and log out
    Logout,
}

impl BuiltinJourney {
    /// All built-ins
    pub const ALL: [Self; 5] = [
        Self::Purchase,
        Self::Login,
        Self::Images,
        Self::FormError,
        Self::Logout,
    ];

    /// Journey name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Login => "login",
            Self::Images => "images",
            Self::FormError => "form-error",
            Self::Logout => "logout",
        }
    }

    /// One-line description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Purchase => "log in, add products, check out and confirm the order",
            Self::Login => "log in and confirm the persona's login outcome",
            Self::Images => "log in and check that product images loaded",
            Self::FormError => "submit an empty checkout form and check the validation error",
            Self::Logout => "log in and log out through the side menu",
        }
    }

    /// Look up a built-in by name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|j| j.name() == name)
    }

    /// Build the journey for a persona
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::UnknownPersona`] for unrecognized personas
    pub fn build(
        self,
        persona: &Persona,
        password: &str,
        form: &CheckoutForm,
        policies: &PolicyTable,
    ) -> ProbeResult<Journey> {
        let policy = policies.policy_for(persona)?;
        let p = || persona.clone();
        let log_in = Step::Login(LoginTask::log_in(p(), password));
        let steps = match self {
            Self::Login => vec![log_in],
            Self::Images => vec![log_in, Step::Inventory(InventoryTask::ValidateItemImages)],
            Self::Logout => vec![log_in, Step::Inventory(InventoryTask::Logout)],
            Self::FormError => vec![
                log_in,
                Step::Inventory(InventoryTask::AddRandomItems { persona: p() }),
                Step::Cart(CartTask::ProceedToCheckout),
                Step::Checkout(CheckoutTask::FillForm(CheckoutForm::new("", "", ""))),
                Step::Checkout(CheckoutTask::VerifyFormError {
                    expected: "Error: First Name is required".to_string(),
                }),
            ],
            Self::Purchase => {
                let mut steps = vec![
                    log_in,
                    Step::Inventory(InventoryTask::AddRandomItems { persona: p() }),
                    Step::Cart(CartTask::ValidateItemCount { persona: p() }),
                    Step::Cart(CartTask::ProceedToCheckout),
                    Step::Checkout(CheckoutTask::FillForm(form.clone())),
                    Step::Checkout(CheckoutTask::VerifyReachedStepTwo { persona: p() }),
                    Step::Checkout(CheckoutTask::ClickFinish { persona: p() }),
                ];
                // A settle-only finish never reaches the confirmation screen
                if policy.checkout == CheckoutWait::UrlMarker {
                    steps.push(Step::Complete(CompleteTask::verify_order_completion()));
                    steps.push(Step::Complete(CompleteTask::BackToHome));
                }
                steps
            }
        };
        Ok(Journey::new(self.name(), steps).with_persona(persona.clone()))
    }
}

// =============================================================================
// RUNNER
// =============================================================================

/// Runs journeys step by step, stopping at the first failure
#[derive(Debug, Clone, Default)]
pub struct JourneyRunner {
    screenshot_dir: Option<PathBuf>,
}

impl JourneyRunner {
    /// Create a runner
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a PNG to `dir` when a step fails
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = Some(dir.into());
        self
    }

    /// Run a journey
    pub async fn run(&self, journey: &Journey, actor: &mut Actor) -> JourneyReport {
        self.run_with(journey, actor, |_| {}).await
    }

    /// Run a journey, reporting each finished step to `observer`
    pub async fn run_with<F>(
        &self,
        journey: &Journey,
        actor: &mut Actor,
        observer: F,
    ) -> JourneyReport
    where
        F: FnMut(&StepReport) + Send,
    {
        let report = JourneyReport::start(
            journey.name(),
            journey.persona().map(ToString::to_string),
            actor.seed().value(),
        );
        let span = tracing::info_span!("journey", name = journey.name(), run_id = %report.run_id);
        self.run_steps(journey, actor, observer, report)
            .instrument(span)
            .await
    }

    async fn run_steps<F>(
        &self,
        journey: &Journey,
        actor: &mut Actor,
        mut observer: F,
        mut report: JourneyReport,
    ) -> JourneyReport
    where
        F: FnMut(&StepReport) + Send,
    {
        tracing::info!(steps = journey.steps().len(), seed = report.seed, "journey started");

        let started = Instant::now();
        let mut failed = false;
        for (index, step) in journey.steps().iter().enumerate() {
            let text = step.to_string();
            let entry = if failed {
                StepReport::skipped(index, text)
            } else {
                let step_start = Instant::now();
                match step.perform_as(actor).await {
                    Ok(()) => StepReport::passed(index, text, step_start.elapsed()),
                    Err(e) => {
                        failed = true;
                        let mut entry =
                            StepReport::failed(index, text, step_start.elapsed(), e.to_string());
                        entry.screenshot = self.capture_failure(journey, index, actor).await;
                        entry
                    }
                }
            };
            observer(&entry);
            report.steps.push(entry);
        }
        report.finish(started.elapsed());

        if failed {
            tracing::error!(duration_ms = report.duration_ms, "journey failed");
        } else {
            tracing::info!(duration_ms = report.duration_ms, "journey passed");
        }
        report
    }

    async fn capture_failure(
        &self,
        journey: &Journey,
        index: usize,
        actor: &Actor,
    ) -> Option<PathBuf> {
        let dir = self.screenshot_dir.as_ref()?;
        let png = match actor.screenshot().await {
            Ok(png) if !png.is_empty() => png,
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "failure screenshot unavailable");
                return None;
            }
        };
        let path = dir.join(format!("{}-step{index}.png", journey.name()));
        let written = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, png).await
        };
        match written.await {
            Ok(()) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "could not write screenshot");
                None
            }
        }
    }
}
