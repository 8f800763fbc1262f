//! Checkout tasks: information form, overview and finish.

use super::Task;
use crate::actor::Actor;
use crate::persona::{CheckoutWait, Persona};
use crate::result::ProbeResult;
use crate::verify::VerificationOutcome;
use crate::wait::{Condition, OnTimeout};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Buyer details typed into checkout step one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Postal code
    pub postal_code: String,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self::new("John", "Doe", "12345")
    }
}

impl CheckoutForm {
    /// Create a form
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            postal_code: postal_code.into(),
        }
    }
}

/// Tasks on the checkout screens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTask {
    /// Fill step one and continue
    FillForm(CheckoutForm),
    /// Confirm the overview (step two) was reached
    VerifyReachedStepTwo {
        /// Whose checkout handling applies
        persona: Persona,
    },
    /// Click finish on the overview
    ClickFinish {
        /// Whose checkout handling applies
        persona: Persona,
    },
    /// Check the form validation message
    VerifyFormError {
        /// Exact expected text
        expected: String,
    },
}

#[async_trait]
impl Task for CheckoutTask {
    fn describe(&self) -> String {
        match self {
            Self::FillForm(form) => format!(
                "fill checkout form ({} / {} / {})",
                form.first_name, form.last_name, form.postal_code
            ),
            Self::VerifyReachedStepTwo { persona } => {
                format!("verify checkout overview for {persona}")
            }
            Self::ClickFinish { persona } => format!("finish order for {persona}"),
            Self::VerifyFormError { expected } => format!("verify form error '{expected}'"),
        }
    }

    async fn perform_as(&self, actor: &mut Actor) -> ProbeResult<()> {
        match self {
            Self::FillForm(form) => fill_form(actor, form).await,
            Self::VerifyReachedStepTwo { persona } => verify_reached_step_two(actor, persona).await,
            Self::ClickFinish { persona } => click_finish(actor, persona).await,
            Self::VerifyFormError { expected } => {
                let catalog = actor.catalog();
                let actual = actor.read_text(&catalog.checkout.error_message).await?;
                VerificationOutcome::text_equals("checkout form error", expected, &actual)
                    .into_result()
            }
        }
    }
}

async fn fill_form(actor: &mut Actor, form: &CheckoutForm) -> ProbeResult<()> {
    let catalog = actor.catalog();
    let page = &catalog.checkout;
    actor.enter_into(&page.first_name, &form.first_name).await?;
    actor.enter_into(&page.last_name, &form.last_name).await?;
    actor.enter_into(&page.postal_code, &form.postal_code).await?;
    actor.click_on(&page.continue_button).await
}

async fn verify_reached_step_two(actor: &mut Actor, persona: &Persona) -> ProbeResult<()> {
    let policy = actor.policy_for(persona)?;
    match policy.checkout {
        CheckoutWait::Settle => {
            let settle = actor.timings().network_settle();
            actor.settle(settle, "checkout overview has no readiness signal").await;
            Ok(())
        }
        CheckoutWait::UrlMarker => {
            let catalog = actor.catalog();
            let marker = &catalog.checkout.step_two_marker;
            actor
                .wait_until(&Condition::UrlContains(marker.clone()), OnTimeout::WarnAndContinue)
                .await?;
            let url = actor.current_url().await?;
            VerificationOutcome::contains("checkout overview URL", &url, marker).into_result()
        }
    }
}

async fn click_finish(actor: &mut Actor, persona: &Persona) -> ProbeResult<()> {
    let policy = actor.policy_for(persona)?;
    match policy.checkout {
        CheckoutWait::Settle => {
            let settle = actor.timings().network_settle();
            actor.settle(settle, "finish skipped for slow checkout").await;
            Ok(())
        }
        CheckoutWait::UrlMarker => {
            let catalog = actor.catalog();
            actor.click_on(&catalog.checkout.finish_button).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timings;
    use crate::result::ProbeError;
    use crate::sim::StorefrontSim;
    use crate::tasks::{CartTask, InventoryTask, LoginTask};

    async fn at_checkout(persona: Persona) -> Actor {
        let mut actor = Actor::new("shopper", Box::new(StorefrontSim::saucedemo()))
            .with_timings(Timings::brisk())
            .with_seed(5);
        actor
            .attempts_to(&LoginTask::log_in(persona.clone(), "secret_sauce"))
            .await
            .unwrap();
        actor
            .attempts_to(&InventoryTask::AddRandomItems { persona })
            .await
            .unwrap();
        actor.attempts_to(&CartTask::ProceedToCheckout).await.unwrap();
        actor
    }

    #[test]
    fn test_default_form() {
        let form = CheckoutForm::default();
        assert_eq!(form, CheckoutForm::new("John", "Doe", "12345"));
    }

    #[tokio::test]
    async fn test_standard_user_reaches_overview_and_finishes() {
        let mut actor = at_checkout(Persona::StandardUser).await;
        actor
            .attempts_to(&CheckoutTask::FillForm(CheckoutForm::default()))
            .await
            .unwrap();
        actor
            .attempts_to(&CheckoutTask::VerifyReachedStepTwo {
                persona: Persona::StandardUser,
            })
            .await
            .unwrap();
        actor
            .attempts_to(&CheckoutTask::ClickFinish {
                persona: Persona::StandardUser,
            })
            .await
            .unwrap();
        assert!(actor
            .current_url()
            .await
            .unwrap()
            .ends_with("/checkout-complete.html"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_postal_code_shows_error() {
        let mut actor = at_checkout(Persona::StandardUser).await;
        actor
            .attempts_to(&CheckoutTask::FillForm(CheckoutForm::new("John", "Doe", "")))
            .await
            .unwrap();
        actor
            .attempts_to(&CheckoutTask::VerifyFormError {
                expected: "Error: Postal Code is required".to_string(),
            })
            .await
            .unwrap();
        let err = actor
            .attempts_to(&CheckoutTask::VerifyReachedStepTwo {
                persona: Persona::StandardUser,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Mismatch { .. }));
    }

    #[tokio::test]
    async fn test_problem_user_last_name_bug() {
        let mut actor = at_checkout(Persona::ProblemUser).await;
        actor
            .attempts_to(&CheckoutTask::FillForm(CheckoutForm::default()))
            .await
            .unwrap();
        actor
            .attempts_to(&CheckoutTask::VerifyFormError {
                expected: "Error: Last Name is required".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_glitch_user_settles_instead_of_polling() {
        let mut actor = Actor::new("shopper", Box::new(StorefrontSim::saucedemo()))
            .with_timings(Timings::brisk());
        let start = tokio::time::Instant::now();
        actor
            .attempts_to(&CheckoutTask::VerifyReachedStepTwo {
                persona: Persona::PerformanceGlitchUser,
            })
            .await
            .unwrap();
        assert!(start.elapsed() >= Timings::brisk().network_settle());
    }

    #[tokio::test]
    async fn test_form_error_text_is_exact() {
        let mut actor = at_checkout(Persona::StandardUser).await;
        actor
            .attempts_to(&CheckoutTask::FillForm(CheckoutForm::new("", "Doe", "1")))
            .await
            .unwrap();
        let err = actor
            .attempts_to(&CheckoutTask::VerifyFormError {
                expected: "First Name is required".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Error: First Name is required"));
    }
}
