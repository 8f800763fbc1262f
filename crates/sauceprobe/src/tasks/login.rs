//! Login screen tasks.

use super::Task;
use crate::actor::Actor;
use crate::persona::{LoginExpectation, Persona};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{Condition, OnTimeout};
use async_trait::async_trait;

/// Tasks on the login screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginTask {
    /// Open the storefront root
    NavigateToSite,
    /// Submit credentials and confirm the persona's expected outcome
    Authenticate {
        /// Who is logging in
        persona: Persona,
        /// Password to submit
        password: String,
    },
    /// Navigate, then authenticate
    LogIn {
        /// Who is logging in
        persona: Persona,
        /// Password to submit
        password: String,
    },
}

impl LoginTask {
    /// Authenticate as `persona`
    #[must_use]
    pub fn authenticate(persona: Persona, password: impl Into<String>) -> Self {
        Self::Authenticate {
            persona,
            password: password.into(),
        }
    }

    /// Navigate and authenticate as `persona`
    #[must_use]
    pub fn log_in(persona: Persona, password: impl Into<String>) -> Self {
        Self::LogIn {
            persona,
            password: password.into(),
        }
    }
}

#[async_trait]
impl Task for LoginTask {
    fn describe(&self) -> String {
        match self {
            Self::NavigateToSite => "navigate to the storefront".to_string(),
            Self::Authenticate { persona, .. } => format!("authenticate as {persona}"),
            Self::LogIn { persona, .. } => format!("log in as {persona}"),
        }
    }

    async fn perform_as(&self, actor: &mut Actor) -> ProbeResult<()> {
        match self {
            Self::NavigateToSite => navigate_to_site(actor).await,
            Self::Authenticate { persona, password } => {
                authenticate(actor, persona, password).await
            }
            Self::LogIn { persona, password } => {
                navigate_to_site(actor).await?;
                authenticate(actor, persona, password).await
            }
        }
    }
}

async fn navigate_to_site(actor: &mut Actor) -> ProbeResult<()> {
    let url = actor.base_url().to_string();
    actor.open(&url).await
}

async fn authenticate(actor: &mut Actor, persona: &Persona, password: &str) -> ProbeResult<()> {
    // Unknown personas fail before touching the page
    let policy = actor.policy_for(persona)?;
    let catalog = actor.catalog();
    let login = &catalog.login;

    actor.enter_into(&login.username, persona.username()).await?;
    actor.enter_into(&login.password, password).await?;
    actor.click_on(&login.login_button).await?;

    let inventory = Condition::Present(catalog.inventory.items.selector().clone());
    match policy.login {
        LoginExpectation::Inventory => {
            actor
                .wait_until_extended(&inventory, policy.login_grace, OnTimeout::Fail)
                .await?;
            tracing::info!(%persona, "inventory loaded");
        }
        LoginExpectation::LockedOut => {
            let banner = Condition::Displayed(login.error_message.selector().clone());
            actor
                .wait_until(&banner, OnTimeout::Fail)
                .await
                .map_err(|e| match e {
                    ProbeError::Timeout { ms, .. } => {
                        tracing::error!(%persona, ms, "expected lockout message did not appear");
                        ProbeError::Timeout {
                            waited_for: "the expected lockout message".to_string(),
                            ms,
                        }
                    }
                    other => other,
                })?;
            let message = actor.read_text(&login.error_message).await?;
            tracing::info!(%persona, %message, "login rejected as expected");
            if !Condition::Absent(catalog.inventory.items.selector().clone())
                .check(actor.driver())
                .await?
            {
                return Err(ProbeError::mismatch(
                    "inventory after lockout",
                    "absent",
                    "present",
                ));
            }
        }
    }
    Ok(())
}
