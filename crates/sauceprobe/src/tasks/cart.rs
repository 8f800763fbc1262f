//! Cart screen tasks.

use super::Task;
use crate::actor::Actor;
use crate::persona::{CartExpectation, Persona};
use crate::result::{ProbeError, ProbeResult};
use crate::verify::VerificationOutcome;
use crate::wait::{Condition, OnTimeout};
use async_trait::async_trait;

/// Tasks on the cart screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartTask {
    /// Check the number of line items against the persona's expectation
    ValidateItemCount {
        /// Whose expectation applies
        persona: Persona,
    },
    /// Click the checkout button
    ProceedToCheckout,
}

#[async_trait]
impl Task for CartTask {
    fn describe(&self) -> String {
        match self {
            Self::ValidateItemCount { persona } => format!("validate cart items for {persona}"),
            Self::ProceedToCheckout => "proceed to checkout".to_string(),
        }
    }

    async fn perform_as(&self, actor: &mut Actor) -> ProbeResult<()> {
        match self {
            Self::ValidateItemCount { persona } => validate_item_count(actor, persona).await,
            Self::ProceedToCheckout => {
                let catalog = actor.catalog();
                actor.click_on(&catalog.cart.checkout_button).await
            }
        }
    }
}

async fn validate_item_count(actor: &mut Actor, persona: &Persona) -> ProbeResult<()> {
    let policy = actor.policy_for(persona)?;
    let catalog = actor.catalog();
    let items = &catalog.cart.items;

    let settled = Condition::CountSatisfies {
        selector: items.selector().clone(),
        expectation: policy.cart,
    };
    actor.wait_until(&settled, OnTimeout::WarnAndContinue).await?;

    let count = actor.find_all(items).await?.len();
    tracing::info!(%persona, count, expected = %policy.cart, "cart items");
    if count == 0 && matches!(policy.cart, CartExpectation::AtLeast(_)) {
        return Err(ProbeError::precondition("no items found in cart"));
    }
    VerificationOutcome::count("cart item count", policy.cart, count).into_result()
}
