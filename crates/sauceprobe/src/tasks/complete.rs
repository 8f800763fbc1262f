//! Order confirmation tasks.

use super::Task;
use crate::actor::Actor;
use crate::catalog::PageObject;
use crate::result::ProbeResult;
use crate::verify::VerificationOutcome;
use crate::wait::{Condition, OnTimeout};
use async_trait::async_trait;

/// Confirmation header text
pub const THANK_YOU_HEADER: &str = "Thank you for your order!";

/// Confirmation detail text
pub const DISPATCH_TEXT: &str =
    "Your order has been dispatched, and will arrive just as fast as the pony can get there!";

/// Tasks on the confirmation screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompleteTask {
    /// Check the header and the dispatch text
    VerifyOrderCompletion {
        /// Expected header text
        header: String,
    },
    /// Return to the product listing
    BackToHome,
}

impl CompleteTask {
    /// Verify completion with the stock header
    #[must_use]
    pub fn verify_order_completion() -> Self {
        Self::VerifyOrderCompletion {
            header: THANK_YOU_HEADER.to_string(),
        }
    }
}

#[async_trait]
impl Task for CompleteTask {
    fn describe(&self) -> String {
        match self {
            Self::VerifyOrderCompletion { header } => format!("verify order completion '{header}'"),
            Self::BackToHome => "go back to products".to_string(),
        }
    }

    async fn perform_as(&self, actor: &mut Actor) -> ProbeResult<()> {
        let catalog = actor.catalog();
        let page = &catalog.complete;
        match self {
            Self::VerifyOrderCompletion { header } => {
                let element = actor.ensure_displayed(&page.thanks_message).await?;
                let actual = actor.driver().text(&element).await?;
                VerificationOutcome::text_equals("confirmation header", header, &actual)
                    .into_result()?;

                let element = actor.ensure_displayed(&page.complete_text).await?;
                let actual = actor.driver().text(&element).await?;
                VerificationOutcome::text_equals("confirmation detail", DISPATCH_TEXT, &actual)
                    .into_result()?;
                tracing::info!("order confirmed");
                Ok(())
            }
            Self::BackToHome => {
                actor.click_on(&page.back_home_button).await?;
                let home = Condition::UrlContains(catalog.inventory.url_pattern().to_string());
                actor.wait_until(&home, OnTimeout::Fail).await?;
                Ok(())
            }
        }
    }
}
