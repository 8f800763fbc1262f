//! Inventory screen tasks: product selection, image check, logout.

use super::Task;
use crate::actor::Actor;
use crate::persona::Persona;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{Condition, OnTimeout};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of one add-to-cart pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCartReport {
    /// Sampled product indexes, in draw order
    pub selected: Vec<usize>,
    /// Indexes whose add control was clicked
    pub added: Vec<usize>,
    /// Indexes skipped because the control was missing or broken
    pub skipped: Vec<usize>,
}

/// Outcome of the image check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ImageLoadReport {
    /// Products show different images
    Distinct {
        /// Images with a non-empty source
        count: usize,
    },
    /// Every product shows the same image
    Identical {
        /// Images with a non-empty source
        count: usize,
        /// The shared source
        src: String,
    },
}

/// Tasks on the inventory screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryTask {
    /// Add a persona-dependent number of random products, then open the cart
    AddRandomItems {
        /// Whose quota applies
        persona: Persona,
    },
    /// Check that product images loaded
    ValidateItemImages,
    /// Log out through the side menu
    Logout,
}

#[async_trait]
impl Task for InventoryTask {
    fn describe(&self) -> String {
        match self {
            Self::AddRandomItems { persona } => format!("add random products as {persona}"),
            Self::ValidateItemImages => "validate product images".to_string(),
            Self::Logout => "log out".to_string(),
        }
    }

    async fn perform_as(&self, actor: &mut Actor) -> ProbeResult<()> {
        match self {
            Self::AddRandomItems { persona } => add_random_items(actor, persona).await,
            Self::ValidateItemImages => validate_item_images(actor).await,
            Self::Logout => logout(actor).await,
        }
    }
}

async fn add_random_items(actor: &mut Actor, persona: &Persona) -> ProbeResult<()> {
    let policy = actor.policy_for(persona)?;
    let catalog = actor.catalog();
    let inventory = &catalog.inventory;

    let items = actor.find_all(&inventory.items).await?;
    if items.is_empty() {
        return Err(ProbeError::precondition("no items available"));
    }
    let count = policy.quota.resolve(items.len());
    let selected = actor.sample_distinct(count, items.len());
    tracing::info!(%persona, available = items.len(), ?selected, seed = actor.seed().value(), "selected products");

    let mut report = AddToCartReport {
        selected: selected.clone(),
        ..AddToCartReport::default()
    };
    for index in selected {
        let item = &items[index];
        let control = actor
            .driver()
            .query_within(item, inventory.item_add_button.selector())
            .await;
        let button = match control {
            Ok(Some(button)) => button,
            Ok(None) => {
                tracing::warn!(index, "add-to-cart control missing, skipping");
                report.skipped.push(index);
                continue;
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "add-to-cart lookup failed, skipping");
                report.skipped.push(index);
                continue;
            }
        };
        match actor.driver_mut().click(&button).await {
            Ok(()) => report.added.push(index),
            Err(e) => {
                tracing::warn!(index, error = %e, "add-to-cart click failed, skipping");
                report.skipped.push(index);
            }
        }
    }
    tracing::info!(added = report.added.len(), skipped = report.skipped.len(), "add-to-cart pass done");
    actor.notes_mut().added = Some(report);

    actor.click_on(&inventory.cart_link).await
}

async fn validate_item_images(actor: &mut Actor) -> ProbeResult<()> {
    let catalog = actor.catalog();
    let images = actor.find_all(&catalog.inventory.item_image).await?;

    let mut sources = Vec::with_capacity(images.len());
    for image in &images {
        if let Some(src) = actor.driver().attribute(image, "src").await? {
            if !src.is_empty() {
                sources.push(src);
            }
        }
    }
    let Some(first) = sources.first() else {
        return Err(ProbeError::precondition("no product images found"));
    };

    let report = if sources.iter().all(|s| s == first) {
        tracing::warn!(count = sources.len(), src = %first, "images did not load distinctly");
        ImageLoadReport::Identical {
            count: sources.len(),
            src: first.clone(),
        }
    } else {
        tracing::info!(count = sources.len(), "images loaded correctly");
        ImageLoadReport::Distinct {
            count: sources.len(),
        }
    };
    actor.notes_mut().images = Some(report);
    Ok(())
}

async fn logout(actor: &mut Actor) -> ProbeResult<()> {
    let catalog = actor.catalog();
    let inventory = &catalog.inventory;

    actor.click_on(&inventory.open_menu).await?;
    let link = actor.ensure_displayed(&inventory.logout_link).await?;
    actor.driver_mut().click(&link).await?;

    let login = Condition::Present(catalog.login.login_button.selector().clone());
    actor.wait_until(&login, OnTimeout::Fail).await?;
    tracing::info!("logged out");
    Ok(())
}
