//! Page flow tasks.
//!
//! Each task is one business-level action on one screen. Tasks are small
//! enums so a journey step can hold exactly one of them by value.

mod cart;
mod checkout;
mod complete;
mod inventory;
mod login;

pub use cart::CartTask;
pub use checkout::{CheckoutForm, CheckoutTask};
pub use complete::{CompleteTask, DISPATCH_TEXT, THANK_YOU_HEADER};
pub use inventory::{AddToCartReport, ImageLoadReport, InventoryTask};
pub use login::LoginTask;

use crate::actor::Actor;
use crate::result::ProbeResult;
use async_trait::async_trait;

/// Something an actor can perform
#[async_trait]
pub trait Task: Send + Sync {
    /// Human-readable description for logs and reports
    fn describe(&self) -> String;

    /// Perform the task
    async fn perform_as(&self, actor: &mut Actor) -> ProbeResult<()>;
}
