//! Step definitions and the scenario world.

mod checkout;
mod login;
mod shopping;

use cucumber::World;
use sauceprobe::prelude::*;

/// Sampler seed shared by every scenario so product picks replay
pub const SCENARIO_SEED: u64 = 0x5A0C_E0DE;

/// Per-scenario state: one actor on a fresh simulated storefront
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct ShopperWorld {
    pub actor: Actor,
    /// Result of the last step that records instead of failing
    pub outcome: Option<ProbeResult<()>>,
}

impl ShopperWorld {
    fn new() -> Self {
        let actor = Actor::new("User", Box::new(StorefrontSim::saucedemo()))
            .with_timings(Timings::brisk())
            .with_seed(SCENARIO_SEED);
        Self {
            actor,
            outcome: None,
        }
    }

    /// Perform a task; the step fails with the task's error
    pub async fn perform<T: Task>(&mut self, task: T) {
        if let Err(e) = self.actor.attempts_to(&task).await {
            panic!("{} failed: {e}", task.describe());
        }
    }

    /// Perform a task and keep its result for a later `Then`
    pub async fn attempt<T: Task>(&mut self, task: T) {
        let result = self.actor.attempts_to(&task).await;
        self.outcome = Some(result);
    }

    /// Perform a parsed step and keep its result
    pub async fn attempt_step(&mut self, step: Step) {
        let result = step.perform_as(&mut self.actor).await;
        self.outcome = Some(result);
    }

    /// The recorded result
    pub fn outcome(&self) -> &ProbeResult<()> {
        self.outcome
            .as_ref()
            .expect("no step recorded an outcome in this scenario")
    }
}
