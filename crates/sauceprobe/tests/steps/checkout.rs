use super::ShopperWorld;
use cucumber::{then, when};
use sauceprobe::prelude::*;

#[when("fills in the required checkout information")]
async fn fills_required_info(world: &mut ShopperWorld) {
    world
        .perform(CheckoutTask::FillForm(CheckoutForm::default()))
        .await;
}

#[when(expr = "the user fills in checkout information {string} {string} {string}")]
async fn fills_info(world: &mut ShopperWorld, first: String, last: String, postal: String) {
    world
        .perform(CheckoutTask::FillForm(CheckoutForm::new(first, last, postal)))
        .await;
}

#[then(expr = "the user should reach the order overview for {string}")]
async fn reaches_overview(world: &mut ShopperWorld, username: String) {
    world
        .perform(CheckoutTask::VerifyReachedStepTwo {
            persona: Persona::parse(&username),
        })
        .await;
}

#[then(expr = "the user finishes the order for {string}")]
async fn finishes_order(world: &mut ShopperWorld, username: String) {
    world
        .perform(CheckoutTask::ClickFinish {
            persona: Persona::parse(&username),
        })
        .await;
}

#[then(expr = "the checkout form should show the error {string}")]
async fn form_error(world: &mut ShopperWorld, expected: String) {
    world
        .perform(CheckoutTask::VerifyFormError { expected })
        .await;
}

#[then(expr = "the confirmation message {string} should be displayed")]
async fn confirmation_message(world: &mut ShopperWorld, header: String) {
    world
        .perform(CompleteTask::VerifyOrderCompletion { header })
        .await;
}

#[then("the user should be able to go back to home")]
async fn back_home(world: &mut ShopperWorld) {
    world.perform(CompleteTask::BackToHome).await;
}

#[then(expr = "the journey text {string} should bind to a step")]
async fn journey_text_binds(world: &mut ShopperWorld, text: String) {
    let step = Step::parse(&text, &CheckoutForm::default()).expect("step should parse");
    world.attempt_step(step).await;
    if let Err(e) = world.outcome() {
        panic!("'{text}' failed: {e}");
    }
}
