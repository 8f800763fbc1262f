use super::ShopperWorld;
use cucumber::{then, when};
use sauceprobe::prelude::*;

#[when("the user adds products to the cart and proceeds to checkout")]
async fn adds_products_default(world: &mut ShopperWorld) {
    world
        .perform(InventoryTask::AddRandomItems {
            persona: Persona::StandardUser,
        })
        .await;
}

#[when(expr = "the user adds products to the cart for {string}")]
async fn adds_products_for(world: &mut ShopperWorld, username: String) {
    world
        .perform(InventoryTask::AddRandomItems {
            persona: Persona::parse(&username),
        })
        .await;
}

#[when(expr = "the user validates the cart items for {string}")]
async fn validates_cart(world: &mut ShopperWorld, username: String) {
    world
        .perform(CartTask::ValidateItemCount {
            persona: Persona::parse(&username),
        })
        .await;
}

#[when("the user validates item images")]
async fn validates_images(world: &mut ShopperWorld) {
    world.perform(InventoryTask::ValidateItemImages).await;
}

#[when("the user proceeds to checkout")]
async fn proceeds_to_checkout(world: &mut ShopperWorld) {
    world.perform(CartTask::ProceedToCheckout).await;
}

#[then("the user should see the order overview and complete the purchase")]
async fn sees_overview_and_completes(world: &mut ShopperWorld) {
    world.perform(CartTask::ProceedToCheckout).await;
}

#[then("the user should be able to logout")]
async fn logs_out(world: &mut ShopperWorld) {
    world.perform(InventoryTask::Logout).await;
}

#[then(expr = "{int} product(s) should have been added")]
async fn products_added(world: &mut ShopperWorld, expected: usize) {
    let report = world.actor.notes().added.clone().expect("no add-to-cart run");
    assert_eq!(report.added.len(), expected, "{report:?}");
}

#[then(expr = "at most {int} product(s) should have been added")]
async fn at_most_products_added(world: &mut ShopperWorld, limit: usize) {
    let report = world.actor.notes().added.clone().expect("no add-to-cart run");
    assert!(!report.added.is_empty(), "nothing was added: {report:?}");
    assert!(report.added.len() <= limit, "{report:?}");
    assert_eq!(report.selected.len(), limit);
}

#[then(expr = "the product images should be reported as {word}")]
async fn images_reported(world: &mut ShopperWorld, expected: String) {
    let report = world.actor.notes().images.clone().expect("no image check ran");
    let actual = match report {
        ImageLoadReport::Distinct { .. } => "distinct",
        ImageLoadReport::Identical { .. } => "identical",
    };
    assert_eq!(actual, expected);
}
