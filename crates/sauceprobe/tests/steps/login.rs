use super::ShopperWorld;
use cucumber::{given, then, when};
use sauceprobe::prelude::*;

#[given("the user opens the storefront")]
async fn opens_storefront(world: &mut ShopperWorld) {
    world.perform(LoginTask::NavigateToSite).await;
}

#[given(expr = "the user logs in with valid credentials username {string} and password {string}")]
async fn logs_in(world: &mut ShopperWorld, username: String, password: String) {
    world
        .perform(LoginTask::log_in(Persona::parse(&username), password))
        .await;
}

#[when(expr = "the user authenticates as {string} with password {string}")]
async fn authenticates(world: &mut ShopperWorld, username: String, password: String) {
    world
        .attempt(LoginTask::authenticate(Persona::parse(&username), password))
        .await;
}

#[then("the attempt should succeed")]
async fn attempt_succeeds(world: &mut ShopperWorld) {
    if let Err(e) = world.outcome() {
        panic!("expected success, got: {e}");
    }
}

#[then(expr = "the attempt should fail with {string}")]
async fn attempt_fails_with(world: &mut ShopperWorld, fragment: String) {
    match world.outcome() {
        Ok(()) => panic!("expected a failure mentioning '{fragment}'"),
        Err(e) => assert!(
            e.to_string().contains(&fragment),
            "'{e}' does not mention '{fragment}'"
        ),
    }
}

#[then("the inventory should be shown")]
async fn inventory_shown(world: &mut ShopperWorld) {
    let catalog = world.actor.catalog();
    world
        .actor
        .ensure_displayed(&catalog.inventory.items)
        .await
        .expect("inventory list");
}

#[then("the login page should be shown")]
async fn login_page_shown(world: &mut ShopperWorld) {
    let catalog = world.actor.catalog();
    world
        .actor
        .ensure_displayed(&catalog.login.login_button)
        .await
        .expect("login button");
    let url = world.actor.current_url().await.expect("current url");
    assert!(!url.contains("inventory.html"), "still on {url}");
}

#[then("no browser interaction should have happened")]
async fn no_interaction(world: &mut ShopperWorld) {
    let url = world.actor.current_url().await.expect("current url");
    assert_eq!(url, "about:blank");
}
