//! In-process simulated storefront.
//!
//! [`StorefrontSim`] implements [`BrowserDriver`] over a small model of the
//! Saucedemo pages, including the quirks of each demo account:
//!
//! | account | quirk |
//! |---------|-------|
//! | `locked_out_user` | login rejected with the lockout banner |
//! | `problem_user` | every product shows the same broken image, one add button is dead, typing a last name overwrites the first name |
//! | `performance_glitch_user` | inventory stays empty for a while after login |
//!
//! Only the selector shapes the catalog uses are understood: `[data-test="x"]`,
//! `tag[data-test*='x']`, `.class`, `#id` and `//tag[contains(text(), 'x')]`.

use crate::config::{DEFAULT_BASE_URL, DEFAULT_PASSWORD};
use crate::driver::{BrowserDriver, ElementHandle};
use crate::locator::Selector;
use crate::persona::Persona;
use crate::result::{ProbeError, ProbeResult};
use crate::tasks::{DISPATCH_TEXT, THANK_YOU_HEADER};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Product slugs and image sources, in listing order
const PRODUCTS: [(&str, &str); 6] = [
    ("sauce-labs-backpack", "/static/media/sauce-backpack-1200x1500.0a0b85a3.jpg"),
    ("sauce-labs-bike-light", "/static/media/bike-light-1200x1500.37c843b0.jpg"),
    ("sauce-labs-bolt-t-shirt", "/static/media/bolt-shirt-1200x1500.c2599ac5.jpg"),
    ("sauce-labs-fleece-jacket", "/static/media/sauce-pullover-1200x1500.51d7ffaf.jpg"),
    ("sauce-labs-onesie", "/static/media/red-onesie-1200x1500.2ec615b2.jpg"),
    ("test.allthethings()-t-shirt-(red)", "/static/media/red-tatt-1200x1500.30dadef4.jpg"),
];

/// Image every product shows for `problem_user`
pub const BROKEN_IMAGE_SRC: &str = "/static/media/sl-404.168b1cce.jpg";

/// Product whose add button does nothing for `problem_user`
pub const DEAD_ADD_BUTTON: usize = 5;

/// Default post-login delay for `performance_glitch_user`
pub const DEFAULT_GLITCH_DELAY: Duration = Duration::from_millis(1_200);

const LOCKED_OUT: &str = "Epic sadface: Sorry, this user has been locked out.";
const BAD_CREDENTIALS: &str =
    "Epic sadface: Username and password do not match any user in this service";
const USERNAME_REQUIRED: &str = "Epic sadface: Username is required";
const PASSWORD_REQUIRED: &str = "Epic sadface: Password is required";

/// A mutating call the driver received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    /// navigate(url)
    Navigate(String),
    /// click(element id)
    Click(String),
    /// clear(element id)
    Clear(String),
    /// type_text(element id, text)
    Type {
        /// Element id
        id: String,
        /// Typed text
        text: String,
    },
}

/// Shared call log
pub type CallHistory = Arc<Mutex<Vec<DriverCall>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Blank,
    Login,
    Inventory,
    Cart,
    CheckoutInfo,
    CheckoutOverview,
    Complete,
}

impl Page {
    const fn path(self) -> &'static str {
        match self {
            Self::Blank | Self::Login => "/",
            Self::Inventory => "/inventory.html",
            Self::Cart => "/cart.html",
            Self::CheckoutInfo => "/checkout-step-one.html",
            Self::CheckoutOverview => "/checkout-step-two.html",
            Self::Complete => "/checkout-complete.html",
        }
    }

    fn from_path(path: &str) -> Option<Self> {
        match path {
            "" | "/" | "/index.html" => Some(Self::Login),
            "/inventory.html" => Some(Self::Inventory),
            "/cart.html" => Some(Self::Cart),
            "/checkout-step-one.html" => Some(Self::CheckoutInfo),
            "/checkout-step-two.html" => Some(Self::CheckoutOverview),
            "/checkout-complete.html" => Some(Self::Complete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CheckoutFields {
    first_name: String,
    last_name: String,
    postal_code: String,
}

/// One rendered element
#[derive(Debug, Clone)]
struct Node {
    id: String,
    tag: &'static str,
    parent: Option<String>,
    data_test: Option<String>,
    html_id: Option<&'static str>,
    class: Option<&'static str>,
    text: String,
    src: Option<String>,
    displayed: bool,
}

impl Node {
    fn new(id: impl Into<String>, tag: &'static str) -> Self {
        Self {
            id: id.into(),
            tag,
            parent: None,
            data_test: None,
            html_id: None,
            class: None,
            text: String::new(),
            src: None,
            displayed: true,
        }
    }

    fn data_test(mut self, value: impl Into<String>) -> Self {
        self.data_test = Some(value.into());
        self
    }

    fn html_id(mut self, value: &'static str) -> Self {
        self.html_id = Some(value);
        self
    }

    fn class(mut self, value: &'static str) -> Self {
        self.class = Some(value);
        self
    }

    fn text(mut self, value: impl Into<String>) -> Self {
        self.text = value.into();
        self
    }

    fn child_of(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    fn handle(&self) -> ElementHandle {
        ElementHandle::new(self.id.clone(), self.tag)
    }
}

/// Parsed selector shapes the simulator understands
#[derive(Debug, PartialEq, Eq)]
enum Matcher<'a> {
    DataTest(&'a str),
    DataTestContains { tag: &'a str, fragment: &'a str },
    Class(&'a str),
    HtmlId(&'a str),
    TextContains { tag: &'a str, fragment: &'a str },
}

impl<'a> Matcher<'a> {
    fn parse(selector: &'a Selector) -> ProbeResult<Self> {
        let expr = selector.expr();
        let parsed = match selector {
            Selector::Css(_) => {
                if let Some(value) = expr
                    .strip_prefix("[data-test=\"")
                    .and_then(|s| s.strip_suffix("\"]"))
                {
                    Some(Self::DataTest(value))
                } else if let Some((tag, rest)) = expr.split_once("[data-test*='") {
                    rest.strip_suffix("']")
                        .map(|fragment| Self::DataTestContains { tag, fragment })
                } else if let Some(class) = expr.strip_prefix('.') {
                    Some(Self::Class(class))
                } else {
                    expr.strip_prefix('#').map(Self::HtmlId)
                }
            }
            Selector::XPath(_) => expr.strip_prefix("//").and_then(|rest| {
                let (tag, rest) = rest.split_once("[contains(text(), '")?;
                let fragment = rest.strip_suffix("')]")?;
                Some(Self::TextContains { tag, fragment })
            }),
        };
        parsed.ok_or_else(|| ProbeError::Page {
            message: format!("simulator cannot evaluate selector {selector}"),
        })
    }

    fn matches(&self, node: &Node) -> bool {
        match *self {
            Self::DataTest(value) => node.data_test.as_deref() == Some(value),
            Self::DataTestContains { tag, fragment } => {
                (tag.is_empty() || node.tag == tag)
                    && node.data_test.as_deref().is_some_and(|d| d.contains(fragment))
            }
            Self::Class(class) => node.class == Some(class),
            Self::HtmlId(id) => node.html_id == Some(id),
            Self::TextContains { tag, fragment } => node.tag == tag && node.text.contains(fragment),
        }
    }
}

/// Simulated Saucedemo session
#[derive(Debug)]
pub struct StorefrontSim {
    base_url: String,
    glitch_delay: Duration,
    product_count: usize,
    page: Page,
    user: Option<Persona>,
    logged_in_at: Option<Instant>,
    username: String,
    password: String,
    login_error: Option<String>,
    cart: BTreeSet<usize>,
    menu_open: bool,
    fields: CheckoutFields,
    checkout_error: Option<String>,
    closed: bool,
    history: CallHistory,
}

impl StorefrontSim {
    /// Simulator rooted at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            glitch_delay: DEFAULT_GLITCH_DELAY,
            product_count: PRODUCTS.len(),
            page: Page::Blank,
            user: None,
            logged_in_at: None,
            username: String::new(),
            password: String::new(),
            login_error: None,
            cart: BTreeSet::new(),
            menu_open: false,
            fields: CheckoutFields::default(),
            checkout_error: None,
            closed: false,
            history: Arc::default(),
        }
    }

    /// Simulator rooted at the public storefront URL
    #[must_use]
    pub fn saucedemo() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }

    /// Set how long the glitch persona's inventory stays empty
    #[must_use]
    pub const fn with_glitch_delay(mut self, delay: Duration) -> Self {
        self.glitch_delay = delay;
        self
    }

    /// List only the first `count` products (at most the full catalog)
    #[must_use]
    pub fn with_product_count(mut self, count: usize) -> Self {
        self.product_count = count.min(PRODUCTS.len());
        self
    }

    /// Handle to the call log; stays valid after the simulator is boxed
    #[must_use]
    pub fn history_handle(&self) -> CallHistory {
        Arc::clone(&self.history)
    }

    /// Snapshot of the call log
    #[must_use]
    pub fn history(&self) -> Vec<DriverCall> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Number of products in the cart
    #[must_use]
    pub fn cart_size(&self) -> usize {
        self.cart.len()
    }

    fn record(&self, call: DriverCall) {
        if let Ok(mut history) = self.history.lock() {
            history.push(call);
        }
    }

    fn ensure_open(&self) -> ProbeResult<()> {
        if self.closed {
            return Err(ProbeError::Page {
                message: "session closed".to_string(),
            });
        }
        Ok(())
    }

    fn is(&self, persona: &Persona) -> bool {
        self.user.as_ref() == Some(persona)
    }

    fn inventory_ready(&self) -> bool {
        if !self.is(&Persona::PerformanceGlitchUser) {
            return true;
        }
        self.logged_in_at
            .is_some_and(|at| at.elapsed() >= self.glitch_delay)
    }

    fn image_src(&self, index: usize) -> String {
        if self.is(&Persona::ProblemUser) {
            BROKEN_IMAGE_SRC.to_string()
        } else {
            PRODUCTS[index].1.to_string()
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn render(&self) -> Vec<Node> {
        let mut nodes = Vec::new();
        match self.page {
            Page::Blank => {}
            Page::Login => {
                nodes.push(Node::new("username", "input").data_test("username").html_id("user-name"));
                nodes.push(Node::new("password", "input").data_test("password").html_id("password"));
                nodes.push(
                    Node::new("login-button", "input")
                        .data_test("login-button")
                        .html_id("login-button"),
                );
                if let Some(error) = &self.login_error {
                    nodes.push(Node::new("error", "h3").data_test("error").text(error.clone()));
                }
            }
            Page::Inventory => {
                self.render_header(&mut nodes);
                if self.inventory_ready() {
                    let listed = PRODUCTS.iter().take(self.product_count);
                    for (index, (slug, _)) in listed.enumerate() {
                        let item = format!("item:{index}");
                        nodes.push(Node::new(item.clone(), "div").data_test("inventory-item"));
                        let mut image = Node::new(format!("item-img:{index}"), "img")
                            .class("inventory_item_img")
                            .child_of(&item);
                        image.src = Some(self.image_src(index));
                        nodes.push(image);
                        let button = if self.cart.contains(&index) {
                            Node::new(format!("remove:{index}"), "button")
                                .data_test(format!("remove-{slug}"))
                                .text("Remove")
                        } else {
                            Node::new(format!("add:{index}"), "button")
                                .data_test(format!("add-to-cart-{slug}"))
                                .text("Add to cart")
                        };
                        nodes.push(button.child_of(&item));
                    }
                }
            }
            Page::Cart => {
                self.render_header(&mut nodes);
                self.render_line_items(&mut nodes);
                nodes.push(Node::new("continue-shopping", "button").data_test("continue-shopping"));
                nodes.push(Node::new("checkout", "button").data_test("checkout").text("Checkout"));
            }
            Page::CheckoutInfo => {
                self.render_header(&mut nodes);
                nodes.push(Node::new("firstName", "input").data_test("firstName"));
                nodes.push(Node::new("lastName", "input").data_test("lastName"));
                nodes.push(Node::new("postalCode", "input").data_test("postalCode"));
                nodes.push(Node::new("continue", "input").data_test("continue"));
                if let Some(error) = &self.checkout_error {
                    nodes.push(Node::new("error", "h3").data_test("error").text(error.clone()));
                }
            }
            Page::CheckoutOverview => {
                self.render_header(&mut nodes);
                self.render_line_items(&mut nodes);
                nodes.push(Node::new("finish", "button").data_test("finish").text("Finish"));
            }
            Page::Complete => {
                self.render_header(&mut nodes);
                nodes.push(
                    Node::new("complete-header", "h2")
                        .data_test("complete-header")
                        .text(THANK_YOU_HEADER),
                );
                nodes.push(
                    Node::new("complete-text", "div")
                        .data_test("complete-text")
                        .text(DISPATCH_TEXT),
                );
                nodes.push(
                    Node::new("back-to-products", "button")
                        .data_test("back-to-products")
                        .text("Back Home"),
                );
            }
        }
        nodes
    }

    fn render_header(&self, nodes: &mut Vec<Node>) {
        nodes.push(Node::new("cart-link", "a").data_test("shopping-cart-link"));
        nodes.push(Node::new("menu-button", "button").html_id("react-burger-menu-btn"));
        let mut logout = Node::new("logout-link", "a")
            .data_test("logout-sidebar-link")
            .html_id("logout_sidebar_link")
            .text("Logout");
        logout.displayed = self.menu_open;
        nodes.push(logout);
    }

    fn render_line_items(&self, nodes: &mut Vec<Node>) {
        for index in &self.cart {
            nodes.push(Node::new(format!("cart-item:{index}"), "div").data_test("inventory-item"));
        }
    }

    fn node(&self, element: &ElementHandle) -> ProbeResult<Node> {
        self.render()
            .into_iter()
            .find(|n| n.id == element.id)
            .ok_or_else(|| ProbeError::Page {
                message: format!("stale element {element}"),
            })
    }

    // =========================================================================
    // Behavior
    // =========================================================================

    fn submit_login(&mut self) {
        let persona = Persona::parse(&self.username);
        let error = if self.username.is_empty() {
            Some(USERNAME_REQUIRED)
        } else if self.password.is_empty() {
            Some(PASSWORD_REQUIRED)
        } else if !persona.is_known() || self.password != DEFAULT_PASSWORD {
            Some(BAD_CREDENTIALS)
        } else if persona == Persona::LockedOutUser {
            Some(LOCKED_OUT)
        } else {
            None
        };
        match error {
            Some(message) => {
                tracing::debug!(username = %self.username, message, "sim: login rejected");
                self.login_error = Some(message.to_string());
            }
            None => {
                tracing::debug!(username = %self.username, "sim: login accepted");
                self.user = Some(persona);
                self.logged_in_at = Some(Instant::now());
                self.login_error = None;
                self.page = Page::Inventory;
            }
        }
    }

    fn submit_checkout_info(&mut self) {
        let f = &self.fields;
        let error = if f.first_name.is_empty() {
            Some("Error: First Name is required")
        } else if f.last_name.is_empty() {
            Some("Error: Last Name is required")
        } else if f.postal_code.is_empty() {
            Some("Error: Postal Code is required")
        } else {
            None
        };
        match error {
            Some(message) => self.checkout_error = Some(message.to_string()),
            None => {
                self.checkout_error = None;
                self.page = Page::CheckoutOverview;
            }
        }
    }

    fn logout(&mut self) {
        self.user = None;
        self.logged_in_at = None;
        self.username.clear();
        self.password.clear();
        self.menu_open = false;
        self.page = Page::Login;
    }

    fn field_mut(&mut self, id: &str) -> Option<&mut String> {
        match id {
            "username" => Some(&mut self.username),
            "password" => Some(&mut self.password),
            "firstName" => Some(&mut self.fields.first_name),
            "lastName" => Some(&mut self.fields.last_name),
            "postalCode" => Some(&mut self.fields.postal_code),
            _ => None,
        }
    }
}

impl Default for StorefrontSim {
    fn default() -> Self {
        Self::saucedemo()
    }
}

#[async_trait]
impl BrowserDriver for StorefrontSim {
    async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        self.ensure_open()?;
        self.record(DriverCall::Navigate(url.to_string()));
        let path = url
            .strip_prefix(&self.base_url)
            .ok_or_else(|| ProbeError::Navigation {
                url: url.to_string(),
                message: format!("outside simulated site {}", self.base_url),
            })?;
        let page = Page::from_path(path).ok_or_else(|| ProbeError::Navigation {
            url: url.to_string(),
            message: "404 not found".to_string(),
        })?;
        self.menu_open = false;
        if page != Page::Login && self.user.is_none() {
            self.login_error = Some(format!(
                "Epic sadface: You can only access '{path}' when you are logged in."
            ));
            self.page = Page::Login;
        } else {
            self.page = page;
        }
        Ok(())
    }

    async fn query_selector_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
        self.ensure_open()?;
        let matcher = Matcher::parse(selector)?;
        Ok(self
            .render()
            .iter()
            .filter(|n| matcher.matches(n))
            .map(Node::handle)
            .collect())
    }

    async fn query_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> ProbeResult<Option<ElementHandle>> {
        self.ensure_open()?;
        let matcher = Matcher::parse(selector)?;
        Ok(self
            .render()
            .iter()
            .find(|n| n.parent.as_deref() == Some(parent.id.as_str()) && matcher.matches(n))
            .map(Node::handle))
    }

    async fn click(&mut self, element: &ElementHandle) -> ProbeResult<()> {
        self.ensure_open()?;
        let node = self.node(element)?;
        self.record(DriverCall::Click(node.id.clone()));
        if !node.displayed {
            return Err(ProbeError::interaction(node.id, "element not interactable"));
        }
        match node.id.as_str() {
            "login-button" => self.submit_login(),
            "cart-link" => {
                self.menu_open = false;
                self.page = Page::Cart;
            }
            "menu-button" => self.menu_open = true,
            "logout-link" => self.logout(),
            "checkout" => {
                self.fields = CheckoutFields::default();
                self.checkout_error = None;
                self.page = Page::CheckoutInfo;
            }
            "continue-shopping" | "back-to-products" => self.page = Page::Inventory,
            "continue" => self.submit_checkout_info(),
            "finish" => {
                self.cart.clear();
                self.page = Page::Complete;
            }
            id => {
                if let Some(index) = id.strip_prefix("add:").and_then(|i| i.parse::<usize>().ok()) {
                    if self.is(&Persona::ProblemUser) && index == DEAD_ADD_BUTTON {
                        return Err(ProbeError::interaction(
                            id.to_string(),
                            "add-to-cart did not respond",
                        ));
                    }
                    self.cart.insert(index);
                } else if let Some(index) = id
                    .strip_prefix("remove:")
                    .and_then(|i| i.parse::<usize>().ok())
                {
                    self.cart.remove(&index);
                }
            }
        }
        Ok(())
    }

    async fn clear(&mut self, element: &ElementHandle) -> ProbeResult<()> {
        self.ensure_open()?;
        let node = self.node(element)?;
        self.record(DriverCall::Clear(node.id.clone()));
        let field = self
            .field_mut(&node.id)
            .ok_or_else(|| ProbeError::interaction(node.id.clone(), "element is not an input"))?;
        field.clear();
        Ok(())
    }

    async fn type_text(&mut self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        self.ensure_open()?;
        let node = self.node(element)?;
        self.record(DriverCall::Type {
            id: node.id.clone(),
            text: text.to_string(),
        });
        if node.id == "lastName" && self.is(&Persona::ProblemUser) {
            // The last-name field writes into the first-name field
            self.fields.first_name = text.to_string();
            return Ok(());
        }
        let field = self
            .field_mut(&node.id)
            .ok_or_else(|| ProbeError::interaction(node.id.clone(), "element is not an input"))?;
        field.push_str(text);
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        self.ensure_open()?;
        Ok(self.node(element)?.text)
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        self.ensure_open()?;
        let node = self.node(element)?;
        Ok(match name {
            "src" => node.src,
            "data-test" => node.data_test,
            "id" => node.html_id.map(str::to_string),
            "class" => node.class.map(str::to_string),
            _ => None,
        })
    }

    async fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.ensure_open()?;
        Ok(self.node(element)?.displayed)
    }

    async fn current_url(&self) -> ProbeResult<String> {
        self.ensure_open()?;
        Ok(match self.page {
            Page::Blank => "about:blank".to_string(),
            Page::Login => format!("{}/", self.base_url),
            page => format!("{}{}", self.base_url, page.path()),
        })
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        Ok(Vec::new())
    }

    async fn close(&mut self) -> ProbeResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// Test double around [`StorefrontSim`]: chosen controls swallow clicks and
/// handle-minting queries are counted.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct InstrumentedSim {
    inner: StorefrontSim,
    ignored_clicks: Vec<&'static str>,
    handle_queries: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl InstrumentedSim {
    pub(crate) fn new(inner: StorefrontSim) -> Self {
        Self {
            inner,
            ignored_clicks: Vec::new(),
            handle_queries: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Clicks on the element with this id do nothing
    pub(crate) fn ignoring_clicks_on(mut self, id: &'static str) -> Self {
        self.ignored_clicks.push(id);
        self
    }

    pub(crate) fn handle_queries(&self) -> usize {
        self.handle_queries
            .load(std::sync::atomic::Ordering::Relaxed)
    }
}

#[cfg(test)]
#[async_trait]
impl BrowserDriver for InstrumentedSim {
    async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        self.inner.navigate(url).await
    }

    async fn query_selector_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
        self.handle_queries
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.inner.query_selector_all(selector).await
    }

    async fn count_matching(&self, selector: &Selector) -> ProbeResult<usize> {
        self.inner.count_matching(selector).await
    }

    async fn query_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> ProbeResult<Option<ElementHandle>> {
        self.inner.query_within(parent, selector).await
    }

    async fn click(&mut self, element: &ElementHandle) -> ProbeResult<()> {
        if self.ignored_clicks.contains(&element.id.as_str()) {
            return Ok(());
        }
        self.inner.click(element).await
    }

    async fn clear(&mut self, element: &ElementHandle) -> ProbeResult<()> {
        self.inner.clear(element).await
    }

    async fn type_text(&mut self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        self.inner.type_text(element, text).await
    }

    async fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        self.inner.text(element).await
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        self.inner.attribute(element, name).await
    }

    async fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.inner.is_displayed(element).await
    }

    async fn current_url(&self) -> ProbeResult<String> {
        self.inner.current_url().await
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        self.inner.screenshot().await
    }

    async fn close(&mut self) -> ProbeResult<()> {
        self.inner.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.saucedemo.com";

    async fn login(sim: &mut StorefrontSim, user: &str, password: &str) {
        sim.navigate(BASE).await.unwrap();
        let username = sim
            .query_selector(&Selector::data_test("username"))
            .await
            .unwrap()
            .unwrap();
        sim.type_text(&username, user).await.unwrap();
        let pw = sim
            .query_selector(&Selector::data_test("password"))
            .await
            .unwrap()
            .unwrap();
        sim.type_text(&pw, password).await.unwrap();
        let button = sim
            .query_selector(&Selector::data_test("login-button"))
            .await
            .unwrap()
            .unwrap();
        sim.click(&button).await.unwrap();
    }

    async fn error_text(sim: &StorefrontSim) -> String {
        let el = sim
            .query_selector(&Selector::data_test("error"))
            .await
            .unwrap()
            .unwrap();
        sim.text(&el).await.unwrap()
    }

    mod matcher_tests {
        use super::*;

        #[test]
        fn test_parse_shapes() {
            let sel = Selector::data_test("error");
            assert_eq!(Matcher::parse(&sel).unwrap(), Matcher::DataTest("error"));
            let sel = Selector::css("button[data-test*='add-to-cart']");
            assert_eq!(
                Matcher::parse(&sel).unwrap(),
                Matcher::DataTestContains {
                    tag: "button",
                    fragment: "add-to-cart"
                }
            );
            let sel = Selector::xpath("//button[contains(text(), 'Remove')]");
            assert_eq!(
                Matcher::parse(&sel).unwrap(),
                Matcher::TextContains {
                    tag: "button",
                    fragment: "Remove"
                }
            );
        }

        #[test]
        fn test_unsupported_selector() {
            assert!(Matcher::parse(&Selector::css("div > span")).is_err());
        }
    }

    mod login_tests {
        use super::*;

        #[tokio::test]
        async fn test_standard_login() {
            let mut sim = StorefrontSim::saucedemo();
            login(&mut sim, "standard_user", "secret_sauce").await;
            assert_eq!(sim.current_url().await.unwrap(), format!("{BASE}/inventory.html"));
            let items = sim
                .query_selector_all(&Selector::data_test("inventory-item"))
                .await
                .unwrap();
            assert_eq!(items.len(), 6);
        }

        #[tokio::test]
        async fn test_locked_out_message() {
            let mut sim = StorefrontSim::saucedemo();
            login(&mut sim, "locked_out_user", "secret_sauce").await;
            assert_eq!(error_text(&sim).await, LOCKED_OUT);
        }

        #[tokio::test]
        async fn test_bad_password_message() {
            let mut sim = StorefrontSim::saucedemo();
            login(&mut sim, "standard_user", "nope").await;
            assert_eq!(error_text(&sim).await, BAD_CREDENTIALS);
        }

        #[tokio::test]
        async fn test_empty_username_message() {
            let mut sim = StorefrontSim::saucedemo();
            login(&mut sim, "", "secret_sauce").await;
            assert_eq!(error_text(&sim).await, USERNAME_REQUIRED);
        }

        #[tokio::test]
        async fn test_deep_link_requires_login() {
            let mut sim = StorefrontSim::saucedemo();
            sim.navigate(&format!("{BASE}/inventory.html")).await.unwrap();
            assert!(error_text(&sim).await.contains("when you are logged in"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_glitch_inventory_appears_late() {
            let mut sim = StorefrontSim::saucedemo().with_glitch_delay(Duration::from_millis(500));
            login(&mut sim, "performance_glitch_user", "secret_sauce").await;
            let items = Selector::data_test("inventory-item");
            assert!(sim.query_selector_all(&items).await.unwrap().is_empty());
            tokio::time::sleep(Duration::from_millis(500)).await;
            assert_eq!(sim.query_selector_all(&items).await.unwrap().len(), 6);
        }

        #[tokio::test]
        async fn test_outside_url_rejected() {
            let mut sim = StorefrontSim::saucedemo();
            let err = sim.navigate("https://example.com").await.unwrap_err();
            assert!(matches!(err, ProbeError::Navigation { .. }));
        }
    }

    mod inventory_tests {
        use super::*;

        #[tokio::test]
        async fn test_problem_user_images_identical() {
            let mut sim = StorefrontSim::saucedemo();
            login(&mut sim, "problem_user", "secret_sauce").await;
            let images = sim
                .query_selector_all(&Selector::css(".inventory_item_img"))
                .await
                .unwrap();
            for img in &images {
                assert_eq!(
                    sim.attribute(img, "src").await.unwrap().as_deref(),
                    Some(BROKEN_IMAGE_SRC)
                );
            }
        }

        #[tokio::test]
        async fn test_add_and_remove_buttons_swap() {
            let mut sim = StorefrontSim::saucedemo();
            login(&mut sim, "standard_user", "secret_sauce").await;
            let add = Selector::xpath("//button[contains(text(), 'Add to cart')]");
            let remove = Selector::xpath("//button[contains(text(), 'Remove')]");
            let first = sim.query_selector(&add).await.unwrap().unwrap();
            sim.click(&first).await.unwrap();
            assert_eq!(sim.query_selector_all(&add).await.unwrap().len(), 5);
            assert_eq!(sim.query_selector_all(&remove).await.unwrap().len(), 1);
            assert_eq!(sim.cart_size(), 1);
        }

        #[tokio::test]
        async fn test_problem_user_dead_button() {
            let mut sim = StorefrontSim::saucedemo();
            login(&mut sim, "problem_user", "secret_sauce").await;
            let dead = ElementHandle::new(format!("add:{DEAD_ADD_BUTTON}"), "button");
            let err = sim.click(&dead).await.unwrap_err();
            assert!(matches!(err, ProbeError::Interaction { .. }));
            assert_eq!(sim.cart_size(), 0);
        }

        #[tokio::test]
        async fn test_logout_link_hidden_until_menu_open() {
            let mut sim = StorefrontSim::saucedemo();
            login(&mut sim, "standard_user", "secret_sauce").await;
            let link = sim
                .query_selector(&Selector::data_test("logout-sidebar-link"))
                .await
                .unwrap()
                .unwrap();
            assert!(!sim.is_displayed(&link).await.unwrap());
            assert!(sim.click(&link).await.is_err());
            let menu = sim
                .query_selector(&Selector::css("#react-burger-menu-btn"))
                .await
                .unwrap()
                .unwrap();
            sim.click(&menu).await.unwrap();
            assert!(sim.is_displayed(&link).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_history_records_mutations_only() {
        let mut sim = StorefrontSim::saucedemo();
        let history = sim.history_handle();
        login(&mut sim, "standard_user", "secret_sauce").await;
        let calls = history.lock().unwrap().clone();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], DriverCall::Navigate(BASE.to_string()));
        assert_eq!(calls[3], DriverCall::Click("login-button".to_string()));
    }

    #[tokio::test]
    async fn test_product_count_limits_listing() {
        let mut sim = StorefrontSim::saucedemo().with_product_count(1);
        login(&mut sim, "standard_user", "secret_sauce").await;
        let items = Selector::data_test("inventory-item");
        assert_eq!(sim.count_matching(&items).await.unwrap(), 1);
        let sim = StorefrontSim::saucedemo().with_product_count(99);
        assert_eq!(sim.product_count, PRODUCTS.len());
    }

    #[tokio::test]
    async fn test_instrumented_sim_swallows_ignored_clicks() {
        let mut sim = InstrumentedSim::new(StorefrontSim::saucedemo())
            .ignoring_clicks_on("login-button");
        sim.navigate(BASE).await.unwrap();
        let button = sim
            .query_selector(&Selector::data_test("login-button"))
            .await
            .unwrap()
            .unwrap();
        sim.click(&button).await.unwrap();
        assert_eq!(sim.current_url().await.unwrap(), format!("{BASE}/"));
        assert_eq!(sim.handle_queries(), 1);
    }

    #[tokio::test]
    async fn test_closed_session_rejects_calls() {
        let mut sim = StorefrontSim::saucedemo();
        sim.close().await.unwrap();
        assert!(sim.navigate(BASE).await.is_err());
    }
}
