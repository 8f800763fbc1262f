//! Page catalogs: per-screen locator tables for the Saucedemo storefront.
//!
//! Each page is a plain struct of [`Locator`]s. The [`Catalog`] groups them
//! and is handed to the [`crate::Actor`] at construction; tasks read it from
//! there instead of reaching for globals.

use crate::locator::{Locator, Selector};

/// A page or component in the storefront UI.
pub trait PageObject {
    /// Page name for logging/listing
    fn page_name(&self) -> &str;

    /// URL fragment that identifies this page (empty for the site root)
    fn url_pattern(&self) -> &str;

    /// All locators on this page
    fn locators(&self) -> Vec<&Locator>;
}

/// Login screen
#[derive(Debug, Clone)]
pub struct LoginPage {
    /// Username input
    pub username: Locator,
    /// Password input
    pub password: Locator,
    /// Submit button
    pub login_button: Locator,
    /// Error banner (locked out, bad credentials)
    pub error_message: Locator,
}

impl Default for LoginPage {
    fn default() -> Self {
        Self {
            username: Locator::data_test("username input", "username"),
            password: Locator::data_test("password input", "password"),
            login_button: Locator::data_test("login button", "login-button"),
            error_message: Locator::data_test("login error message", "error"),
        }
    }
}

impl PageObject for LoginPage {
    fn page_name(&self) -> &str {
        "login"
    }

    fn url_pattern(&self) -> &str {
        ""
    }

    fn locators(&self) -> Vec<&Locator> {
        vec![
            &self.username,
            &self.password,
            &self.login_button,
            &self.error_message,
        ]
    }
}

/// Product listing screen
#[derive(Debug, Clone)]
pub struct InventoryPage {
    /// Product cards
    pub items: Locator,
    /// Product images
    pub item_image: Locator,
    /// Add control inside one product card
    pub item_add_button: Locator,
    /// All visible "Add to cart" buttons
    pub add_to_cart_buttons: Locator,
    /// All visible "Remove" buttons
    pub remove_buttons: Locator,
    /// Header cart link
    pub cart_link: Locator,
    /// Burger menu button
    pub open_menu: Locator,
    /// Logout entry in the side menu
    pub logout_link: Locator,
}

impl Default for InventoryPage {
    fn default() -> Self {
        Self {
            items: Locator::data_test("inventory items", "inventory-item"),
            item_image: Locator::css("item images", ".inventory_item_img"),
            item_add_button: Locator::css("item add button", "button[data-test*='add-to-cart']"),
            add_to_cart_buttons: Locator::xpath(
                "add to cart buttons",
                "//button[contains(text(), 'Add to cart')]",
            ),
            remove_buttons: Locator::xpath("remove buttons", "//button[contains(text(), 'Remove')]"),
            cart_link: Locator::data_test("shopping cart link", "shopping-cart-link"),
            open_menu: Locator::css("open menu button", "#react-burger-menu-btn"),
            logout_link: Locator::data_test("logout link", "logout-sidebar-link"),
        }
    }
}

impl PageObject for InventoryPage {
    fn page_name(&self) -> &str {
        "inventory"
    }

    fn url_pattern(&self) -> &str {
        "inventory.html"
    }

    fn locators(&self) -> Vec<&Locator> {
        vec![
            &self.items,
            &self.item_image,
            &self.item_add_button,
            &self.add_to_cart_buttons,
            &self.remove_buttons,
            &self.cart_link,
            &self.open_menu,
            &self.logout_link,
        ]
    }
}

/// Cart screen
#[derive(Debug, Clone)]
pub struct CartPage {
    /// Line items in the cart
    pub items: Locator,
    /// Checkout button
    pub checkout_button: Locator,
    /// Continue shopping button
    pub continue_shopping: Locator,
}

impl Default for CartPage {
    fn default() -> Self {
        Self {
            items: Locator::data_test("cart items", "inventory-item"),
            checkout_button: Locator::data_test("checkout button", "checkout"),
            continue_shopping: Locator::data_test("continue shopping button", "continue-shopping"),
        }
    }
}

impl PageObject for CartPage {
    fn page_name(&self) -> &str {
        "cart"
    }

    fn url_pattern(&self) -> &str {
        "cart.html"
    }

    fn locators(&self) -> Vec<&Locator> {
        vec![&self.items, &self.checkout_button, &self.continue_shopping]
    }
}

/// Checkout information form and overview
#[derive(Debug, Clone)]
pub struct CheckoutPage {
    /// First name input
    pub first_name: Locator,
    /// Last name input
    pub last_name: Locator,
    /// Postal code input
    pub postal_code: Locator,
    /// Continue button (step one)
    pub continue_button: Locator,
    /// Finish button (step two)
    pub finish_button: Locator,
    /// Form validation error
    pub error_message: Locator,
    /// URL fragment of the overview step
    pub step_two_marker: String,
}

impl Default for CheckoutPage {
    fn default() -> Self {
        Self {
            first_name: Locator::data_test("first name input", "firstName"),
            last_name: Locator::data_test("last name input", "lastName"),
            postal_code: Locator::data_test("postal code input", "postalCode"),
            continue_button: Locator::data_test("continue button", "continue"),
            finish_button: Locator::data_test("finish button", "finish"),
            error_message: Locator::data_test("checkout form error", "error"),
            step_two_marker: "checkout-step-two.html".to_string(),
        }
    }
}

impl PageObject for CheckoutPage {
    fn page_name(&self) -> &str {
        "checkout"
    }

    fn url_pattern(&self) -> &str {
        "checkout-step-one.html"
    }

    fn locators(&self) -> Vec<&Locator> {
        vec![
            &self.first_name,
            &self.last_name,
            &self.postal_code,
            &self.continue_button,
            &self.finish_button,
            &self.error_message,
        ]
    }
}

/// Order confirmation screen
#[derive(Debug, Clone)]
pub struct CompletePage {
    /// "Thank you" header
    pub thanks_message: Locator,
    /// Dispatch detail text
    pub complete_text: Locator,
    /// Back home button
    pub back_home_button: Locator,
}

impl Default for CompletePage {
    fn default() -> Self {
        Self {
            thanks_message: Locator::data_test("thank you header", "complete-header"),
            complete_text: Locator::data_test("completion detail text", "complete-text"),
            back_home_button: Locator::data_test("back home button", "back-to-products"),
        }
    }
}

impl PageObject for CompletePage {
    fn page_name(&self) -> &str {
        "complete"
    }

    fn url_pattern(&self) -> &str {
        "checkout-complete.html"
    }

    fn locators(&self) -> Vec<&Locator> {
        vec![
            &self.thanks_message,
            &self.complete_text,
            &self.back_home_button,
        ]
    }
}

/// All page catalogs, immutable once built
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Login screen
    pub login: LoginPage,
    /// Product listing
    pub inventory: InventoryPage,
    /// Cart
    pub cart: CartPage,
    /// Checkout form and overview
    pub checkout: CheckoutPage,
    /// Order confirmation
    pub complete: CompletePage,
}

impl Catalog {
    /// Catalog with the stock Saucedemo selectors
    #[must_use]
    pub fn saucedemo() -> Self {
        Self::default()
    }

    /// Pages in journey order
    #[must_use]
    pub fn pages(&self) -> Vec<&dyn PageObject> {
        vec![
            &self.login,
            &self.inventory,
            &self.cart,
            &self.checkout,
            &self.complete,
        ]
    }

    /// Find a locator by its semantic name across all pages
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Locator> {
        self.pages()
            .into_iter()
            .flat_map(|page| page.locators())
            .find(|loc| loc.name() == name)
    }
}

/// Selectors that share an expression across pages (error banner, item card)
#[must_use]
pub fn shared_selectors(catalog: &Catalog) -> Vec<&Selector> {
    let mut seen: Vec<&Selector> = Vec::new();
    let mut shared = Vec::new();
    for loc in catalog.pages().into_iter().flat_map(|p| p.locators()) {
        let sel = loc.selector();
        if seen.contains(&sel) && !shared.contains(&sel) {
            shared.push(sel);
        }
        seen.push(sel);
    }
    shared
}
