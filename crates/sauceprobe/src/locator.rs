//! Locator abstraction for naming storefront elements.
//!
//! A [`Locator`] pairs a semantic name ("login button") with the selector
//! expression the driver resolves. Locators are plain immutable data; the
//! page catalogs in [`crate::catalog`] group them per screen.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "expr", rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., `[data-test="login-button"]`)
    Css(String),
    /// XPath selector
    XPath(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create a CSS selector for a `data-test` attribute
    #[must_use]
    pub fn data_test(value: &str) -> Self {
        Self::Css(format!("[data-test=\"{value}\"]"))
    }

    /// Raw selector expression
    #[must_use]
    pub fn expr(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) => s,
        }
    }

    /// Selector kind label
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind(), self.expr())
    }
}

/// A named selector for one element (or element family) on a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    name: String,
    selector: Selector,
}

impl Locator {
    /// Create a locator from a name and selector
    #[must_use]
    pub fn new(name: impl Into<String>, selector: Selector) -> Self {
        Self {
            name: name.into(),
            selector,
        }
    }

    /// Shorthand for a CSS locator
    #[must_use]
    pub fn css(name: impl Into<String>, css: impl Into<String>) -> Self {
        Self::new(name, Selector::css(css))
    }

    /// Shorthand for a `data-test` attribute locator
    #[must_use]
    pub fn data_test(name: impl Into<String>, value: &str) -> Self {
        Self::new(name, Selector::data_test(value))
    }

    /// Shorthand for an XPath locator
    #[must_use]
    pub fn xpath(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self::new(name, Selector::xpath(expr))
    }

    /// Semantic name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.selector)
    }
}
