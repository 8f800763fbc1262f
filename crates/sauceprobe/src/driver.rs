//! BrowserDriver - Abstract Browser Automation Trait
//!
//! Every task talks to the storefront through this trait. Two
//! implementations ship with the crate:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  BrowserDriver (async trait)                                  │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌──────────────────────────┐  │
//! │  │  ChromiumDriver     │        │  StorefrontSim           │  │
//! │  │  (feature browser)  │        │  (in-process double)     │  │
//! │  │  CDP via            │        │  models pages and        │  │
//! │  │  chromiumoxide      │        │  persona quirks          │  │
//! │  └─────────────────────┘        └──────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Element handles are opaque ids minted by the driver; they are only valid
//! for the session that produced them.

use crate::locator::Selector;
use crate::result::ProbeResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element handle for DOM interactions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-scoped identifier for the element
    pub id: String,
    /// Element tag name
    pub tag_name: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
        }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}#{}>", self.tag_name, self.id)
    }
}

/// Capability set the tasks consume from a browser session.
///
/// One driver instance is one session and is owned by exactly one
/// [`crate::Actor`]; nothing here needs to be shared across scenarios.
#[async_trait]
pub trait BrowserDriver: Send + Sync + fmt::Debug {
    /// Navigate to URL
    async fn navigate(&mut self, url: &str) -> ProbeResult<()>;

    /// Query all matching elements
    async fn query_selector_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>>;

    /// Query the first matching element
    async fn query_selector(&self, selector: &Selector) -> ProbeResult<Option<ElementHandle>> {
        Ok(self.query_selector_all(selector).await?.into_iter().next())
    }

    /// Number of matching elements, without minting handles.
    ///
    /// Wait conditions poll through this; drivers that pay per handle
    /// should override it.
    async fn count_matching(&self, selector: &Selector) -> ProbeResult<usize> {
        Ok(self.query_selector_all(selector).await?.len())
    }

    /// Query the first match inside `parent`
    async fn query_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> ProbeResult<Option<ElementHandle>>;

    /// Click element
    async fn click(&mut self, element: &ElementHandle) -> ProbeResult<()>;

    /// Clear an input element
    async fn clear(&mut self, element: &ElementHandle) -> ProbeResult<()>;

    /// Type text into element
    async fn type_text(&mut self, element: &ElementHandle, text: &str) -> ProbeResult<()>;

    /// Rendered text of element
    async fn text(&self, element: &ElementHandle) -> ProbeResult<String>;

    /// Attribute value, `None` when absent
    async fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>>;

    /// Whether the element is rendered and visible
    async fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// PNG screenshot of the viewport (may be empty for headless doubles)
    async fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Close the session
    async fn close(&mut self) -> ProbeResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_handle_creation() {
        let elem = ElementHandle::new("btn-1", "button");
        assert_eq!(elem.id, "btn-1");
        assert_eq!(elem.tag_name, "button");
    }

    #[test]
    fn test_element_handle_display() {
        let elem = ElementHandle::new("add:3", "button");
        assert_eq!(elem.to_string(), "<button#add:3>");
    }
}
