//! Chromium driver over the Chrome `DevTools` Protocol.
//!
//! Compiled with the `browser` feature. Elements found by a query are kept in
//! a registry keyed by the handle id handed back to callers. The registry is
//! emptied on every navigation; wait conditions count matches in the page
//! and never add to it.

#![allow(clippy::significant_drop_tightening, clippy::missing_errors_doc)]

use crate::config::BrowserSettings;
use crate::driver::{BrowserDriver, ElementHandle};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

const JS_TAG_NAME: &str = "function() { return this.tagName.toLowerCase(); }";

const JS_CLEAR: &str = "function() { \
    const proto = this instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
    Object.getOwnPropertyDescriptor(proto, 'value').set.call(this, ''); \
    this.dispatchEvent(new Event('input', { bubbles: true })); \
}";

const JS_IS_DISPLAYED: &str = "function() { \
    const rect = this.getBoundingClientRect(); \
    const style = window.getComputedStyle(this); \
    return rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden' && style.display !== 'none'; \
}";

/// Browser session driven over CDP
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler: tokio::task::JoinHandle<()>,
    elements: Mutex<HashMap<String, Arc<Element>>>,
    next_id: AtomicU64,
}

impl ChromiumDriver {
    /// Launch Chromium and open a blank page
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::BrowserNotFound`] when no executable can be
    /// located, or a launch error if the browser fails to start
    pub async fn launch(settings: &BrowserSettings) -> ProbeResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(settings.viewport_width, settings.viewport_height);

        if !settings.headless {
            builder = builder.with_head();
        }

        if !settings.sandbox {
            builder = builder.no_sandbox();
        }

        let executable = settings
            .chromium_path
            .clone()
            .or_else(|| std::env::var_os("CHROMIUM_PATH").map(PathBuf::from));
        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(|message| {
            if message.contains("detect") {
                ProbeError::BrowserNotFound
            } else {
                ProbeError::BrowserLaunch { message }
            }
        })?;

        let (browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        // Spawn handler task
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ProbeError::Page {
                message: e.to_string(),
            })?;
        tracing::info!(headless = settings.headless, "chromium launched");

        Ok(Self {
            browser,
            page,
            handler,
            elements: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        })
    }

    async fn register(&self, elements: Vec<Element>) -> ProbeResult<Vec<ElementHandle>> {
        let mut handles = Vec::with_capacity(elements.len());
        for element in elements {
            let tag_name = element
                .call_js_fn(JS_TAG_NAME, false)
                .await
                .ok()
                .and_then(|r| r.result.value)
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string());
            let id = format!("cdp-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
            self.elements
                .lock()
                .map_err(|_| page_error("element registry poisoned"))?
                .insert(id.clone(), Arc::new(element));
            handles.push(ElementHandle::new(id, tag_name));
        }
        Ok(handles)
    }

    fn forget_elements(&self) -> ProbeResult<()> {
        let mut elements = self
            .elements
            .lock()
            .map_err(|_| page_error("element registry poisoned"))?;
        tracing::trace!(released = elements.len(), "element registry cleared");
        elements.clear();
        Ok(())
    }

    fn lookup(&self, handle: &ElementHandle) -> ProbeResult<Arc<Element>> {
        self.elements
            .lock()
            .map_err(|_| page_error("element registry poisoned"))?
            .get(&handle.id)
            .cloned()
            .ok_or_else(|| page_error(format!("unknown element {handle}")))
    }
}

/// JS expression counting matches of `selector` in the document
fn count_expression(selector: &Selector) -> ProbeResult<String> {
    let literal = serde_json::to_string(selector.expr())?;
    Ok(match selector {
        Selector::Css(_) => format!("document.querySelectorAll({literal}).length"),
        Selector::XPath(_) => format!(
            "document.evaluate({literal}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength"
        ),
    })
}

fn page_error(message: impl Into<String>) -> ProbeError {
    ProbeError::Page {
        message: message.into(),
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        self.forget_elements()?;
        self.page
            .goto(url)
            .await
            .map_err(|e| ProbeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn query_selector_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
        let found = match selector {
            Selector::Css(css) => self.page.find_elements(css.as_str()).await,
            Selector::XPath(xpath) => self.page.find_xpaths(xpath.as_str()).await,
        };
        // CDP reports "no node found" as an error; treat it as an empty match
        match found {
            Ok(elements) => self.register(elements).await,
            Err(e) => {
                tracing::trace!(%selector, error = %e, "query matched nothing");
                Ok(Vec::new())
            }
        }
    }

    async fn query_selector(&self, selector: &Selector) -> ProbeResult<Option<ElementHandle>> {
        let found = match selector {
            Selector::Css(css) => self.page.find_element(css.as_str()).await,
            Selector::XPath(xpath) => self.page.find_xpath(xpath.as_str()).await,
        };
        match found {
            Ok(element) => Ok(self.register(vec![element]).await?.into_iter().next()),
            Err(e) => {
                tracing::trace!(%selector, error = %e, "query matched nothing");
                Ok(None)
            }
        }
    }

    async fn count_matching(&self, selector: &Selector) -> ProbeResult<usize> {
        let count = self
            .page
            .evaluate(count_expression(selector)?)
            .await
            .map_err(|e| page_error(e.to_string()))?
            .into_value::<usize>()
            .map_err(|e| page_error(e.to_string()))?;
        Ok(count)
    }

    async fn query_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> ProbeResult<Option<ElementHandle>> {
        let Selector::Css(css) = selector else {
            return Err(page_error(format!("scoped queries need CSS, got {selector}")));
        };
        let parent = self.lookup(parent)?;
        match parent.find_elements(css.as_str()).await {
            Ok(elements) => Ok(self.register(elements).await?.into_iter().next()),
            Err(_) => Ok(None),
        }
    }

    async fn click(&mut self, element: &ElementHandle) -> ProbeResult<()> {
        let target = self.lookup(element)?;
        target
            .click()
            .await
            .map_err(|e| ProbeError::interaction(element.to_string(), e.to_string()))?;
        Ok(())
    }

    async fn clear(&mut self, element: &ElementHandle) -> ProbeResult<()> {
        let target = self.lookup(element)?;
        target
            .call_js_fn(JS_CLEAR, false)
            .await
            .map_err(|e| ProbeError::interaction(element.to_string(), e.to_string()))?;
        Ok(())
    }

    async fn type_text(&mut self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        let target = self.lookup(element)?;
        target
            .click()
            .await
            .map_err(|e| ProbeError::interaction(element.to_string(), e.to_string()))?;
        target
            .type_str(text)
            .await
            .map_err(|e| ProbeError::interaction(element.to_string(), e.to_string()))?;
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        let target = self.lookup(element)?;
        let text = target
            .inner_text()
            .await
            .map_err(|e| page_error(e.to_string()))?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        let target = self.lookup(element)?;
        target
            .attribute(name)
            .await
            .map_err(|e| page_error(e.to_string()))
    }

    async fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
        let target = self.lookup(element)?;
        let returned = target
            .call_js_fn(JS_IS_DISPLAYED, false)
            .await
            .map_err(|e| page_error(e.to_string()))?;
        Ok(returned
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| page_error(e.to_string()))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(|e| ProbeError::Screenshot {
                message: e.to_string(),
            })?;

        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| ProbeError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn close(&mut self) -> ProbeResult<()> {
        self.browser
            .close()
            .await
            .map_err(|e| ProbeError::BrowserLaunch {
                message: e.to_string(),
            })?;
        self.handler.abort();
        tracing::info!("chromium closed");
        Ok(())
    }
}
