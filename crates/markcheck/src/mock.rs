//! Scripted in-memory page for exercising the catalog checks without a browser.
//!
//! Elements are registered under the selector that finds them; clicks,
//! key presses and scrolls can run hooks that mutate the fake DOM (load more
//! tiles, expand an accordion, ...). Every driver call is recorded so tests
//! can assert on what was (or was not) touched.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::driver::{
    ElementState, FetchStatus, PageDriver, SCROLL_HEIGHT_SCRIPT, SCROLL_TO_BOTTOM_SCRIPT,
};
use crate::locator::{Locator, Selector};
use crate::result::{MarkcheckError, MarkcheckResult};

/// Hook run against the fake DOM when an interaction happens
pub type DomHook = Arc<dyn Fn(&mut MockDom) + Send + Sync>;

/// A fake element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockElement {
    /// Text content
    pub text: Option<String>,
    /// Attributes
    pub attributes: HashMap<String, String>,
    /// Computed styles
    pub styles: HashMap<String, String>,
}

impl MockElement {
    /// Create an empty element
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Element with text content
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new().text(text)
    }

    /// Set text content
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set a computed style
    #[must_use]
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(property.into(), value.into());
        self
    }
}

/// The fake document
#[derive(Debug, Default)]
pub struct MockDom {
    elements: HashMap<String, Vec<MockElement>>,
    /// Value reported for `document.body.scrollHeight`
    pub scroll_height: u64,
}

impl MockDom {
    /// Append an element matched by `selector`
    pub fn push(&mut self, selector: &Selector, element: MockElement) {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .push(element);
    }

    /// Remove every element matched by `selector`
    pub fn remove(&mut self, selector: &Selector) {
        self.elements.remove(&selector.to_string());
    }

    /// Number of elements matched by `selector`
    #[must_use]
    pub fn count(&self, selector: &Selector) -> usize {
        self.elements
            .get(&selector.to_string())
            .map_or(0, Vec::len)
    }

    /// Element targeted by `locator`
    #[must_use]
    pub fn get(&self, locator: &Locator) -> Option<&MockElement> {
        self.elements
            .get(&locator.selector().to_string())
            .and_then(|els| els.get(locator.index()))
    }

    /// Mutable element targeted by `locator`
    pub fn get_mut(&mut self, locator: &Locator) -> Option<&mut MockElement> {
        self.elements
            .get_mut(&locator.selector().to_string())
            .and_then(|els| els.get_mut(locator.index()))
    }

    fn all(&self, selector: &Selector) -> &[MockElement] {
        self.elements
            .get(&selector.to_string())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Scripted page driver
#[derive(Default)]
pub struct MockPage {
    dom: MockDom,
    current_url: String,
    click_hooks: HashMap<String, Vec<DomHook>>,
    press_hooks: HashMap<String, Vec<DomHook>>,
    scroll_hooks: Vec<DomHook>,
    fetch_statuses: HashMap<String, u16>,
    fetch_failures: HashSet<String>,
    goto_failures: HashSet<String>,
    call_history: Mutex<Vec<String>>,
    waited: Duration,
}

impl fmt::Debug for MockPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockPage")
            .field("current_url", &self.current_url)
            .field("dom", &self.dom)
            .field("waited", &self.waited)
            .finish_non_exhaustive()
    }
}

impl MockPage {
    /// Create an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reported scroll height
    #[must_use]
    pub fn with_scroll_height(mut self, height: u64) -> Self {
        self.dom.scroll_height = height;
        self
    }

    /// Register an element (builder form)
    #[must_use]
    pub fn with_element(mut self, selector: &Selector, element: MockElement) -> Self {
        self.dom.push(selector, element);
        self
    }

    /// Register an element
    pub fn add_element(&mut self, selector: &Selector, element: MockElement) {
        self.dom.push(selector, element);
    }

    /// Run `hook` whenever an element matched by `selector` is clicked
    pub fn on_click(&mut self, selector: &Selector, hook: impl Fn(&mut MockDom) + Send + Sync + 'static) {
        self.click_hooks
            .entry(selector.to_string())
            .or_default()
            .push(Arc::new(hook));
    }

    /// Run `hook` whenever a key is pressed on an element matched by `selector`
    pub fn on_press(&mut self, selector: &Selector, hook: impl Fn(&mut MockDom) + Send + Sync + 'static) {
        self.press_hooks
            .entry(selector.to_string())
            .or_default()
            .push(Arc::new(hook));
    }

    /// Run `hook` whenever the page is scrolled to the bottom
    pub fn on_scroll_to_bottom(&mut self, hook: impl Fn(&mut MockDom) + Send + Sync + 'static) {
        self.scroll_hooks.push(Arc::new(hook));
    }

    /// Answer fetches of `url` with `status` (default is 200)
    pub fn set_fetch_status(&mut self, url: impl Into<String>, status: u16) {
        self.fetch_statuses.insert(url.into(), status);
    }

    /// Make fetches of `url` fail below the HTTP layer
    pub fn fail_fetch(&mut self, url: impl Into<String>) {
        self.fetch_failures.insert(url.into());
    }

    /// Make navigation to `url` fail
    pub fn fail_goto(&mut self, url: impl Into<String>) {
        self.goto_failures.insert(url.into());
    }

    /// Set the URL reported before any navigation
    pub fn set_current_url(&mut self, url: impl Into<String>) {
        self.current_url = url.into();
    }

    /// The fake DOM
    #[must_use]
    pub const fn dom(&self) -> &MockDom {
        &self.dom
    }

    /// Recorded calls, e.g. `click:<selector>` or `fetch:<url>`
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.call_history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Check if a call starting with `prefix` was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(prefix))
    }

    /// Number of recorded calls starting with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.history().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Total time spent in fixed pauses
    #[must_use]
    pub const fn waited(&self) -> Duration {
        self.waited
    }

    fn record(&self, call: String) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(call);
        }
    }

    fn element(&self, locator: &Locator) -> MarkcheckResult<&MockElement> {
        self.dom
            .get(locator)
            .ok_or_else(|| MarkcheckError::ElementNotFound {
                selector: locator.to_string(),
            })
    }

    fn run_hooks(&mut self, hooks: Vec<DomHook>) {
        for hook in hooks {
            hook(&mut self.dom);
        }
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn goto(&mut self, url: &str) -> MarkcheckResult<()> {
        self.record(format!("goto:{url}"));
        if self.goto_failures.contains(url) {
            return Err(MarkcheckError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }
        self.current_url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> MarkcheckResult<String> {
        Ok(self.current_url.clone())
    }

    async fn count(&self, selector: &Selector) -> MarkcheckResult<usize> {
        self.record(format!("count:{selector}"));
        Ok(self.dom.count(selector))
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> MarkcheckResult<Option<String>> {
        Ok(self.element(locator)?.attributes.get(name).cloned())
    }

    async fn text_content(&self, locator: &Locator) -> MarkcheckResult<Option<String>> {
        Ok(self.element(locator)?.text.clone())
    }

    async fn all_text_contents(&self, selector: &Selector) -> MarkcheckResult<Vec<String>> {
        Ok(self
            .dom
            .all(selector)
            .iter()
            .map(|e| e.text.clone().unwrap_or_default())
            .collect())
    }

    async fn computed_style(&self, locator: &Locator, property: &str) -> MarkcheckResult<String> {
        Ok(self
            .element(locator)?
            .styles
            .get(property)
            .cloned()
            .unwrap_or_default())
    }

    async fn click(&mut self, locator: &Locator) -> MarkcheckResult<()> {
        self.element(locator)?;
        self.record(format!("click:{locator}"));
        let hooks = self
            .click_hooks
            .get(&locator.selector().to_string())
            .cloned()
            .unwrap_or_default();
        self.run_hooks(hooks);
        Ok(())
    }

    async fn fill(&mut self, locator: &Locator, text: &str) -> MarkcheckResult<()> {
        self.element(locator)?;
        self.record(format!("fill:{locator}={text}"));
        if let Some(el) = self.dom.get_mut(locator) {
            el.attributes.insert("value".to_string(), text.to_string());
        }
        Ok(())
    }

    async fn press(&mut self, locator: &Locator, key: &str) -> MarkcheckResult<()> {
        self.element(locator)?;
        self.record(format!("press:{locator}={key}"));
        let hooks = self
            .press_hooks
            .get(&locator.selector().to_string())
            .cloned()
            .unwrap_or_default();
        self.run_hooks(hooks);
        Ok(())
    }

    async fn scroll_into_view(&mut self, locator: &Locator) -> MarkcheckResult<()> {
        self.element(locator)?;
        self.record(format!("scroll_into_view:{locator}"));
        Ok(())
    }

    async fn wait_for(
        &self,
        selector: &Selector,
        state: ElementState,
        timeout: Duration,
    ) -> MarkcheckResult<()> {
        self.record(format!("wait_for:{selector}={state}"));
        let present = self.dom.count(selector) > 0;
        let reached = match state {
            ElementState::Attached | ElementState::Visible => present,
            ElementState::Hidden => !present,
        };
        if reached {
            Ok(())
        } else {
            Err(MarkcheckError::Timeout {
                ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn evaluate(&mut self, script: &str) -> MarkcheckResult<serde_json::Value> {
        self.record(format!("evaluate:{script}"));
        if script == SCROLL_HEIGHT_SCRIPT {
            return Ok(serde_json::Value::from(self.dom.scroll_height));
        }
        if script == SCROLL_TO_BOTTOM_SCRIPT {
            let hooks = self.scroll_hooks.clone();
            self.run_hooks(hooks);
        }
        Ok(serde_json::Value::Null)
    }

    async fn fetch(&self, url: &str) -> MarkcheckResult<FetchStatus> {
        self.record(format!("fetch:{url}"));
        if self.fetch_failures.contains(url) {
            return Err(MarkcheckError::Fetch {
                url: url.to_string(),
                message: "connection reset".to_string(),
            });
        }
        Ok(FetchStatus::new(
            self.fetch_statuses.get(url).copied().unwrap_or(200),
        ))
    }

    async fn wait_for_timeout(&mut self, duration: Duration) {
        self.record(format!("wait_for_timeout:{}", duration.as_millis()));
        self.waited += duration;
    }
}
