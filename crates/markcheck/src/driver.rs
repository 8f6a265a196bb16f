//! PageDriver - abstract browser page the catalog checks drive.
//!
//! Every operation is a suspension point; callers run them strictly one after
//! another on a single page. Implementations:
//!
//! - `ChromiumPage` (feature `browser`) - CDP via chromiumoxide
//! - [`MockPage`](crate::mock::MockPage) - scripted in-memory page for tests

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::locator::{Locator, Selector};
use crate::result::MarkcheckResult;

/// Script returning the scrollable height of the document body
pub const SCROLL_HEIGHT_SCRIPT: &str = "document.body.scrollHeight";

/// Script scrolling the window to the bottom of the document
pub const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// Element state to wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementState {
    /// Present in the DOM
    Attached,
    /// Present and rendered with a non-empty box
    Visible,
    /// Absent or not rendered
    Hidden,
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Attached => "attached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        };
        write!(f, "{name}")
    }
}

/// HTTP status of a fetched resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchStatus {
    /// HTTP status code
    pub status: u16,
}

impl FetchStatus {
    /// Create a status
    #[must_use]
    pub const fn new(status: u16) -> Self {
        Self { status }
    }

    /// 2xx status
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Abstract page driver
///
/// Queries return `Ok(None)` / `Ok(0)` for absence where absence is a normal
/// answer; actions on a missing element fail with `ElementNotFound`.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL
    async fn goto(&mut self, url: &str) -> MarkcheckResult<()>;

    /// Current page URL
    async fn current_url(&self) -> MarkcheckResult<String>;

    /// Number of elements matching `selector`
    async fn count(&self, selector: &Selector) -> MarkcheckResult<usize>;

    /// Attribute value of the located element (`None` if the attribute is absent)
    async fn attribute(&self, locator: &Locator, name: &str) -> MarkcheckResult<Option<String>>;

    /// `textContent` of the located element
    async fn text_content(&self, locator: &Locator) -> MarkcheckResult<Option<String>>;

    /// `textContent` of every match, in document order
    async fn all_text_contents(&self, selector: &Selector) -> MarkcheckResult<Vec<String>>;

    /// Computed CSS property of the located element
    async fn computed_style(&self, locator: &Locator, property: &str) -> MarkcheckResult<String>;

    /// Click the located element
    async fn click(&mut self, locator: &Locator) -> MarkcheckResult<()>;

    /// Replace the value of an input with `text`
    async fn fill(&mut self, locator: &Locator, text: &str) -> MarkcheckResult<()>;

    /// Press a key (e.g. "Enter") while the located element has focus
    async fn press(&mut self, locator: &Locator, key: &str) -> MarkcheckResult<()>;

    /// Scroll the located element into view if needed
    async fn scroll_into_view(&mut self, locator: &Locator) -> MarkcheckResult<()>;

    /// Wait until the first match of `selector` reaches `state`
    async fn wait_for(
        &self,
        selector: &Selector,
        state: ElementState,
        timeout: Duration,
    ) -> MarkcheckResult<()>;

    /// Evaluate a script in page context
    async fn evaluate(&mut self, script: &str) -> MarkcheckResult<serde_json::Value>;

    /// Fetch a resource by absolute URL
    async fn fetch(&self, url: &str) -> MarkcheckResult<FetchStatus>;

    /// Fixed pause (settle intervals)
    async fn wait_for_timeout(&mut self, duration: Duration);

    /// Scrollable height of the page
    async fn scroll_height(&mut self) -> MarkcheckResult<u64> {
        let value = self.evaluate(SCROLL_HEIGHT_SCRIPT).await?;
        value
            .as_f64()
            .map(|h| h.max(0.0) as u64)
            .ok_or_else(|| crate::MarkcheckError::Script {
                message: format!("scroll height is not a number: {value}"),
            })
    }

    /// Scroll to the bottom of the page to trigger lazy loading
    async fn scroll_to_bottom(&mut self) -> MarkcheckResult<()> {
        self.evaluate(SCROLL_TO_BOTTOM_SCRIPT).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod fetch_status_tests {
        use super::*;

        #[test]
        fn test_success_range() {
            assert!(FetchStatus::new(200).ok());
            assert!(FetchStatus::new(204).ok());
            assert!(!FetchStatus::new(199).ok());
            assert!(!FetchStatus::new(301).ok());
            assert!(!FetchStatus::new(404).ok());
            assert!(!FetchStatus::new(500).ok());
        }
    }

    mod element_state_tests {
        use super::*;

        #[test]
        fn test_display() {
            assert_eq!(ElementState::Visible.to_string(), "visible");
            assert_eq!(ElementState::Attached.to_string(), "attached");
            assert_eq!(ElementState::Hidden.to_string(), "hidden");
        }
    }

    mod default_method_tests {
        use super::*;
        use crate::mock::MockPage;

        #[tokio::test]
        async fn test_scroll_height_reads_number() {
            let mut page = MockPage::new().with_scroll_height(4200);
            assert_eq!(page.scroll_height().await.unwrap(), 4200);
        }

        #[tokio::test]
        async fn test_scroll_to_bottom_runs_script() {
            let mut page = MockPage::new();
            page.scroll_to_bottom().await.unwrap();
            assert!(page.was_called("evaluate:window.scrollTo"));
        }
    }
}
