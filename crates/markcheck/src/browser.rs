//! Real browser page over the Chrome `DevTools` Protocol.
//!
//! With the `browser` feature, [`Browser`] launches Chromium through
//! chromiumoxide and hands out [`ChromiumPage`]s implementing
//! [`PageDriver`](crate::driver::PageDriver). Element work runs as small page
//! scripts built from [`Selector::to_query_all`](crate::locator::Selector::to_query_all),
//! so CSS, XPath, role and test-id selectors behave the same way.

use url::Url;

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run without a visible window
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1440,
            viewport_height: 900,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// A browser session cookie, as needed to replay it on a plain HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain, with or without the leading dot
    pub domain: String,
    /// Path prefix
    pub path: String,
    /// Sent over HTTPS only
    pub secure: bool,
}

impl SessionCookie {
    /// Whether the browser would send this cookie with a request to `url`
    #[must_use]
    pub fn applies_to(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let domain = self.domain.trim_start_matches('.');
        let domain_ok = host.eq_ignore_ascii_case(domain)
            || host
                .to_ascii_lowercase()
                .ends_with(&format!(".{}", domain.to_ascii_lowercase()));
        let path = url.path();
        let path_ok = self.path.is_empty()
            || path == self.path
            || (path.starts_with(&self.path)
                && (self.path.ends_with('/') || path[self.path.len()..].starts_with('/')));
        domain_ok && path_ok && (!self.secure || url.scheme() == "https")
    }
}

/// `Cookie` header value for a request to `url`, if any cookie applies
#[must_use]
pub fn cookie_header(cookies: &[SessionCookie], url: &Url) -> Option<String> {
    let pairs: Vec<String> = cookies
        .iter()
        .filter(|c| c.applies_to(url))
        .map(|c| format!("{}={}", c.name, c.value))
        .collect();
    (!pairs.is_empty()).then(|| pairs.join("; "))
}

// ============================================================================
// CDP implementation (`browser` feature)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::{cookie_header, BrowserConfig, SessionCookie};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::handler::viewport::Viewport;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use serde::Deserialize;
    use std::time::Duration;
    use tracing::debug;

    use crate::driver::{ElementState, FetchStatus, PageDriver};
    use crate::locator::{js_string, Locator, Selector};
    use crate::result::{MarkcheckError, MarkcheckResult};
    use crate::wait::DEFAULT_POLL_INTERVAL_MS;

    /// Browser instance with a live CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: CdpBrowser,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch Chromium
        pub async fn launch(config: BrowserConfig) -> MarkcheckResult<Self> {
            let mut builder = CdpConfig::builder().viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Viewport::default()
            });
            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }
            let cdp_config = builder
                .build()
                .map_err(|message| MarkcheckError::BrowserLaunch { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                MarkcheckError::BrowserLaunch {
                    message: e.to_string(),
                }
            })?;
            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });
            debug!(headless = config.headless, "browser launched");

            Ok(Self {
                config,
                inner: browser,
                handle,
            })
        }

        /// Open a blank page
        pub async fn new_page(&self) -> MarkcheckResult<ChromiumPage> {
            let page = self
                .inner
                .new_page("about:blank")
                .await
                .map_err(|e| MarkcheckError::page(e.to_string()))?;
            let http = reqwest::Client::builder()
                .build()
                .map_err(|e| MarkcheckError::page(format!("HTTP client: {e}")))?;
            Ok(ChromiumPage { inner: page, http })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(mut self) -> MarkcheckResult<()> {
            self.inner
                .close()
                .await
                .map_err(|e| MarkcheckError::BrowserLaunch {
                    message: e.to_string(),
                })?;
            self.handle.abort();
            Ok(())
        }
    }

    /// Reply of an element script: `found` is false when the locator matched nothing
    #[derive(Debug, Deserialize)]
    struct ElementReply<T> {
        found: bool,
        value: Option<T>,
    }

    /// A Chromium tab driven through CDP
    #[derive(Debug)]
    pub struct ChromiumPage {
        inner: CdpPage,
        http: reqwest::Client,
    }

    impl ChromiumPage {
        /// Session cookies of the page that apply to `url`
        async fn cookie_header_for(&self, url: &str) -> Option<String> {
            let target = url::Url::parse(url).ok()?;
            let cookies: Vec<SessionCookie> = match self.inner.get_cookies().await {
                Ok(cookies) => cookies
                    .into_iter()
                    .map(|c| SessionCookie {
                        name: c.name,
                        value: c.value,
                        domain: c.domain,
                        path: c.path,
                        secure: c.secure,
                    })
                    .collect(),
                Err(e) => {
                    debug!(error = %e, "page cookies unavailable, fetching without them");
                    return None;
                }
            };
            cookie_header(&cookies, &target)
        }

        async fn eval<T: DeserializeOwned>(&self, script: &str) -> MarkcheckResult<T> {
            self.inner
                .evaluate(script)
                .await
                .map_err(|e| MarkcheckError::Script {
                    message: e.to_string(),
                })?
                .into_value()
                .map_err(|e| MarkcheckError::Script {
                    message: e.to_string(),
                })
        }

        /// Run `body` with `el` bound to the located element
        async fn on_element<T: DeserializeOwned>(
            &self,
            locator: &Locator,
            body: &str,
        ) -> MarkcheckResult<Option<T>> {
            let script = format!(
                "(() => {{ const el = ({query})[{index}]; \
                 if (!el) return {{ found: false, value: null }}; \
                 return {{ found: true, value: (() => {{ {body} }})() ?? null }}; }})()",
                query = locator.selector().to_query_all(),
                index = locator.index(),
            );
            let reply: ElementReply<T> = self.eval(&script).await?;
            if reply.found {
                Ok(reply.value)
            } else {
                Err(MarkcheckError::ElementNotFound {
                    selector: locator.to_string(),
                })
            }
        }

        async fn state(&self, selector: &Selector) -> MarkcheckResult<String> {
            let script = format!(
                "(() => {{ const el = ({})[0]; if (!el) return 'absent'; \
                 const r = el.getBoundingClientRect(); const s = getComputedStyle(el); \
                 return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' \
                 && s.display !== 'none' ? 'visible' : 'hidden'; }})()",
                selector.to_query_all()
            );
            self.eval(&script).await
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumPage {
        async fn goto(&mut self, url: &str) -> MarkcheckResult<()> {
            self.inner
                .goto(url)
                .await
                .map_err(|e| MarkcheckError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn current_url(&self) -> MarkcheckResult<String> {
            self.inner
                .url()
                .await
                .map(Option::unwrap_or_default)
                .map_err(|e| MarkcheckError::page(e.to_string()))
        }

        async fn count(&self, selector: &Selector) -> MarkcheckResult<usize> {
            self.eval(&format!("({}).length", selector.to_query_all()))
                .await
        }

        async fn attribute(&self, locator: &Locator, name: &str) -> MarkcheckResult<Option<String>> {
            self.on_element(locator, &format!("return el.getAttribute({});", js_string(name)))
                .await
        }

        async fn text_content(&self, locator: &Locator) -> MarkcheckResult<Option<String>> {
            self.on_element(locator, "return el.textContent;").await
        }

        async fn all_text_contents(&self, selector: &Selector) -> MarkcheckResult<Vec<String>> {
            self.eval(&format!(
                "({}).map(el => el.textContent || '')",
                selector.to_query_all()
            ))
            .await
        }

        async fn computed_style(&self, locator: &Locator, property: &str) -> MarkcheckResult<String> {
            let value: Option<String> = self
                .on_element(
                    locator,
                    &format!(
                        "return getComputedStyle(el).getPropertyValue({});",
                        js_string(property)
                    ),
                )
                .await?;
            Ok(value.unwrap_or_default())
        }

        async fn click(&mut self, locator: &Locator) -> MarkcheckResult<()> {
            self.on_element::<bool>(
                locator,
                "el.scrollIntoView({ block: 'center' }); el.click(); return true;",
            )
            .await
            .map(|_| ())
        }

        async fn fill(&mut self, locator: &Locator, text: &str) -> MarkcheckResult<()> {
            let body = format!(
                "el.focus(); \
                 const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype \
                 : HTMLInputElement.prototype; \
                 Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, {text}); \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                 return true;",
                text = js_string(text)
            );
            self.on_element::<bool>(locator, &body).await.map(|_| ())
        }

        async fn press(&mut self, locator: &Locator, key: &str) -> MarkcheckResult<()> {
            let body = format!(
                "const key = {key}; el.focus(); \
                 for (const type of ['keydown', 'keypress', 'keyup']) {{ \
                   el.dispatchEvent(new KeyboardEvent(type, {{ key, code: key, bubbles: true, cancelable: true }})); }} \
                 if (key === 'Enter' && el.form) {{ \
                   el.form.requestSubmit ? el.form.requestSubmit() : el.form.submit(); }} \
                 return true;",
                key = js_string(key)
            );
            self.on_element::<bool>(locator, &body).await.map(|_| ())
        }

        async fn scroll_into_view(&mut self, locator: &Locator) -> MarkcheckResult<()> {
            self.on_element::<bool>(
                locator,
                "el.scrollIntoView({ block: 'center', inline: 'nearest' }); return true;",
            )
            .await
            .map(|_| ())
        }

        async fn wait_for(
            &self,
            selector: &Selector,
            state: ElementState,
            timeout: Duration,
        ) -> MarkcheckResult<()> {
            let deadline = tokio::time::Instant::now() + timeout;
            loop {
                let current = self.state(selector).await?;
                let reached = match state {
                    ElementState::Attached => current != "absent",
                    ElementState::Visible => current == "visible",
                    ElementState::Hidden => current != "visible",
                };
                if reached {
                    return Ok(());
                }
                if tokio::time::Instant::now() >= deadline {
                    return Err(MarkcheckError::Timeout {
                        ms: timeout.as_millis() as u64,
                    });
                }
                tokio::time::sleep(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)).await;
            }
        }

        async fn evaluate(&mut self, script: &str) -> MarkcheckResult<serde_json::Value> {
            let result = self
                .inner
                .evaluate(script)
                .await
                .map_err(|e| MarkcheckError::Script {
                    message: e.to_string(),
                })?;
            Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
        }

        async fn fetch(&self, url: &str) -> MarkcheckResult<FetchStatus> {
            let mut request = self.http.get(url);
            if let Some(header) = self.cookie_header_for(url).await {
                request = request.header(reqwest::header::COOKIE, header);
            }
            let response = request
                .send()
                .await
                .map_err(|e| MarkcheckError::Fetch {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(FetchStatus::new(response.status().as_u16()))
        }

        async fn wait_for_timeout(&mut self, duration: Duration) {
            tokio::time::sleep(duration).await;
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{Browser, ChromiumPage};
