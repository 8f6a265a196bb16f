//! Selector and locator model for the catalog pages.
//!
//! Selectors are written as Playwright-style strings so they can live in the
//! YAML configuration:
//!
//! - `//div[@id='x']` or `xpath=//div` - XPath
//! - `role=link[name="View More Products"]` - ARIA role with accessible name
//! - `testid=product-title` - `data-testid` attribute
//! - anything else - CSS
//!
//! A [`Locator`] pins a selector to one match (the first by default), the
//! same way `locator.first()` / `locator.nth(i)` do.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::result::{MarkcheckError, MarkcheckResult};

/// Placeholder replaced by [`SelectorTemplate::render`]
pub const TEMPLATE_PLACEHOLDER: &str = "{value}";

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath selector
    XPath(String),
    /// ARIA role, optionally filtered by accessible name (substring, case-insensitive)
    Role {
        /// Role name (link, img, button, checkbox, ...)
        role: String,
        /// Accessible name filter
        name: Option<String>,
    },
    /// Test ID selector (data-testid attribute)
    TestId(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::XPath(selector.into())
    }

    /// Create a role selector with an accessible-name filter
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: Some(name.into()),
        }
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// JavaScript expression evaluating to an `Array` of every matching element
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({}))", js_string(s)),
            Self::XPath(s) => format!(
                "(() => {{ const r = document.evaluate({}, document, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
                 for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); \
                 return out; }})()",
                js_string(s)
            ),
            Self::TestId(id) => format!(
                "Array.from(document.querySelectorAll('[data-testid=' + JSON.stringify({}) + ']'))",
                js_string(id)
            ),
            Self::Role { role, name } => {
                let name = name.as_deref().map_or_else(|| "null".to_string(), js_string);
                format!(
                    "(() => {{ const implicit = {{ \
                     link: 'a[href],[role=link]', \
                     button: 'button,[role=button],input[type=button],input[type=submit]', \
                     img: 'img,[role=img]', \
                     checkbox: 'input[type=checkbox],[role=checkbox]', \
                     textbox: 'input:not([type]),input[type=text],input[type=email],input[type=password],textarea,[role=textbox]', \
                     searchbox: 'input[type=search],[role=searchbox]' }}; \
                     const role = {role}; const name = {name}; \
                     const css = implicit[role] || '[role=' + role + ']'; \
                     const label = el => (el.getAttribute('aria-label') || el.getAttribute('alt') \
                     || el.getAttribute('title') || el.textContent || '').trim().toLowerCase(); \
                     return Array.from(document.querySelectorAll(css)).filter(el => \
                     name === null || label(el).includes(name.toLowerCase())); }})()",
                    role = js_string(role),
                )
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "{s}"),
            Self::XPath(s) => write!(f, "{s}"),
            Self::TestId(id) => write!(f, "testid={id}"),
            Self::Role { role, name: None } => write!(f, "role={role}"),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "role={role}[name={}]", js_string(name)),
        }
    }
}

impl FromStr for Selector {
    type Err = MarkcheckError;

    fn from_str(raw: &str) -> MarkcheckResult<Self> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(MarkcheckError::config("empty selector"));
        }
        if let Some(xpath) = s.strip_prefix("xpath=") {
            return Ok(Self::XPath(xpath.to_string()));
        }
        if s.starts_with('/') || s.starts_with("(/") {
            return Ok(Self::XPath(s.to_string()));
        }
        if let Some(id) = s.strip_prefix("testid=") {
            return Ok(Self::TestId(id.to_string()));
        }
        if let Some(rest) = s.strip_prefix("role=") {
            return parse_role(rest);
        }
        Ok(Self::Css(s.strip_prefix("css=").unwrap_or(s).to_string()))
    }
}

impl TryFrom<String> for Selector {
    type Error = MarkcheckError;

    fn try_from(value: String) -> MarkcheckResult<Self> {
        value.parse()
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

fn parse_role(rest: &str) -> MarkcheckResult<Selector> {
    let Some(open) = rest.find('[') else {
        return Ok(Selector::Role {
            role: rest.to_string(),
            name: None,
        });
    };
    let role = rest[..open].to_string();
    let filter = rest[open + 1..]
        .strip_suffix(']')
        .and_then(|f| f.strip_prefix("name="))
        .ok_or_else(|| MarkcheckError::config(format!("malformed role selector: role={rest}")))?;
    let name = filter.trim_matches(|c| c == '"' || c == '\'');
    Ok(Selector::Role {
        role,
        name: Some(name.to_string()),
    })
}

/// A selector pinned to one of its matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    index: usize,
}

impl Locator {
    /// Locate the first match of `selector`
    #[must_use]
    pub const fn new(selector: Selector) -> Self {
        Self { selector, index: 0 }
    }

    /// Locate the `index`-th match (zero-based)
    #[must_use]
    pub const fn nth(selector: Selector, index: usize) -> Self {
        Self { selector, index }
    }

    /// The underlying selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Which match this locator targets
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::new(selector)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index == 0 {
            write!(f, "{}", self.selector)
        } else {
            write!(f, "{} >> nth={}", self.selector, self.index)
        }
    }
}

/// A selector with a `{value}` hole, filled with a correctly quoted literal.
///
/// XPath templates receive an XPath string literal, CSS templates a quoted
/// CSS string, role and test-id templates the raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectorTemplate(String);

impl SelectorTemplate {
    /// Create a template
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Fill the placeholder with `value`
    pub fn render(&self, value: &str) -> MarkcheckResult<Selector> {
        if !self.0.contains(TEMPLATE_PLACEHOLDER) {
            return Err(MarkcheckError::config(format!(
                "selector template has no {TEMPLATE_PLACEHOLDER} placeholder: {}",
                self.0
            )));
        }
        let shape: Selector = self.0.replace(TEMPLATE_PLACEHOLDER, "x").parse()?;
        let literal = match shape {
            Selector::XPath(_) => xpath_literal(value),
            Selector::Css(_) => css_string(value),
            Selector::Role { .. } | Selector::TestId(_) => value.to_string(),
        };
        self.0.replace(TEMPLATE_PLACEHOLDER, &literal).parse()
    }
}

/// Quote `value` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so a value holding both quote kinds is
/// split and glued back with `concat()`.
#[must_use]
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value.split('\'').map(|p| format!("'{p}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// Quote `value` as a double-quoted CSS string
#[must_use]
pub fn css_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Quote `value` as a JavaScript string literal
#[must_use]
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
