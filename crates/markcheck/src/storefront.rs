//! Session set-up on the storefront: landing, popups and login.

use tracing::info;
use url::Url;

use crate::catalog::CatalogSelectors;
use crate::driver::{ElementState, PageDriver};
use crate::locator::Locator;
use crate::result::{AbsentOk, MarkcheckResult};
use crate::wait::Timing;

/// Login credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name
    pub username: String,
    /// Password
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Storefront session steps
#[derive(Debug, Clone, Copy)]
pub struct Storefront<'a> {
    selectors: &'a CatalogSelectors,
    timing: &'a Timing,
}

impl<'a> Storefront<'a> {
    /// Create a storefront session helper
    #[must_use]
    pub const fn new(selectors: &'a CatalogSelectors, timing: &'a Timing) -> Self {
        Self { selectors, timing }
    }

    /// Open the environment and dismiss the promotional popup if it shows.
    ///
    /// Returns whether a popup was dismissed.
    pub async fn open<D: PageDriver + ?Sized>(&self, page: &mut D, base: &Url) -> MarkcheckResult<bool> {
        info!(url = %base, "navigate to URL");
        page.goto(base.as_str()).await?;
        let shown = page
            .wait_for(
                &self.selectors.promo_popup,
                ElementState::Visible,
                self.timing.popup_timeout(),
            )
            .await
            .absent_ok()?
            .is_some();
        if !shown {
            info!("popup not visible, continuing");
            return Ok(false);
        }
        let dismissed = page
            .click(&Locator::new(self.selectors.popup_close.clone()))
            .await
            .absent_ok()?
            .is_some();
        if !dismissed {
            info!("popup close button missing, continuing");
        }
        Ok(dismissed)
    }

    /// Accept the cookie banner if it shows within the popup wait
    pub async fn accept_cookies<D: PageDriver + ?Sized>(&self, page: &mut D) -> MarkcheckResult<bool> {
        let shown = page
            .wait_for(
                &self.selectors.cookie_accept,
                ElementState::Visible,
                self.timing.popup_timeout(),
            )
            .await
            .absent_ok()?
            .is_some();
        if !shown {
            info!("no cookie banner");
            return Ok(false);
        }
        let accepted = page
            .click(&Locator::new(self.selectors.cookie_accept.clone()))
            .await
            .absent_ok()?
            .is_some();
        if accepted {
            info!("cookies accepted");
        }
        Ok(accepted)
    }

    /// Fill the login form and submit it
    pub async fn login<D: PageDriver + ?Sized>(
        &self,
        page: &mut D,
        credentials: &Credentials,
    ) -> MarkcheckResult<()> {
        info!(user = credentials.username.as_str(), "logging in");
        page.fill(&Locator::new(self.selectors.username.clone()), &credentials.username)
            .await?;
        page.fill(&Locator::new(self.selectors.password.clone()), &credentials.password)
            .await?;
        page.click(&Locator::new(self.selectors.login_button.clone()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockPage};

    fn base() -> Url {
        Url::parse("https://shop.example/").unwrap()
    }

    mod open_tests {
        use super::*;

        #[tokio::test]
        async fn test_popup_dismissed() {
            let s = CatalogSelectors::default();
            let t = Timing::default();
            let mut page = MockPage::new()
                .with_element(&s.promo_popup, MockElement::new())
                .with_element(&s.popup_close, MockElement::new());
            let dismissed = Storefront::new(&s, &t).open(&mut page, &base()).await.unwrap();
            assert!(dismissed);
            assert!(page.was_called("goto:https://shop.example/"));
            assert!(page.was_called(&format!("click:{}", s.popup_close)));
        }

        #[tokio::test]
        async fn test_no_popup_continues() {
            let s = CatalogSelectors::default();
            let t = Timing::default();
            let mut page = MockPage::new();
            let dismissed = Storefront::new(&s, &t).open(&mut page, &base()).await.unwrap();
            assert!(!dismissed);
            assert!(page.was_called(&format!("wait_for:{}=visible", s.promo_popup)));
            assert!(!page.was_called("click:"));
        }
    }

    mod session_tests {
        use super::*;

        #[tokio::test]
        async fn test_login_fills_and_submits() {
            let s = CatalogSelectors::default();
            let t = Timing::default();
            let mut page = MockPage::new()
                .with_element(&s.username, MockElement::new())
                .with_element(&s.password, MockElement::new())
                .with_element(&s.login_button, MockElement::new());
            let creds = Credentials {
                username: "qa@example.com".to_string(),
                password: "hunter2".to_string(),
            };
            Storefront::new(&s, &t).login(&mut page, &creds).await.unwrap();
            assert!(page.was_called(&format!("fill:{}=qa@example.com", s.username)));
            assert!(page.was_called(&format!("click:{}", s.login_button)));
        }

        #[tokio::test]
        async fn test_login_form_missing_is_an_error() {
            let s = CatalogSelectors::default();
            let t = Timing::default();
            let mut page = MockPage::new();
            let creds = Credentials {
                username: "u".to_string(),
                password: "p".to_string(),
            };
            assert!(Storefront::new(&s, &t).login(&mut page, &creds).await.is_err());
        }

        #[tokio::test]
        async fn test_cookie_banner_optional() {
            let s = CatalogSelectors::default();
            let t = Timing::default();
            let mut page = MockPage::new();
            assert!(!Storefront::new(&s, &t).accept_cookies(&mut page).await.unwrap());
            page.add_element(&s.cookie_accept, MockElement::new());
            assert!(Storefront::new(&s, &t).accept_cookies(&mut page).await.unwrap());
        }

        #[tokio::test]
        async fn test_cookie_banner_waited_for_before_click() {
            let s = CatalogSelectors::default();
            let t = Timing::default();
            let mut page = MockPage::new();
            assert!(!Storefront::new(&s, &t).accept_cookies(&mut page).await.unwrap());
            assert!(page.was_called(&format!("wait_for:{}=visible", s.cookie_accept)));
            assert!(!page.was_called("click:"));

            page.add_element(&s.cookie_accept, MockElement::new());
            assert!(Storefront::new(&s, &t).accept_cookies(&mut page).await.unwrap());
            let history = page.history();
            let waited = history.iter().rposition(|c| c.starts_with("wait_for:"));
            let clicked = history.iter().position(|c| c.starts_with("click:"));
            assert!(waited < clicked);
        }

        #[test]
        fn test_debug_hides_password() {
            let creds = Credentials {
                username: "u".to_string(),
                password: "secret".to_string(),
            };
            assert!(!format!("{creds:?}").contains("secret"));
        }
    }
}
