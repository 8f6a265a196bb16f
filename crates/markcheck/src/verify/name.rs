//! Product name stage.

use tracing::{error, info};

use super::ColorConfirmed;
use crate::catalog::CatalogSelectors;
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::outcome::{Finding, Outcome};

/// Drop `*` promo markers and collapse whitespace runs
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.replace('*', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compare the rendered product title with `expected`
pub async fn verify_name<D: PageDriver + ?Sized>(
    page: &mut D,
    selectors: &CatalogSelectors,
    _color: &ColorConfirmed,
    expected: &str,
) -> Outcome {
    let title = Locator::new(selectors.product_title.clone());
    let actual = match page.text_content(&title).await {
        Ok(text) => text.unwrap_or_default(),
        Err(e) => {
            let message = format!("Product name could not be read for \"{expected}\": {e}");
            error!("{message}");
            return Outcome::fail(Finding::Name, message);
        }
    };
    if let Ok(url) = page.current_url().await {
        info!(actual = actual.trim(), url = %url, "actual product name");
    }

    if normalize_name(&actual) == normalize_name(expected) {
        Outcome::pass(Finding::Name, format!("Passed: \"{expected}\" is present."))
    } else {
        let message = format!(
            "Expected product name \"{expected}\" not matched with product name on UI \"{}\".",
            actual.trim()
        );
        error!("{message}");
        Outcome::fail(Finding::Name, message)
    }
}
