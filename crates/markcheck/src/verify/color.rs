//! Color stage: the gate every other field check depends on.

use tracing::{error, info};

use crate::catalog::CatalogSelectors;
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::outcome::{Finding, Outcome};
use crate::result::MarkcheckResult;

/// Proof that the row's color swatch was found and selected.
///
/// Only [`verify_color`] can create one, and it lives no longer than the row
/// it was minted for.
#[derive(Debug)]
pub struct ColorConfirmed {
    _private: (),
}

/// Look up the swatch for `expected`, check its name and select it
pub async fn verify_color<D: PageDriver + ?Sized>(
    page: &mut D,
    selectors: &CatalogSelectors,
    expected: &str,
    product: &str,
) -> (Outcome, Option<ColorConfirmed>) {
    let expected = expected.trim();
    match select_swatch(page, selectors, expected).await {
        Ok(Some(actual)) if actual == expected => {
            info!(color = expected, "color selected");
            (
                Outcome::pass(Finding::Color, format!("Passed: \"{expected}\" is present.")),
                Some(ColorConfirmed { _private: () }),
            )
        }
        Ok(actual) => {
            let message = format!(
                "Product validation skipped as colour not found -> Expected color \"{expected}\" for \"{product}\" was not present (found {})",
                actual.map_or_else(|| "no swatch".to_string(), |a| format!("\"{a}\""))
            );
            error!("{message}");
            (Outcome::fail(Finding::Color, message), None)
        }
        Err(e) => {
            let message = format!(
                "Product validation skipped as colour not found -> Expected color \"{expected}\" for \"{product}\" was not present ({e})"
            );
            error!("{message}");
            (Outcome::fail(Finding::Color, message), None)
        }
    }
}

/// Swatch name (`title`, else `aria-label`), clicking it only when it matches
async fn select_swatch<D: PageDriver + ?Sized>(
    page: &mut D,
    selectors: &CatalogSelectors,
    expected: &str,
) -> MarkcheckResult<Option<String>> {
    let swatch = Locator::new(selectors.color_swatch.render(expected)?);
    let name = match page.attribute(&swatch, "title").await? {
        Some(title) => Some(title),
        None => page.attribute(&swatch, "aria-label").await?,
    };
    let name = name.map(|n| n.trim().to_string());
    info!(actual = ?name, "actual color name");
    if name.as_deref() == Some(expected) {
        page.click(&swatch).await?;
    }
    Ok(name)
}

#[cfg(test)]
pub(crate) fn confirmed_for_tests() -> ColorConfirmed {
    ColorConfirmed { _private: () }
}
