//! Price stage: markdown and regular price of the default size.

use tracing::{info, warn};

use super::ColorConfirmed;
use crate::catalog::CatalogSelectors;
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::outcome::{Finding, Highlight, Outcome};
use crate::result::AbsentOk;

const PRICE_RANGE_PATTERN: &str = r"(\$\s*[\d.,]+)\s*[-\u{2013}]\s*(\$\s*[\d.,]+)";

/// First whitespace-separated token of a rendered price ("$49 USD" -> "$49")
#[must_use]
pub fn extract_price_token(raw: &str) -> Option<String> {
    raw.replace('\u{a0}', " ")
        .split_whitespace()
        .next()
        .map(str::to_string)
}

/// "$X - $Y" when the rendered price is a range
#[must_use]
pub fn price_range(raw: &str) -> Option<String> {
    let re = regex::Regex::new(PRICE_RANGE_PATTERN).ok()?;
    let text = raw.replace('\u{a0}', " ");
    let caps = re.captures(&text)?;
    let low = caps.get(1)?.as_str().replace(' ', "");
    let high = caps.get(2)?.as_str().replace(' ', "");
    Some(format!("{low} - {high}"))
}

/// Compare rendered prices with the expected markdown and regular price
pub async fn verify_price<D: PageDriver + ?Sized>(
    page: &mut D,
    selectors: &CatalogSelectors,
    _color: &ColorConfirmed,
    expected_regular: &str,
    expected_markdown: &str,
) -> Vec<Outcome> {
    let mut outcomes = Vec::new();
    let regular_locator = Locator::new(selectors.regular_price.clone());
    let markdown_locator = Locator::new(selectors.markdown_price.clone());

    let initial = read_text(page, &regular_locator).await;
    if let Some(range) = initial.as_deref().and_then(price_range) {
        info!(range = range.as_str(), "regular price is a range");
        outcomes.push(Outcome::info(
            Finding::Price,
            format!("Regular price renders as a range: {range}"),
        ));
    }

    select_active_size(page, selectors).await;

    let markdown = read_text(page, &markdown_locator)
        .await
        .as_deref()
        .and_then(extract_price_token);
    let regular_text = read_text(page, &regular_locator).await;
    // a range that survives size selection has no single price to compare
    let range = regular_text.as_deref().and_then(price_range);
    let regular = regular_text.as_deref().and_then(extract_price_token);
    info!(
        markdown = markdown.as_deref().unwrap_or("-"),
        regular = range.as_deref().or(regular.as_deref()).unwrap_or("-"),
        "prices on page"
    );

    let expected_markdown = expected_markdown.trim();
    let expected_regular = expected_regular.trim();
    let markdown_ok = markdown.as_deref() == Some(expected_markdown);
    let regular_ok = range.is_some() || regular.as_deref() == Some(expected_regular);

    let shown = |v: &Option<String>| v.clone().unwrap_or_else(|| "(missing)".to_string());
    if markdown_ok && regular_ok {
        outcomes.push(
            Outcome::pass(
                Finding::Price,
                format!(
                    "Passed: \"MarkedDownPrice-{} & RegularPrice-{}\" are present.",
                    shown(&markdown),
                    range.clone().unwrap_or_else(|| shown(&regular))
                ),
            )
            .with_highlight(Highlight::Good),
        );
        return outcomes;
    }

    let mut mismatches = Vec::new();
    if !markdown_ok {
        mismatches.push(format!(
            "Markdown price {} on UI does not match expected {expected_markdown}",
            shown(&markdown)
        ));
    }
    if !regular_ok {
        mismatches.push(format!(
            "Regular price {} on UI does not match expected {expected_regular}",
            shown(&regular)
        ));
    }
    let message = format!("{}.", mismatches.join("; "));
    warn!("{message}");
    outcomes.push(Outcome::fail(Finding::Price, message).with_highlight(Highlight::Cleared));
    outcomes
}

/// Per-size prices only render once the default size is selected
async fn select_active_size<D: PageDriver + ?Sized>(page: &mut D, selectors: &CatalogSelectors) {
    let size = Locator::new(selectors.active_size.clone());
    let selected = match page.scroll_into_view(&size).await {
        Ok(()) => page.click(&size).await,
        Err(e) => Err(e),
    };
    if let Err(e) = selected {
        warn!(error = %e, "active size not selected, reading prices as rendered");
    }
}

async fn read_text<D: PageDriver + ?Sized>(page: &mut D, locator: &Locator) -> Option<String> {
    match page.text_content(locator).await.absent_ok() {
        Ok(text) => text.flatten(),
        Err(e) => {
            warn!(locator = %locator, error = %e, "price unreadable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockPage};
    use crate::outcome::Verdict;
    use crate::verify::color::confirmed_for_tests;
    use proptest::prelude::*;

    mod token_tests {
        use super::*;

        #[test]
        fn test_currency_code_dropped() {
            assert_eq!(extract_price_token("$49 USD").as_deref(), Some("$49"));
            assert_eq!(extract_price_token("  $49\u{a0}USD ").as_deref(), Some("$49"));
            assert_eq!(extract_price_token("$98").as_deref(), Some("$98"));
            assert_eq!(extract_price_token("   "), None);
        }

        #[test]
        fn test_range_detection() {
            assert_eq!(price_range("$39 - $59 USD").as_deref(), Some("$39 - $59"));
            assert_eq!(price_range("$39\u{a0}\u{2013}\u{a0}$59").as_deref(), Some("$39 - $59"));
            assert_eq!(price_range("$49 USD"), None);
        }

        proptest! {
            #[test]
            fn prop_token_has_no_whitespace(s in "\\PC{0,30}") {
                if let Some(token) = extract_price_token(&s) {
                    prop_assert!(!token.is_empty());
                    prop_assert!(!token.chars().any(char::is_whitespace));
                }
            }

            #[test]
            fn prop_price_with_code(amount in 1u32..10_000, code in "[A-Z]{3}") {
                let rendered = format!("${amount}\u{a0}{code}");
                let expected = format!("${amount}");
                prop_assert_eq!(extract_price_token(&rendered), Some(expected));
            }
        }
    }

    mod verify_tests {
        use super::*;

        fn page_with(s: &CatalogSelectors, markdown: &str, regular: &str) -> MockPage {
            MockPage::new()
                .with_element(&s.active_size, MockElement::with_text("M"))
                .with_element(&s.markdown_price, MockElement::with_text(markdown))
                .with_element(&s.regular_price, MockElement::with_text(regular))
        }

        #[tokio::test]
        async fn test_match_highlights_good() {
            let s = CatalogSelectors::default();
            let mut page = page_with(&s, "$49 USD", "$98 USD");
            let outcomes = verify_price(&mut page, &s, &confirmed_for_tests(), "$98", "$49").await;
            assert_eq!(outcomes.len(), 1);
            assert!(outcomes[0].is_pass());
            assert_eq!(outcomes[0].highlight, Some(Highlight::Good));
            assert!(page.was_called(&format!("scroll_into_view:{}", s.active_size)));
            assert!(page.was_called(&format!("click:{}", s.active_size)));
        }

        #[tokio::test]
        async fn test_markdown_mismatch_names_markdown_only() {
            let s = CatalogSelectors::default();
            let mut page = page_with(&s, "$45 USD", "$98 USD");
            let outcomes = verify_price(&mut page, &s, &confirmed_for_tests(), "$98", "$49").await;
            let fail = &outcomes[0];
            assert_eq!(fail.verdict, Verdict::Fail);
            assert_eq!(fail.highlight, Some(Highlight::Cleared));
            assert!(fail.message.contains("Markdown price $45"));
            assert!(!fail.message.contains("Regular price"));
        }

        #[tokio::test]
        async fn test_both_mismatch() {
            let s = CatalogSelectors::default();
            let mut page = page_with(&s, "$45", "$90");
            let outcomes = verify_price(&mut page, &s, &confirmed_for_tests(), "$98", "$49").await;
            assert!(outcomes[0].message.contains("Markdown price"));
            assert!(outcomes[0].message.contains("Regular price"));
        }

        #[tokio::test]
        async fn test_symbol_sensitive() {
            let s = CatalogSelectors::default();
            let mut page = page_with(&s, "49 USD", "$98");
            let outcomes = verify_price(&mut page, &s, &confirmed_for_tests(), "$98", "$49").await;
            assert!(outcomes[0].is_fail());
        }

        #[tokio::test]
        async fn test_range_is_noted_not_compared() {
            let s = CatalogSelectors::default();
            let mut page = page_with(&s, "$49 USD", "$88 - $98 USD");
            let outcomes = verify_price(&mut page, &s, &confirmed_for_tests(), "$98", "$49").await;
            assert_eq!(outcomes.len(), 2);
            assert_eq!(outcomes[0].verdict, Verdict::Info);
            assert!(outcomes[0].message.contains("$88 - $98"));
            assert!(outcomes[1].is_pass());
        }

        #[tokio::test]
        async fn test_range_collapsing_to_wrong_price_fails() {
            let s = CatalogSelectors::default();
            let mut page = page_with(&s, "$49 USD", "$88 - $98 USD");
            let regular = Locator::new(s.regular_price.clone());
            page.on_click(&s.active_size, move |dom| {
                if let Some(el) = dom.get_mut(&regular) {
                    el.text = Some("$90 USD".to_string());
                }
            });
            let outcomes = verify_price(&mut page, &s, &confirmed_for_tests(), "$98", "$49").await;
            assert_eq!(outcomes.len(), 2);
            assert_eq!(outcomes[0].verdict, Verdict::Info);
            assert_eq!(outcomes[1].verdict, Verdict::Fail);
            assert_eq!(outcomes[1].highlight, Some(Highlight::Cleared));
            assert!(outcomes[1].message.contains("Regular price $90"));
            assert!(!outcomes[1].message.contains("Markdown price"));
        }

        #[tokio::test]
        async fn test_range_collapsing_to_expected_price_passes() {
            let s = CatalogSelectors::default();
            let mut page = page_with(&s, "$49 USD", "$88 - $98 USD");
            let regular = Locator::new(s.regular_price.clone());
            page.on_click(&s.active_size, move |dom| {
                if let Some(el) = dom.get_mut(&regular) {
                    el.text = Some("$98 USD".to_string());
                }
            });
            let outcomes = verify_price(&mut page, &s, &confirmed_for_tests(), "$98", "$49").await;
            assert_eq!(outcomes.len(), 2);
            assert!(outcomes[1].is_pass());
            assert!(outcomes[1].message.contains("RegularPrice-$98\""));
        }

        #[tokio::test]
        async fn test_missing_prices_fail() {
            let s = CatalogSelectors::default();
            let mut page = MockPage::new();
            let outcomes = verify_price(&mut page, &s, &confirmed_for_tests(), "$98", "$49").await;
            assert_eq!(outcomes.len(), 1);
            assert!(outcomes[0].message.contains("(missing)"));
        }
    }
}
