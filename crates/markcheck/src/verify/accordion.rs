//! Accordion stage: each section starts collapsed and opens on click.

use std::fmt;
use tracing::{debug, error};

use super::ColorConfirmed;
use crate::catalog::{AccordionSelectors, CatalogSelectors};
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::outcome::{Finding, Outcome};
use crate::wait::Timing;

const COLLAPSED_HEIGHT: &str = "0px";

/// A state the page is polled for until it holds or the budget runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expectation {
    Collapsed,
    Opened,
    AriaExpanded,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Collapsed => "expected height 0px",
            Self::Opened => "expected non-zero height",
            Self::AriaExpanded => "expected aria-expanded=\"true\"",
        };
        write!(f, "{text}")
    }
}

/// Check every configured section in order; stop at the first failure
pub async fn verify_accordions<D: PageDriver + ?Sized>(
    page: &mut D,
    selectors: &CatalogSelectors,
    timing: &Timing,
    _color: &ColorConfirmed,
) -> Outcome {
    for section in &selectors.accordions {
        if let Err(detail) = check_section(page, section, timing).await {
            let message = format!(
                "There is an issue with accordions - {}: {detail}",
                section.title
            );
            error!("{message}");
            return Outcome::fail(Finding::Accordion, message);
        }
        debug!(section = section.title.as_str(), "accordion opens");
    }
    Outcome::pass(Finding::Accordion, "Accordions expand and collapse correctly.")
}

async fn check_section<D: PageDriver + ?Sized>(
    page: &mut D,
    section: &AccordionSelectors,
    timing: &Timing,
) -> Result<(), String> {
    let expander = Locator::new(section.expander.clone());
    let summary = Locator::new(section.summary.clone());
    let header = Locator::new(section.header.clone());

    expect(page, &expander, Expectation::Collapsed, timing).await?;
    page.click(&header)
        .await
        .map_err(|e| format!("header could not be clicked: {e}"))?;
    expect(page, &summary, Expectation::AriaExpanded, timing).await?;
    expect(page, &expander, Expectation::Opened, timing).await
}

/// Poll until `expectation` holds on `locator`
async fn expect<D: PageDriver + ?Sized>(
    page: &mut D,
    locator: &Locator,
    expectation: Expectation,
    timing: &Timing,
) -> Result<(), String> {
    let mut deadline = timing.assertion_deadline();
    loop {
        let observed = match expectation {
            Expectation::Collapsed | Expectation::Opened => {
                page.computed_style(locator, "height").await
            }
            Expectation::AriaExpanded => page
                .attribute(locator, "aria-expanded")
                .await
                .map(Option::unwrap_or_default),
        };
        let last = match observed {
            Ok(value) => {
                let holds = match expectation {
                    Expectation::Collapsed => value == COLLAPSED_HEIGHT,
                    Expectation::Opened => !value.is_empty() && value != COLLAPSED_HEIGHT,
                    Expectation::AriaExpanded => value == "true",
                };
                if holds {
                    return Ok(());
                }
                format!("received {value:?}")
            }
            Err(e) => e.to_string(),
        };
        if !deadline.tick(page).await {
            return Err(format!(
                "{locator}: {expectation} within {}ms, {last}",
                timing.assertion_timeout_ms
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockPage};
    use crate::verify::color::confirmed_for_tests;

    fn collapsed_page(s: &CatalogSelectors) -> MockPage {
        let mut page = MockPage::new();
        for section in &s.accordions {
            page.add_element(&section.header, MockElement::new());
            page.add_element(&section.summary, MockElement::new().attr("aria-expanded", "false"));
            page.add_element(&section.expander, MockElement::new().style("height", "0px"));
            let summary = Locator::new(section.summary.clone());
            let expander = Locator::new(section.expander.clone());
            page.on_click(&section.header, move |dom| {
                if let Some(el) = dom.get_mut(&summary) {
                    el.attributes.insert("aria-expanded".into(), "true".into());
                }
                if let Some(el) = dom.get_mut(&expander) {
                    el.styles.insert("height".into(), "312px".into());
                }
            });
        }
        page
    }

    #[tokio::test]
    async fn test_all_sections_open() {
        let s = CatalogSelectors::default();
        let mut page = collapsed_page(&s);
        let outcome = verify_accordions(&mut page, &s, &Timing::default(), &confirmed_for_tests()).await;
        assert!(outcome.is_pass());
        assert_eq!(outcome.column(), None);
        assert_eq!(page.call_count("click:"), 3);
    }

    #[tokio::test]
    async fn test_first_failure_aborts_rest() {
        let s = CatalogSelectors::default();
        let mut page = MockPage::new();
        for section in &s.accordions {
            page.add_element(&section.header, MockElement::new());
            page.add_element(&section.summary, MockElement::new().attr("aria-expanded", "false"));
            page.add_element(&section.expander, MockElement::new().style("height", "120px"));
        }
        let outcome =
            verify_accordions(&mut page, &s, &Timing::default(), &confirmed_for_tests()).await;
        assert!(outcome.is_fail());
        assert!(outcome.message.contains("Why We Made This"));
        assert!(outcome.message.contains("expected height 0px"));
        assert!(!page.was_called("click:"));
    }

    #[tokio::test]
    async fn test_open_that_never_lands_times_out() {
        let s = CatalogSelectors::default();
        let mut page = MockPage::new();
        let section = &s.accordions[0];
        page.add_element(&section.header, MockElement::new());
        page.add_element(&section.summary, MockElement::new().attr("aria-expanded", "false"));
        page.add_element(&section.expander, MockElement::new().style("height", "0px"));
        let timing = Timing::default();
        let outcome = verify_accordions(&mut page, &s, &timing, &confirmed_for_tests()).await;
        assert!(outcome.is_fail());
        assert!(outcome.message.contains("aria-expanded"));
        assert!(outcome.message.contains("\"false\""));
        assert_eq!(page.waited().as_millis(), u128::from(timing.assertion_timeout_ms));
    }

    #[tokio::test]
    async fn test_only_configured_sections_are_checked() {
        let s = CatalogSelectors {
            accordions: vec![CatalogSelectors::default().accordions[0].clone()],
            ..CatalogSelectors::default()
        };
        let section = &s.accordions[0];
        let mut page = MockPage::new();
        page.add_element(&section.header, MockElement::new());
        page.add_element(&section.summary, MockElement::new().attr("aria-expanded", "true"));
        page.add_element(&section.expander, MockElement::new().style("height", "0px"));
        let expander = Locator::new(section.expander.clone());
        page.on_click(&section.header, move |dom| {
            if let Some(el) = dom.get_mut(&expander) {
                el.styles.insert("height".into(), "40px".into());
            }
        });
        let outcome = verify_accordions(&mut page, &s, &Timing::default(), &confirmed_for_tests()).await;
        assert!(outcome.is_pass());
    }
}
