//! Size stage: expected size set against the rendered options, plus stock.

use tracing::{info, warn};

use super::ColorConfirmed;
use crate::catalog::CatalogSelectors;
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::outcome::{Finding, Outcome};

/// Summary written when no rendered size can be bought
pub const ALL_SIZES_OUT_OF_STOCK: &str = "All Sizes Out Of Stock";

/// Whether a size option's accessible label marks it out of stock
#[must_use]
pub fn is_unavailable_label(label: &str) -> bool {
    let label = label.to_lowercase();
    label.contains("unavailable") || label.contains("not available")
}

/// One rendered size option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeOption {
    /// Visible label
    pub label: String,
    /// Whether it can be selected
    pub in_stock: bool,
}

/// Expected sizes against rendered options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeInventory {
    expected: Vec<String>,
    actual: Vec<SizeOption>,
}

impl SizeInventory {
    /// Build from the expected CSV and the rendered options
    #[must_use]
    pub fn new(expected_csv: &str, actual: Vec<SizeOption>) -> Self {
        Self {
            expected: expected_csv
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            actual,
        }
    }

    /// Expected sizes, trimmed
    #[must_use]
    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// Expected but not rendered
    #[must_use]
    pub fn missing(&self) -> Vec<&str> {
        self.expected
            .iter()
            .filter(|e| !self.actual.iter().any(|a| &a.label == *e))
            .map(String::as_str)
            .collect()
    }

    /// Rendered but not expected
    #[must_use]
    pub fn extra(&self) -> Vec<&str> {
        self.actual
            .iter()
            .map(|a| a.label.as_str())
            .filter(|a| !self.expected.iter().any(|e| e.as_str() == *a))
            .collect()
    }

    /// Every rendered option is out of stock (false when nothing rendered)
    #[must_use]
    pub fn all_out_of_stock(&self) -> bool {
        !self.actual.is_empty() && self.actual.iter().all(|a| !a.in_stock)
    }

    /// Notes for this inventory.
    ///
    /// Missing sizes fail, extra sizes are informational; both are reported
    /// together. The out-of-stock summary is added on top.
    #[must_use]
    pub fn outcomes(&self) -> Vec<Outcome> {
        let missing = self.missing();
        let extra = self.extra();
        let mut outcomes = Vec::new();
        if !missing.is_empty() {
            outcomes.push(Outcome::fail(
                Finding::Size,
                format!(
                    "Failed: The following expected sizes are MISSING from the UI: [{}].",
                    missing.join(", ")
                ),
            ));
        }
        if !extra.is_empty() {
            outcomes.push(Outcome::info(
                Finding::Size,
                format!("The UI contains UNEXPECTED (extra) sizes: [{}].", extra.join(", ")),
            ));
        }
        if missing.is_empty() && extra.is_empty() {
            outcomes.push(Outcome::pass(
                Finding::Size,
                format!("Passed: \"{}\" are present.", self.expected.join(",")),
            ));
        }
        if self.all_out_of_stock() {
            outcomes.push(Outcome::info(Finding::Size, ALL_SIZES_OUT_OF_STOCK));
        }
        outcomes
    }
}

/// Read the rendered size options and compare them with `expected_csv`
pub async fn verify_sizes<D: PageDriver + ?Sized>(
    page: &mut D,
    selectors: &CatalogSelectors,
    _color: &ColorConfirmed,
    expected_csv: &str,
) -> Vec<Outcome> {
    let labels = match page.all_text_contents(&selectors.sizes).await {
        Ok(labels) => labels,
        Err(e) => {
            return vec![Outcome::fail(
                Finding::Size,
                format!("Sizes could not be read from the page: {e}"),
            )];
        }
    };

    let mut actual = Vec::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        let option = Locator::nth(selectors.sizes.clone(), i);
        let in_stock = match page.attribute(&option, "aria-label").await {
            Ok(Some(aria)) => !is_unavailable_label(&aria),
            Ok(None) => true,
            Err(e) => {
                warn!(size = label.trim(), error = %e, "size label unreadable, assuming in stock");
                true
            }
        };
        actual.push(SizeOption {
            label: label.trim().to_string(),
            in_stock,
        });
    }

    let inventory = SizeInventory::new(expected_csv, actual);
    info!(expected = ?inventory.expected(), actual = ?labels, "comparing sizes");
    inventory.outcomes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockPage};
    use crate::outcome::Verdict;
    use crate::verify::color::confirmed_for_tests;

    fn options(labels: &[&str]) -> Vec<SizeOption> {
        labels
            .iter()
            .map(|l| SizeOption {
                label: (*l).to_string(),
                in_stock: true,
            })
            .collect()
    }

    mod inventory_tests {
        use super::*;

        #[test]
        fn test_missing_only() {
            let inv = SizeInventory::new("S, M, L", options(&["S", "M"]));
            assert_eq!(inv.missing(), vec!["L"]);
            assert!(inv.extra().is_empty());
            let outcomes = inv.outcomes();
            assert_eq!(outcomes.len(), 1);
            assert_eq!(outcomes[0].verdict, Verdict::Fail);
            assert!(outcomes[0].message.contains("[L]"));
        }

        #[test]
        fn test_extra_only_is_info() {
            let inv = SizeInventory::new("S,M", options(&["S", "M", "XL"]));
            assert!(inv.missing().is_empty());
            assert_eq!(inv.extra(), vec!["XL"]);
            let outcomes = inv.outcomes();
            assert_eq!(outcomes.len(), 1);
            assert_eq!(outcomes[0].verdict, Verdict::Info);
        }

        #[test]
        fn test_same_length_both_ways() {
            let inv = SizeInventory::new("S,M,L", options(&["S", "M", "XL"]));
            assert_eq!(inv.missing(), vec!["L"]);
            assert_eq!(inv.extra(), vec!["XL"]);
            assert_eq!(inv.outcomes().len(), 2);
        }

        #[test]
        fn test_exact_match_passes() {
            let inv = SizeInventory::new("S,M,L", options(&["L", "S", "M"]));
            let outcomes = inv.outcomes();
            assert_eq!(outcomes.len(), 1);
            assert!(outcomes[0].is_pass());
        }

        #[test]
        fn test_all_out_of_stock_summary() {
            let actual = ["S", "M"]
                .iter()
                .map(|l| SizeOption {
                    label: (*l).to_string(),
                    in_stock: false,
                })
                .collect();
            let inv = SizeInventory::new("XS", actual);
            let outcomes = inv.outcomes();
            assert_eq!(
                outcomes.last().map(|o| o.message.as_str()),
                Some(ALL_SIZES_OUT_OF_STOCK)
            );
        }

        #[test]
        fn test_no_sizes_rendered_is_not_out_of_stock() {
            let inv = SizeInventory::new("S", Vec::new());
            assert!(!inv.all_out_of_stock());
        }

        #[test]
        fn test_unavailable_labels() {
            assert!(is_unavailable_label("Size 6 - Unavailable"));
            assert!(is_unavailable_label("M, not available"));
            assert!(!is_unavailable_label("Size M"));
        }
    }

    mod verify_tests {
        use super::*;

        #[tokio::test]
        async fn test_reads_labels_and_stock() {
            let s = CatalogSelectors::default();
            let mut page = MockPage::new()
                .with_element(&s.sizes, MockElement::with_text(" S ").attr("aria-label", "S unavailable"))
                .with_element(&s.sizes, MockElement::with_text("M").attr("aria-label", "M not available"));
            let outcomes = verify_sizes(&mut page, &s, &confirmed_for_tests(), "S,M").await;
            assert_eq!(outcomes.len(), 2);
            assert!(outcomes[0].is_pass());
            assert_eq!(outcomes[1].message, ALL_SIZES_OUT_OF_STOCK);
        }

        #[tokio::test]
        async fn test_partially_in_stock_has_no_summary() {
            let s = CatalogSelectors::default();
            let mut page = MockPage::new()
                .with_element(&s.sizes, MockElement::with_text("S").attr("aria-label", "S unavailable"))
                .with_element(&s.sizes, MockElement::with_text("M").attr("aria-label", "Size M"));
            let outcomes = verify_sizes(&mut page, &s, &confirmed_for_tests(), "S,M,L").await;
            assert!(outcomes.iter().all(|o| o.message != ALL_SIZES_OUT_OF_STOCK));
            assert!(outcomes[0].is_fail());
        }
    }
}
