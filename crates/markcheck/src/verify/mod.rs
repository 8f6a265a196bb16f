//! Per-row verification pipeline.
//!
//! ```text
//! locate ──▶ color ──ColorConfirmed──▶ name ▶ size ▶ price ▶ accordions ▶ images
//! ```
//!
//! Every stage reports through the sink as soon as it finishes. The
//! downstream stages take `&ColorConfirmed`, so none of them can run for a
//! row whose color was never found.

pub mod accordion;
pub mod color;
pub mod image;
pub mod name;
pub mod price;
pub mod size;

pub use accordion::verify_accordions;
pub use color::{verify_color, ColorConfirmed};
pub use image::verify_images;
pub use name::{normalize_name, verify_name};
pub use price::{extract_price_token, verify_price};
pub use size::{verify_sizes, SizeInventory, ALL_SIZES_OUT_OF_STOCK};

use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};

use crate::catalog::CatalogSelectors;
use crate::discovery::{LocateOutcome, ProductLocator};
use crate::driver::PageDriver;
use crate::outcome::{Finding, Outcome, Verdict};
use crate::result::MarkcheckResult;
use crate::row::TestRow;
use crate::sink::{Note, ResultSink};
use crate::wait::Timing;

/// Everything that happened to one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowReport {
    /// Data-row number
    pub row_number: u32,
    /// Product name from the row
    pub product: String,
    /// Whether the detail page was reached
    pub located: bool,
    /// Outcomes in the order they were produced
    pub outcomes: Vec<Outcome>,
}

impl RowReport {
    /// Whether no outcome failed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.located && !self.outcomes.iter().any(Outcome::is_fail)
    }

    /// Outcomes for one finding
    pub fn outcomes_for(&self, finding: Finding) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(move |o| o.finding == finding)
    }

    /// Count of outcomes with `verdict`
    #[must_use]
    pub fn count(&self, verdict: Verdict) -> usize {
        self.outcomes.iter().filter(|o| o.verdict == verdict).count()
    }
}

/// Records outcomes for one row as they are produced
struct RowRecorder<'s, S: ResultSink + ?Sized> {
    sink: &'s mut S,
    sheet_row: u32,
    outcomes: Vec<Outcome>,
}

impl<S: ResultSink + ?Sized> RowRecorder<'_, S> {
    fn push(&mut self, outcome: Outcome) -> MarkcheckResult<()> {
        match outcome.verdict {
            Verdict::Fail => warn!(%outcome),
            Verdict::Pass | Verdict::Info => info!(%outcome),
        }
        if let Some(note) = Note::from_outcome(&outcome) {
            self.sink.record(self.sheet_row, &note)?;
        }
        self.outcomes.push(outcome);
        Ok(())
    }

    fn extend(&mut self, outcomes: Vec<Outcome>) -> MarkcheckResult<()> {
        outcomes.into_iter().try_for_each(|o| self.push(o))
    }
}

/// Locate a row's product and run the field checks in their fixed order
#[derive(Debug, Clone, Copy)]
pub struct VerificationPipeline<'a> {
    locator: ProductLocator<'a>,
    selectors: &'a CatalogSelectors,
    timing: &'a Timing,
    first_data_row: u32,
}

impl<'a> VerificationPipeline<'a> {
    /// Create a pipeline writing to rows offset by `first_data_row`
    #[must_use]
    pub const fn new(
        locator: ProductLocator<'a>,
        selectors: &'a CatalogSelectors,
        timing: &'a Timing,
        first_data_row: u32,
    ) -> Self {
        Self {
            locator,
            selectors,
            timing,
            first_data_row,
        }
    }

    /// Run every stage for `row`.
    ///
    /// Check failures become outcomes. Errors are driver failures during
    /// discovery and sink write failures.
    pub async fn run<D, S>(&self, page: &mut D, sink: &mut S, row: &TestRow) -> MarkcheckResult<RowReport>
    where
        D: PageDriver + ?Sized,
        S: ResultSink + ?Sized,
    {
        let span = info_span!("row", row = row.row_number, product = row.expected_product_name.as_str());
        self.run_row(page, sink, row).instrument(span).await
    }

    async fn run_row<D, S>(&self, page: &mut D, sink: &mut S, row: &TestRow) -> MarkcheckResult<RowReport>
    where
        D: PageDriver + ?Sized,
        S: ResultSink + ?Sized,
    {
        let mut recorder = RowRecorder {
            sink,
            sheet_row: row.sheet_row(self.first_data_row),
            outcomes: Vec::new(),
        };

        let located = self.locator.locate(page, row).await?;
        if let Some(outcome) = located.report(row) {
            recorder.push(outcome)?;
        }
        if located == LocateOutcome::NotFound {
            return Ok(row_report(row, false, recorder.outcomes));
        }

        let (color_outcome, confirmed) =
            verify_color(page, self.selectors, &row.expected_color, &row.expected_product_name).await;
        recorder.push(color_outcome)?;
        let Some(color) = confirmed else {
            info!("skipping field checks, color not found");
            return Ok(row_report(row, true, recorder.outcomes));
        };

        recorder.push(verify_name(page, self.selectors, &color, &row.expected_product_name).await)?;
        recorder.extend(verify_sizes(page, self.selectors, &color, &row.expected_sizes).await)?;
        recorder.extend(
            verify_price(
                page,
                self.selectors,
                &color,
                &row.expected_regular_price,
                &row.expected_markdown_price,
            )
            .await,
        )?;
        recorder.push(verify_accordions(page, self.selectors, self.timing, &color).await)?;
        recorder.push(verify_images(page, self.selectors, &color).await)?;

        Ok(row_report(row, true, recorder.outcomes))
    }
}

fn row_report(row: &TestRow, located: bool, outcomes: Vec<Outcome>) -> RowReport {
    RowReport {
        row_number: row.row_number,
        product: row.expected_product_name.clone(),
        located,
        outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<Outcome>, located: bool) -> RowReport {
        RowReport {
            row_number: 1,
            product: "Pace Short".to_string(),
            located,
            outcomes,
        }
    }

    #[test]
    fn test_passed_needs_location_and_no_failures() {
        assert!(report(vec![Outcome::pass(Finding::Color, "ok")], true).passed());
        assert!(report(vec![Outcome::info(Finding::Size, "extra")], true).passed());
        assert!(!report(vec![Outcome::fail(Finding::Price, "no")], true).passed());
        assert!(!report(Vec::new(), false).passed());
    }

    #[test]
    fn test_counts_and_filters() {
        let r = report(
            vec![
                Outcome::pass(Finding::Color, "ok"),
                Outcome::fail(Finding::Size, "missing"),
                Outcome::info(Finding::Size, "extra"),
            ],
            true,
        );
        assert_eq!(r.count(Verdict::Pass), 1);
        assert_eq!(r.count(Verdict::Fail), 1);
        assert_eq!(r.outcomes_for(Finding::Size).count(), 2);
    }
}
