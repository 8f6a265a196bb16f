//! Suite runner: session set-up, then every selected row in order.

use serde::Serialize;
use std::fmt;
use tracing::{error, info};
use url::Url;

use crate::config::SuiteConfig;
use crate::discovery::{resolve_listing, ProductLocator};
use crate::driver::PageDriver;
use crate::outcome::{Finding, Outcome};
use crate::result::MarkcheckResult;
use crate::row::{RowSelection, TestRow};
use crate::sink::{Note, ResultSink};
use crate::storefront::{Credentials, Storefront};
use crate::verify::{RowReport, VerificationPipeline};

/// Outcome of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Per-row reports in run order
    pub rows: Vec<RowReport>,
}

impl RunReport {
    /// Rows run
    #[must_use]
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    /// Rows with no failing outcome
    #[must_use]
    pub fn passed(&self) -> usize {
        self.rows.iter().filter(|r| r.passed()).count()
    }

    /// Rows with at least one failure
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Rows whose product was never reached
    #[must_use]
    pub fn not_found(&self) -> usize {
        self.rows.iter().filter(|r| !r.located).count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows: {} passed, {} with findings ({} not found)",
            self.total(),
            self.passed(),
            self.failed(),
            self.not_found()
        )
    }
}

/// Drives a configured suite over one page
#[derive(Debug, Clone, Copy)]
pub struct SuiteRunner<'a> {
    config: &'a SuiteConfig,
}

impl<'a> SuiteRunner<'a> {
    /// Create a runner
    #[must_use]
    pub const fn new(config: &'a SuiteConfig) -> Self {
        Self { config }
    }

    /// Land on `environment`, clear popups, log in and resolve the listing URL
    pub async fn prepare<D: PageDriver + ?Sized>(
        &self,
        page: &mut D,
        environment: &str,
        credentials: Option<&Credentials>,
    ) -> MarkcheckResult<Url> {
        let base = self.config.environments.resolve(environment)?;
        let storefront = Storefront::new(&self.config.selectors, &self.config.timing);
        storefront.open(page, &base).await?;
        storefront.accept_cookies(page).await?;
        if let Some(credentials) = credentials {
            storefront.login(page, credentials).await?;
        }
        let configured = self.config.promotions_url(&base)?;
        resolve_listing(page, &self.config.selectors, configured, &base).await
    }

    /// Verify every selected row against the listing at `listing`.
    ///
    /// A row that fails on a page error gets a catalog note and the run moves
    /// on; errors that make further rows pointless are returned.
    pub async fn run<D, S>(
        &self,
        page: &mut D,
        sink: &mut S,
        listing: &Url,
        rows: &[TestRow],
        selection: RowSelection,
    ) -> MarkcheckResult<RunReport>
    where
        D: PageDriver + ?Sized,
        S: ResultSink + ?Sized,
    {
        let locator = ProductLocator::new(&self.config.selectors, &self.config.timing, listing);
        let pipeline = VerificationPipeline::new(
            locator,
            &self.config.selectors,
            &self.config.timing,
            self.config.workbook.first_data_row,
        );

        let mut report = RunReport::default();
        for row in rows.iter().filter(|r| selection.contains(r.row_number)) {
            match pipeline.run(page, sink, row).await {
                Ok(row_report) => report.rows.push(row_report),
                Err(e) if e.aborts_run() => {
                    error!(row = row.row_number, error = %e, "run aborted");
                    return Err(e);
                }
                Err(e) => {
                    error!(row = row.row_number, error = %e, "row aborted");
                    let outcome = Outcome::fail(Finding::Catalog, format!("Row verification aborted: {e}"));
                    if let Some(note) = Note::from_outcome(&outcome) {
                        sink.record(row.sheet_row(self.config.workbook.first_data_row), &note)?;
                    }
                    report.rows.push(RowReport {
                        row_number: row.row_number,
                        product: row.expected_product_name.clone(),
                        located: false,
                        outcomes: vec![outcome],
                    });
                }
            }
        }
        info!(%report, "run finished");
        Ok(report)
    }
}
