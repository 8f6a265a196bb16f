//! Run summary printing

use console::{style, Style, Term};

use markcheck::{RowReport, RunReport, Verdict};

/// Prints per-row results and the run summary to stdout
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Reporter {
    /// Create a reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// One line per row, failures with their messages
    pub fn row(&self, row: &RowReport) {
        if row.passed() {
            if !self.quiet {
                self.line(&format!("{} row {}: {}", self.prefix(true), row.row_number, row.product));
            }
            return;
        }
        self.line(&format!("{} row {}: {}", self.prefix(false), row.row_number, row.product));
        for outcome in row.outcomes.iter().filter(|o| o.verdict == Verdict::Fail) {
            let first_line = outcome.message.lines().next().unwrap_or_default();
            self.line(&format!("    {}: {first_line}", outcome.finding));
        }
    }

    /// Totals for the run
    pub fn summary(&self, report: &RunReport) {
        if self.quiet && report.failed() == 0 {
            return;
        }
        self.line("");
        if self.use_color {
            let status = if report.failed() > 0 {
                Style::new().red().bold().apply_to("FINDINGS")
            } else {
                Style::new().green().bold().apply_to("PASSED")
            };
            self.line(&format!("{status} {report}"));
        } else {
            let status = if report.failed() > 0 { "FINDINGS" } else { "PASSED" };
            self.line(&format!("{status} {report}"));
        }
    }

    /// Plain informational line
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.line(message);
        }
    }

    fn prefix(&self, passed: bool) -> String {
        match (self.use_color, passed) {
            (true, true) => style("✓").green().bold().to_string(),
            (true, false) => style("✗").red().bold().to_string(),
            (false, true) => "PASS".to_string(),
            (false, false) => "FAIL".to_string(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}
