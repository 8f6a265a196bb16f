//! Verification outcomes and where they land in the workbook.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Finding {
    /// Product discovery on the listing / search
    Catalog,
    /// Color swatch presence
    Color,
    /// Product name
    Name,
    /// Size set and stock
    Size,
    /// Markdown and regular price
    Price,
    /// Expandable sections
    Accordion,
    /// Image integrity
    Image,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Catalog => "catalog",
            Self::Color => "color",
            Self::Name => "name",
            Self::Size => "size",
            Self::Price => "price",
            Self::Accordion => "accordion",
            Self::Image => "image",
        };
        write!(f, "{name}")
    }
}

/// Result of one check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Matched expectations
    Pass,
    /// Mismatch or missing element
    Fail,
    /// Not a failure, worth noting (price range, extra sizes, stock)
    Info,
}

/// Workbook note column an outcome is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NoteColumn {
    /// General comments
    Comment,
    /// Catalog operations (discovery and skip reasons)
    CatalogOps,
    /// Size notes
    SizeNotes,
    /// Price notes
    PriceNotes,
    /// Photo notes
    PhotoNotes,
}

impl NoteColumn {
    /// All note columns
    pub const ALL: [Self; 5] = [
        Self::Comment,
        Self::CatalogOps,
        Self::SizeNotes,
        Self::PriceNotes,
        Self::PhotoNotes,
    ];
}

/// Highlight requested on the row's price cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Highlight {
    /// Checked and correct: bold, green fill, thick border
    Good,
    /// Checked and wrong: thick border, no fill
    Cleared,
}

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// What was checked
    pub finding: Finding,
    /// Result
    pub verdict: Verdict,
    /// Human-readable message
    pub message: String,
    /// Price-cell highlight (price check only)
    pub highlight: Option<Highlight>,
}

impl Outcome {
    /// Passing outcome
    #[must_use]
    pub fn pass(finding: Finding, message: impl Into<String>) -> Self {
        Self::new(finding, Verdict::Pass, message)
    }

    /// Failing outcome
    #[must_use]
    pub fn fail(finding: Finding, message: impl Into<String>) -> Self {
        Self::new(finding, Verdict::Fail, message)
    }

    /// Informational outcome
    #[must_use]
    pub fn info(finding: Finding, message: impl Into<String>) -> Self {
        Self::new(finding, Verdict::Info, message)
    }

    fn new(finding: Finding, verdict: Verdict, message: impl Into<String>) -> Self {
        Self {
            finding,
            verdict,
            message: message.into(),
            highlight: None,
        }
    }

    /// Attach a price-cell highlight
    #[must_use]
    pub const fn with_highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = Some(highlight);
        self
    }

    /// Check verdict
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Check verdict
    #[must_use]
    pub fn is_fail(&self) -> bool {
        self.verdict == Verdict::Fail
    }

    /// Note column this outcome is written to; `None` for quiet passes
    #[must_use]
    pub const fn column(&self) -> Option<NoteColumn> {
        match (self.finding, self.verdict) {
            (Finding::Accordion | Finding::Image, Verdict::Pass) => None,
            (Finding::Color | Finding::Name, Verdict::Pass) => Some(NoteColumn::Comment),
            (Finding::Catalog | Finding::Color | Finding::Name, _) => Some(NoteColumn::CatalogOps),
            (Finding::Size, _) => Some(NoteColumn::SizeNotes),
            (Finding::Price, _) => Some(NoteColumn::PriceNotes),
            (Finding::Accordion, _) => Some(NoteColumn::Comment),
            (Finding::Image, _) => Some(NoteColumn::PhotoNotes),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = match self.verdict {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::Info => "INFO",
        };
        write!(f, "[{verdict}] {}: {}", self.finding, self.message)
    }
}
