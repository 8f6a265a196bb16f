//! Test rows read from the data region of the workbook.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::result::{MarkcheckError, MarkcheckResult};

/// Gender/category filter applied to the promotions listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryFilter {
    /// Women filter
    Women,
    /// Men filter
    Men,
    /// No filter
    Unfiltered,
}

impl CategoryFilter {
    /// Map a row's class cell ("Women", "Men's Shorts", ...) to a filter.
    ///
    /// "Women" is checked first; the match is case-sensitive so the "men" in
    /// "Women" never selects the men filter.
    #[must_use]
    pub fn from_class(class: &str) -> Self {
        if class.contains("Women") {
            Self::Women
        } else if class.contains("Men") {
            Self::Men
        } else {
            Self::Unfiltered
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Women => "Women",
            Self::Men => "Men",
            Self::Unfiltered => "none",
        };
        write!(f, "{name}")
    }
}

/// One unit of work
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestRow {
    /// 1-based index into the data region
    pub row_number: u32,
    /// Expected product display name
    pub expected_product_name: String,
    /// Expected color name
    pub expected_color: String,
    /// Expected sizes, comma-separated
    pub expected_sizes: String,
    /// Expected regular price, e.g. "$98"
    pub expected_regular_price: String,
    /// Expected markdown price, e.g. "$49"
    pub expected_markdown_price: String,
    /// Category class ("Women", "Men", other)
    pub category_class: String,
    /// Product ID used by the search fallback
    pub markdown_product_id: String,
}

impl TestRow {
    /// Filter derived from the category class
    #[must_use]
    pub fn category(&self) -> CategoryFilter {
        CategoryFilter::from_class(&self.category_class)
    }

    /// Worksheet row this test row lives on, given the first data row
    #[must_use]
    pub const fn sheet_row(&self, first_data_row: u32) -> u32 {
        first_data_row + self.row_number - 1
    }
}

/// Which data rows to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowSelection {
    /// Every non-empty row
    #[default]
    All,
    /// Inclusive range of data-row numbers
    Range {
        /// First row
        first: u32,
        /// Last row
        last: u32,
    },
}

impl RowSelection {
    /// Whether `row_number` is selected
    #[must_use]
    pub const fn contains(&self, row_number: u32) -> bool {
        match self {
            Self::All => true,
            Self::Range { first, last } => row_number >= *first && row_number <= *last,
        }
    }
}

impl FromStr for RowSelection {
    type Err = MarkcheckError;

    /// Parse "all", "3" or "2-5"
    fn from_str(s: &str) -> MarkcheckResult<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| MarkcheckError::config(format!("invalid row number: {v:?}")))
        };
        let (first, last) = match s.split_once('-') {
            Some((a, b)) => (parse(a)?, parse(b)?),
            None => {
                let n = parse(s)?;
                (n, n)
            }
        };
        if first > last {
            return Err(MarkcheckError::config(format!("empty row range: {s}")));
        }
        Ok(Self::Range { first, last })
    }
}
