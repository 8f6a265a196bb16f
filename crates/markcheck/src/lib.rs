//! Markcheck: markdown pricing verification for a promotional product catalog
//!
//! Each row of the test-data workbook names a product on markdown. The suite
//! finds it on the promotions listing (by name, then by product ID), confirms
//! the color, and only then checks name, sizes, prices, accordions and
//! images. Findings are merged into the row's note columns as they happen.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌──────────────────────┐
//! │ Workbook     │──►│ SuiteRunner    │──►│ VerificationPipeline │
//! │ (rows)       │   │ (session, rows)│   │ locate ► color ► ... │
//! └──────────────┘   └────────────────┘   └──────────┬───────────┘
//!        ▲                                           │ Outcome
//!        └──────────── ResultSink (notes) ◄──────────┘
//! ```
//!
//! The page is abstracted by [`PageDriver`]: [`ChromiumPage`] drives a real
//! browser (feature `browser`), [`MockPage`] a scripted in-memory DOM.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod browser;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod driver;
pub mod locator;
pub mod mock;
pub mod outcome;
pub mod result;
pub mod row;
pub mod runner;
pub mod sink;
pub mod storefront;
pub mod verify;
pub mod wait;
pub mod workbook;

pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::{Browser, ChromiumPage};
pub use catalog::{AccordionSelectors, CatalogSelectors, ImageRegion};
pub use config::{Environments, SuiteConfig, DEFAULT_CONFIG_FILE};
pub use discovery::{resolve_listing, LocateOutcome, ProductLocator};
pub use driver::{ElementState, FetchStatus, PageDriver};
pub use locator::{Locator, Selector, SelectorTemplate};
pub use mock::{MockElement, MockPage};
pub use outcome::{Finding, Highlight, NoteColumn, Outcome, Verdict};
pub use result::{AbsentOk, MarkcheckError, MarkcheckResult};
pub use row::{CategoryFilter, RowSelection, TestRow};
pub use runner::{RunReport, SuiteRunner};
pub use sink::{MemorySink, Note, ResultSink};
pub use storefront::{Credentials, Storefront};
pub use verify::{ColorConfirmed, RowReport, VerificationPipeline};
pub use wait::{Deadline, Timing};
pub use workbook::{HeaderNames, NoteColumns, WorkbookLayout, WorkbookReader, WorkbookSink};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        Credentials, Finding, MarkcheckError, MarkcheckResult, MemorySink, MockElement, MockPage,
        Outcome, PageDriver, ResultSink, RowSelection, Selector, SuiteConfig, SuiteRunner,
        TestRow, Verdict, WorkbookReader, WorkbookSink,
    };
}
