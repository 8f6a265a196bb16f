//! Wait budgets and polling.
//!
//! All waits are fixed or bounded; none retry with backoff. A wait that runs
//! out means "assume absent" and the caller continues on its failure path.
//! Pauses go through [`PageDriver::wait_for_timeout`] so the mock page can
//! account for them without sleeping.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::driver::PageDriver;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Promotional popup wait after landing on an environment (30 seconds)
pub const DEFAULT_POPUP_TIMEOUT_MS: u64 = 30_000;

/// Gender filter probe wait on the promotions listing
pub const DEFAULT_FILTER_PROBE_TIMEOUT_MS: u64 = 10_000;

/// Lazy-load settle interval after each scroll or "View More" click
pub const DEFAULT_LAZY_LOAD_SETTLE_MS: u64 = 2_000;

/// Search results settle interval
pub const DEFAULT_SEARCH_SETTLE_MS: u64 = 3_000;

/// Auto-retrying assertion budget (accordion state checks)
pub const DEFAULT_ASSERTION_TIMEOUT_MS: u64 = 5_000;

/// Polling interval for auto-retrying assertions
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Upper bound on scroll rounds when the listing never reports an end
pub const DEFAULT_MAX_SCROLL_ROUNDS: u32 = 200;

// =============================================================================
// TIMING
// =============================================================================

/// Wait budgets, configurable from the `timing:` block of the suite config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Popup visibility wait
    pub popup_timeout_ms: u64,
    /// Filter control probe wait
    pub filter_probe_timeout_ms: u64,
    /// Lazy-load settle
    pub lazy_load_settle_ms: u64,
    /// Search settle
    pub search_settle_ms: u64,
    /// Assertion retry budget
    pub assertion_timeout_ms: u64,
    /// Assertion polling interval
    pub poll_interval_ms: u64,
    /// Scroll round cap
    pub max_scroll_rounds: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            popup_timeout_ms: DEFAULT_POPUP_TIMEOUT_MS,
            filter_probe_timeout_ms: DEFAULT_FILTER_PROBE_TIMEOUT_MS,
            lazy_load_settle_ms: DEFAULT_LAZY_LOAD_SETTLE_MS,
            search_settle_ms: DEFAULT_SEARCH_SETTLE_MS,
            assertion_timeout_ms: DEFAULT_ASSERTION_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_scroll_rounds: DEFAULT_MAX_SCROLL_ROUNDS,
        }
    }
}

impl Timing {
    /// Popup wait as Duration
    #[must_use]
    pub const fn popup_timeout(&self) -> Duration {
        Duration::from_millis(self.popup_timeout_ms)
    }

    /// Filter probe wait as Duration
    #[must_use]
    pub const fn filter_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.filter_probe_timeout_ms)
    }

    /// Lazy-load settle as Duration
    #[must_use]
    pub const fn lazy_load_settle(&self) -> Duration {
        Duration::from_millis(self.lazy_load_settle_ms)
    }

    /// Search settle as Duration
    #[must_use]
    pub const fn search_settle(&self) -> Duration {
        Duration::from_millis(self.search_settle_ms)
    }

    /// A fresh assertion deadline
    #[must_use]
    pub const fn assertion_deadline(&self) -> Deadline {
        Deadline::new(
            Duration::from_millis(self.assertion_timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        )
    }
}

// =============================================================================
// DEADLINE
// =============================================================================

/// Remaining budget for an auto-retrying check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    remaining: Duration,
    interval: Duration,
}

impl Deadline {
    /// Budget of `timeout`, polled every `interval`
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            remaining: timeout,
            interval,
        }
    }

    /// Whether any budget is left
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Pause for one polling interval.
    ///
    /// Returns `false` without pausing once the budget is spent.
    pub async fn tick<D: PageDriver + ?Sized>(&mut self, page: &mut D) -> bool {
        if self.is_expired() {
            return false;
        }
        let step = if self.interval.is_zero() {
            self.remaining
        } else {
            self.interval.min(self.remaining)
        };
        page.wait_for_timeout(step).await;
        self.remaining = self.remaining.saturating_sub(step);
        true
    }
}
