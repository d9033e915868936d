//! Benchmark alignment
//!
//! Maps external closing prices onto the portfolio's snapshot dates and
//! rebases them to percentages so they can be drawn next to the window
//! performance. Nothing here feeds back into the return math.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::pricing::ClosePrice;

/// Where a benchmark's 0% baseline sits.
///
/// One policy applies to every benchmark in a view; mixing them would make
/// benchmarks in the same chart disagree about where the window starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebasePolicy {
    /// Baseline is the first price available inside the window
    FirstAvailable,
    /// Baseline is the close at or before the portfolio's anchor date, so the
    /// benchmark and the portfolio start counting on the same day
    #[default]
    SharedAnchor,
}

/// Most recent close at or before `date`.
///
/// `prices` must be in ascending date order. Weekends and holidays simply
/// carry the previous close forward.
pub fn price_at_or_before(prices: &[ClosePrice], date: NaiveDate) -> Option<f64> {
    let idx = prices.partition_point(|p| p.date <= date);
    idx.checked_sub(1).map(|i| prices[i].close)
}

/// Date range to request from a price feed for a window view.
///
/// Starts ten days before the window (five before the anchor when that is
/// earlier) so the first snapshot dates have a close to forward-fill from.
pub fn fetch_range(
    window_start: NaiveDate,
    anchor: Option<NaiveDate>,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let mut start = window_start - Days::new(10);
    if let Some(anchor) = anchor {
        start = start.min(anchor - Days::new(5));
    }
    (start, today + Days::new(1))
}

/// Align a benchmark to `dates` and express it as percent change from its
/// baseline.
///
/// Returns None when no positive baseline price can be found, in which case
/// the benchmark should be left out of the view. Dates before the first
/// available price map to None.
pub fn align_benchmark(
    prices: &[ClosePrice],
    dates: &[NaiveDate],
    anchor: Option<NaiveDate>,
    policy: RebasePolicy,
) -> Option<Vec<Option<f64>>> {
    let mut sorted = prices.to_vec();
    sorted.sort_by_key(|p| p.date);

    let aligned: Vec<Option<f64>> = dates
        .iter()
        .map(|d| price_at_or_before(&sorted, *d))
        .collect();
    let first_available = aligned.iter().flatten().next().copied();

    let base = match policy {
        RebasePolicy::FirstAvailable => first_available,
        RebasePolicy::SharedAnchor => anchor
            .and_then(|a| price_at_or_before(&sorted, a))
            .or(first_available),
    }?;

    if base <= 0.0 {
        return None;
    }

    Some(
        aligned
            .into_iter()
            .map(|price| price.map(|p| (p - base) / base * 100.0))
            .collect(),
    )
}
