//! Windowed performance view
//!
//! Composes the return series, the window normalizer and benchmark alignment
//! into one chart-ready table. Benchmark prices are fetched before any
//! alignment happens; a benchmark whose fetch fails is reported and left out,
//! the rest of the view is still produced.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::benchmark::{align_benchmark, fetch_range, RebasePolicy};
use super::returns::{build_return_series, ReturnRecord};
use super::window::{anchor_date, normalize_window, Window};
use crate::config::Config;
use crate::db::Snapshot;
use crate::pricing::{BenchmarkFeed, BenchmarkPreset};

/// One snapshot date inside the window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    pub date: NaiveDate,
    pub total_assets: f64,
    pub net_flow: f64,
    pub performance_pct: f64,
}

/// A benchmark aligned to the view's dates; `values[i]` belongs to `rows[i]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkLine {
    pub name: String,
    pub ticker: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkFailure {
    pub name: String,
    pub ticker: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceView {
    pub window: Window,
    pub window_start: Option<NaiveDate>,
    /// Last snapshot before the window; the 0% baseline when present
    pub anchor_date: Option<NaiveDate>,
    pub flow_weight: f64,
    pub rebase_policy: RebasePolicy,
    pub rows: Vec<PerformanceRow>,
    pub benchmarks: Vec<BenchmarkLine>,
    pub benchmark_failures: Vec<BenchmarkFailure>,
}

impl PerformanceView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Performance at the last date in the window
    pub fn latest_pct(&self) -> Option<f64> {
        self.rows.last().map(|r| r.performance_pct)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }
}

/// Rows of a window over an already built series, with the window start and
/// anchor used. Pure; no benchmarks.
pub fn window_rows(
    series: &[ReturnRecord],
    window: Window,
    today: NaiveDate,
) -> (Option<NaiveDate>, Option<NaiveDate>, Vec<PerformanceRow>) {
    let first = series.first().map(|r| r.date);
    let Some(start) = window.start_date(today, first) else {
        return (None, None, Vec::new());
    };

    let anchor = anchor_date(series, start);
    let in_window = series.iter().filter(|r| r.date >= start);
    let rows = normalize_window(series, start)
        .into_iter()
        .zip(in_window)
        .map(|(point, record)| PerformanceRow {
            date: point.date,
            total_assets: record.total_assets,
            net_flow: record.net_flow,
            performance_pct: point.performance_pct,
        })
        .collect();

    (Some(start), anchor, rows)
}

/// Build the performance view for `window`, comparing against `benchmarks`.
///
/// Pass an empty benchmark list to skip the feed entirely (offline use).
pub async fn build_performance_view<F: BenchmarkFeed>(
    snapshots: &[Snapshot],
    config: &Config,
    window: Window,
    benchmarks: &[BenchmarkPreset],
    feed: &F,
    today: NaiveDate,
) -> Result<PerformanceView> {
    let series = build_return_series(snapshots, config.flow_weight)?;
    let (window_start, anchor, rows) = window_rows(&series, window, today);

    let mut view = PerformanceView {
        window,
        window_start,
        anchor_date: anchor,
        flow_weight: config.flow_weight.value(),
        rebase_policy: config.rebase_policy,
        rows,
        benchmarks: Vec::new(),
        benchmark_failures: Vec::new(),
    };

    let Some(start) = window_start else {
        return Ok(view);
    };
    if view.is_empty() {
        return Ok(view);
    }

    let dates = view.dates();
    let (fetch_start, fetch_end) = fetch_range(start, anchor, today);

    for preset in benchmarks {
        let prices = match feed.fetch(&preset.ticker, fetch_start, fetch_end).await {
            Ok(prices) => prices,
            Err(e) => {
                warn!("Skipping benchmark {} ({}): {:#}", preset.name, preset.ticker, e);
                view.benchmark_failures.push(BenchmarkFailure {
                    name: preset.name.clone(),
                    ticker: preset.ticker.clone(),
                    error: format!("{:#}", e),
                });
                continue;
            }
        };

        match align_benchmark(&prices, &dates, anchor, config.rebase_policy) {
            Some(values) => view.benchmarks.push(BenchmarkLine {
                name: preset.name.clone(),
                ticker: preset.ticker.clone(),
                values,
            }),
            None => {
                warn!("No usable prices for benchmark {}", preset.ticker);
                view.benchmark_failures.push(BenchmarkFailure {
                    name: preset.name.clone(),
                    ticker: preset.ticker.clone(),
                    error: "no prices available for the window".to_string(),
                });
            }
        }
    }

    info!(
        "Performance view {}: {} rows, {} benchmarks",
        window,
        view.rows.len(),
        view.benchmarks.len()
    );
    Ok(view)
}
