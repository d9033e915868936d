// Pricing module - benchmark price feeds

pub mod yahoo;

use anyhow::Result;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::future::Future;

pub use yahoo::YahooFeed;

/// Daily closing price of a benchmark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosePrice {
    pub date: NaiveDate,
    pub close: f64,
}

/// A named benchmark and the ticker its prices are fetched under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkPreset {
    pub name: String,
    pub ticker: String,
}

impl BenchmarkPreset {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }

    /// Match by display name or ticker, ignoring case
    pub fn matches(&self, key: &str) -> bool {
        self.name.eq_ignore_ascii_case(key) || self.ticker.eq_ignore_ascii_case(key)
    }
}

/// Presets offered when the config file does not list its own
pub static DEFAULT_BENCHMARKS: Lazy<Vec<BenchmarkPreset>> = Lazy::new(|| {
    vec![
        BenchmarkPreset::new("TAIEX", "^TWII"),
        BenchmarkPreset::new("Taiwan 50", "0050.TW"),
        BenchmarkPreset::new("Dow Jones", "^DJI"),
        BenchmarkPreset::new("S&P 500", "SPY"),
        BenchmarkPreset::new("Nasdaq 100", "QQQ"),
        BenchmarkPreset::new("Gold", "GC=F"),
        BenchmarkPreset::new("Bitcoin", "BTC-USD"),
    ]
});

/// Source of historical benchmark closes.
///
/// Implementations may return gaps (weekends, holidays); callers forward-fill.
/// Timeouts and retries are the implementation's business.
pub trait BenchmarkFeed {
    fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<ClosePrice>>>;
}

/// True when network price fetches are disabled (NETWORTH_OFFLINE=1)
pub fn is_offline() -> bool {
    std::env::var("NETWORTH_OFFLINE")
        .map(|v| v != "0")
        .unwrap_or(false)
}
