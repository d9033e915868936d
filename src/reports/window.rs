//! Window normalization
//!
//! Rebases the cumulative index so that a chosen reporting window starts at
//! 0%. The baseline is the last snapshot *before* the window (the anchor), so
//! the return of the window's first period is kept rather than erased.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use super::returns::ReturnRecord;
use crate::error::TrackerError;

/// Reporting window selected for a view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Window {
    #[default]
    All,
    YearToDate,
    TrailingYear,
    TrailingThreeMonths,
    Since(NaiveDate),
}

impl Window {
    /// First date included in the window.
    ///
    /// `All` starts at the first snapshot and has no start when there are no
    /// snapshots. Trailing windows step back whole calendar months, clamping
    /// to the end of shorter months.
    pub fn start_date(
        &self,
        today: NaiveDate,
        first_snapshot: Option<NaiveDate>,
    ) -> Option<NaiveDate> {
        match self {
            Window::All => first_snapshot,
            Window::YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1),
            Window::TrailingYear => today.checked_sub_months(Months::new(12)),
            Window::TrailingThreeMonths => today.checked_sub_months(Months::new(3)),
            Window::Since(date) => Some(*date),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Window::All => "All".to_string(),
            Window::YearToDate => "Year-to-date".to_string(),
            Window::TrailingYear => "Trailing 1 year".to_string(),
            Window::TrailingThreeMonths => "Trailing 3 months".to_string(),
            Window::Since(date) => format!("Since {}", date),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::All => write!(f, "all"),
            Window::YearToDate => write!(f, "ytd"),
            Window::TrailingYear => write!(f, "1y"),
            Window::TrailingThreeMonths => write!(f, "3m"),
            Window::Since(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl FromStr for Window {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "alltime" => Ok(Window::All),
            "ytd" => Ok(Window::YearToDate),
            "1y" | "oneyear" => Ok(Window::TrailingYear),
            "3m" => Ok(Window::TrailingThreeMonths),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map(Window::Since)
                .map_err(|_| {
                    TrackerError::ParseError(format!(
                        "invalid window '{}'. Use: all, ytd, 1y, 3m, or a start date (YYYY-MM-DD)",
                        s
                    ))
                }),
        }
    }
}

impl TryFrom<String> for Window {
    type Error = TrackerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Window> for String {
    fn from(window: Window) -> Self {
        window.to_string()
    }
}

/// Window-relative performance at one snapshot date
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub performance_pct: f64,
}

/// Last record strictly before the window start
pub fn anchor_record(series: &[ReturnRecord], window_start: NaiveDate) -> Option<&ReturnRecord> {
    series.iter().take_while(|r| r.date < window_start).last()
}

/// Date of the anchor record, if the window does not cover the whole history
pub fn anchor_date(series: &[ReturnRecord], window_start: NaiveDate) -> Option<NaiveDate> {
    anchor_record(series, window_start).map(|r| r.date)
}

/// Rebase a return series to the window starting at `window_start`.
///
/// `series` must be in ascending date order, as produced by
/// [`build_return_series`](super::returns::build_return_series). Every record
/// on or after `window_start` yields one point; without an anchor the first
/// in-window record is the baseline and reads exactly 0%.
pub fn normalize_window(series: &[ReturnRecord], window_start: NaiveDate) -> Vec<PerformancePoint> {
    let in_window: Vec<&ReturnRecord> = series.iter().filter(|r| r.date >= window_start).collect();

    let base = match anchor_record(series, window_start).or(in_window.first().copied()) {
        Some(record) => record,
        None => return Vec::new(),
    };

    let base_index = base.cumulative_index;
    if base_index <= 0.0 {
        warn!(
            "Index at {} is {}; window performance reported as 0%",
            base.date, base_index
        );
    }

    in_window
        .into_iter()
        .map(|r| PerformancePoint {
            date: r.date,
            performance_pct: if base_index > 0.0 {
                (r.cumulative_index / base_index - 1.0) * 100.0
            } else {
                0.0
            },
        })
        .collect()
}
