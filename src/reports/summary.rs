//! Whole-history portfolio summary

use chrono::NaiveDate;
use serde::Serialize;

use super::returns::ReturnRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub first_date: NaiveDate,
    pub latest_date: NaiveDate,
    pub snapshot_count: usize,
    pub starting_assets: f64,
    pub latest_assets: f64,
    /// Sum of flows after the first snapshot (the first snapshot's flow is
    /// part of the starting balance)
    pub net_contributions: f64,
    /// Change in assets not explained by contributions
    pub investment_gain: f64,
    pub cumulative_return_pct: f64,
    pub flagged_periods: usize,
}

/// Summarize a return series. None for an empty series.
pub fn summarize(series: &[ReturnRecord]) -> Option<PortfolioSummary> {
    let first = series.first()?;
    let last = series.last()?;

    let net_contributions: f64 = series.iter().skip(1).map(|r| r.net_flow).sum();
    let investment_gain = last.total_assets - first.total_assets - net_contributions;

    Some(PortfolioSummary {
        first_date: first.date,
        latest_date: last.date,
        snapshot_count: series.len(),
        starting_assets: first.total_assets,
        latest_assets: last.total_assets,
        net_contributions,
        investment_gain,
        cumulative_return_pct: (last.cumulative_index - 1.0) * 100.0,
        flagged_periods: series.iter().filter(|r| r.is_flagged()).count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Snapshot;
    use crate::reports::{build_return_series, FlowWeight};

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[test]
    fn test_summary_separates_contributions_from_gains() {
        let snapshots = vec![
            Snapshot::new(d(1, 1), 1000.0, 1000.0),
            Snapshot::new(d(2, 1), 1100.0, 0.0),
            Snapshot::new(d(3, 1), 1710.0, 500.0),
        ];
        let series = build_return_series(&snapshots, FlowWeight::END_OF_PERIOD).unwrap();
        let summary = summarize(&series).unwrap();

        assert_eq!(summary.first_date, d(1, 1));
        assert_eq!(summary.latest_date, d(3, 1));
        assert_eq!(summary.snapshot_count, 3);
        assert_eq!(summary.net_contributions, 500.0);
        assert_eq!(summary.investment_gain, 210.0);
        let expected = (1.1 * (1.0 + 110.0 / 1600.0) - 1.0) * 100.0;
        assert!((summary.cumulative_return_pct - expected).abs() < 1e-9);
        assert_eq!(summary.flagged_periods, 0);
    }

    #[test]
    fn test_summary_counts_flagged_periods() {
        let snapshots = vec![
            Snapshot::new(d(1, 1), 0.0, 0.0),
            Snapshot::new(d(2, 1), 100.0, 100.0),
        ];
        let series = build_return_series(&snapshots, FlowWeight::SIMPLE_DIETZ).unwrap();
        let summary = summarize(&series).unwrap();
        assert_eq!(summary.flagged_periods, 0);
        assert_eq!(summary.investment_gain, 0.0);

        let snapshots = vec![
            Snapshot::new(d(1, 1), 0.0, 0.0),
            Snapshot::new(d(2, 1), 100.0, 0.0),
        ];
        let series = build_return_series(&snapshots, FlowWeight::SIMPLE_DIETZ).unwrap();
        assert_eq!(summarize(&series).unwrap().flagged_periods, 1);
    }

    #[test]
    fn test_empty_series_has_no_summary() {
        assert_eq!(summarize(&[]), None);
    }
}
