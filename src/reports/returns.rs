//! Flow-adjusted return series
//!
//! Turns an ordered list of net-worth snapshots into per-period returns that
//! ignore deposits and withdrawals, and compounds them into a cumulative
//! index starting at 1.0.

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::db::Snapshot;
use crate::error::TrackerError;

/// Fraction of a period's net flow assumed to have been invested for the
/// whole period.
///
/// The period return is `(curr - flow - prev) / (prev + weight * flow)`.
/// `1.0` treats the flow as if it arrived right after the previous snapshot,
/// `0.5` is the Simple Dietz assumption that it arrived mid-period. Changing
/// the weight changes every downstream number, so it is configured once per
/// process and passed explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct FlowWeight(f64);

impl FlowWeight {
    pub const END_OF_PERIOD: FlowWeight = FlowWeight(1.0);
    pub const SIMPLE_DIETZ: FlowWeight = FlowWeight(0.5);

    pub fn new(weight: f64) -> Result<Self, TrackerError> {
        if weight.is_finite() && (0.0..=1.0).contains(&weight) {
            Ok(Self(weight))
        } else {
            Err(TrackerError::ConfigError(format!(
                "flow_weight must be within [0, 1], got {}",
                weight
            )))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for FlowWeight {
    fn default() -> Self {
        Self::SIMPLE_DIETZ
    }
}

impl TryFrom<f64> for FlowWeight {
    type Error = TrackerError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        FlowWeight::new(value)
    }
}

impl From<FlowWeight> for f64 {
    fn from(weight: FlowWeight) -> Self {
        weight.0
    }
}

/// Data-quality flags attached to a period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReturnFlag {
    /// `prev + weight * flow <= 0`; the period return was set to 0.
    DegenerateDenominator { denominator: f64 },
}

/// One snapshot annotated with its period return and the compounded index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnRecord {
    pub date: NaiveDate,
    pub total_assets: f64,
    pub net_flow: f64,
    /// Assets at the previous snapshot; None for the first record
    pub prev_assets: Option<f64>,
    pub daily_return: f64,
    pub cumulative_index: f64,
    pub flag: Option<ReturnFlag>,
}

impl ReturnRecord {
    pub fn is_flagged(&self) -> bool {
        self.flag.is_some()
    }
}

/// Build the flow-adjusted return series for a set of snapshots.
///
/// Input order is not trusted: snapshots are sorted by date first. Two
/// snapshots on the same date cannot form a period and are rejected with
/// [`TrackerError::UnorderedInput`]; the store and the importer both collapse
/// duplicates (last write wins) before calling this. A NaN or infinite
/// amount is rejected with [`TrackerError::NonFiniteAmount`].
pub fn build_return_series(
    snapshots: &[Snapshot],
    weight: FlowWeight,
) -> Result<Vec<ReturnRecord>, TrackerError> {
    if let Some(bad) = snapshots
        .iter()
        .find(|s| !s.total_assets.is_finite() || !s.net_flow.is_finite())
    {
        return Err(TrackerError::NonFiniteAmount(bad.date));
    }

    let mut sorted: Vec<&Snapshot> = snapshots.iter().collect();
    sorted.sort_by_key(|s| s.date);

    if let Some((_, dup)) = sorted
        .iter()
        .tuple_windows()
        .find(|(a, b)| a.date >= b.date)
    {
        return Err(TrackerError::UnorderedInput(dup.date));
    }

    let mut records: Vec<ReturnRecord> = Vec::with_capacity(sorted.len());

    for snapshot in sorted {
        let record = match records.last() {
            None => ReturnRecord {
                date: snapshot.date,
                total_assets: snapshot.total_assets,
                net_flow: snapshot.net_flow,
                prev_assets: None,
                daily_return: 0.0,
                cumulative_index: 1.0,
                flag: None,
            },
            Some(prev) => {
                let (daily_return, flag) = period_return(
                    prev.total_assets,
                    snapshot.total_assets,
                    snapshot.net_flow,
                    weight,
                );
                if let Some(ReturnFlag::DegenerateDenominator { denominator }) = flag {
                    warn!(
                        "Non-positive capital base ({}) for period ending {}; return set to 0",
                        denominator, snapshot.date
                    );
                }
                ReturnRecord {
                    date: snapshot.date,
                    total_assets: snapshot.total_assets,
                    net_flow: snapshot.net_flow,
                    prev_assets: Some(prev.total_assets),
                    daily_return,
                    cumulative_index: prev.cumulative_index * (1.0 + daily_return),
                    flag,
                }
            }
        };
        records.push(record);
    }

    debug!(
        "Built return series: {} records, weight {}",
        records.len(),
        weight.value()
    );
    Ok(records)
}

/// Return for one period. Degenerate capital bases yield 0 plus a flag.
fn period_return(prev: f64, curr: f64, flow: f64, weight: FlowWeight) -> (f64, Option<ReturnFlag>) {
    let denominator = prev + weight.value() * flow;
    if denominator > 0.0 {
        ((curr - flow - prev) / denominator, None)
    } else {
        (0.0, Some(ReturnFlag::DegenerateDenominator { denominator }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn snap(day: u32, assets: f64, flow: f64) -> Snapshot {
        Snapshot::new(d(2024, 1, day), assets, flow)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_empty_input_gives_empty_series() {
        let series = build_return_series(&[], FlowWeight::default()).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_single_snapshot_starts_index_at_one() {
        let series = build_return_series(&[snap(1, 1000.0, 250.0)], FlowWeight::default()).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].daily_return, 0.0);
        assert_eq!(series[0].cumulative_index, 1.0);
        assert_eq!(series[0].prev_assets, None);
        assert!(!series[0].is_flagged());
    }

    #[test]
    fn test_zero_flows_reduce_to_plain_percentage_change() {
        let snapshots = vec![snap(1, 1000.0, 0.0), snap(2, 1100.0, 0.0), snap(3, 990.0, 0.0)];
        for weight in [FlowWeight::END_OF_PERIOD, FlowWeight::SIMPLE_DIETZ] {
            let series = build_return_series(&snapshots, weight).unwrap();
            assert_close(series[1].daily_return, 0.10);
            assert_close(series[2].daily_return, -0.10);
            assert_close(series[2].cumulative_index, 0.99);
        }
    }

    #[test]
    fn test_deposit_is_not_counted_as_gain() {
        let snapshots = vec![snap(1, 1000.0, 0.0), snap(2, 1600.0, 500.0)];
        let series = build_return_series(&snapshots, FlowWeight::END_OF_PERIOD).unwrap();

        // (1600 - 500 - 1000) / (1000 + 500), not (1600 - 1000) / 1000
        assert_close(series[1].daily_return, 100.0 / 1500.0);
        assert_eq!(series[1].prev_assets, Some(1000.0));
    }

    #[test]
    fn test_simple_dietz_weights_half_the_flow() {
        let snapshots = vec![snap(1, 1000.0, 0.0), snap(2, 1600.0, 500.0)];
        let series = build_return_series(&snapshots, FlowWeight::SIMPLE_DIETZ).unwrap();
        assert_close(series[1].daily_return, 100.0 / 1250.0);
    }

    #[test]
    fn test_full_withdrawal_flags_degenerate_period() {
        let snapshots = vec![snap(1, 1000.0, 0.0), snap(2, 0.0, -1000.0)];
        let series = build_return_series(&snapshots, FlowWeight::END_OF_PERIOD).unwrap();

        assert_eq!(series[1].daily_return, 0.0);
        assert_eq!(series[1].cumulative_index, 1.0);
        assert_eq!(
            series[1].flag,
            Some(ReturnFlag::DegenerateDenominator { denominator: 0.0 })
        );
    }

    #[test]
    fn test_index_compounds_period_returns_exactly() {
        let snapshots = vec![
            snap(1, 1000.0, 0.0),
            snap(5, 1300.0, 200.0),
            snap(9, 1250.0, -100.0),
            snap(12, 1400.0, 0.0),
            snap(20, 2000.0, 450.0),
        ];
        let series = build_return_series(&snapshots, FlowWeight::SIMPLE_DIETZ).unwrap();
        for (prev, curr) in series.iter().tuple_windows() {
            assert_eq!(
                curr.cumulative_index,
                prev.cumulative_index * (1.0 + curr.daily_return)
            );
        }
    }

    #[test]
    fn test_unsorted_input_is_sorted_before_building() {
        let shuffled = vec![snap(3, 1210.0, 0.0), snap(1, 1000.0, 0.0), snap(2, 1100.0, 0.0)];
        let series = build_return_series(&shuffled, FlowWeight::default()).unwrap();
        let dates: Vec<_> = series.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
        assert_close(series[2].cumulative_index, 1.21);
    }

    #[test]
    fn test_duplicate_dates_are_rejected() {
        let snapshots = vec![snap(1, 1000.0, 0.0), snap(2, 1100.0, 0.0), snap(2, 1150.0, 0.0)];
        let err = build_return_series(&snapshots, FlowWeight::default()).unwrap_err();
        assert!(matches!(err, TrackerError::UnorderedInput(date) if date == d(2024, 1, 2)));
    }

    #[test]
    fn test_non_finite_amounts_are_rejected() {
        let nan_assets = vec![snap(1, 1000.0, 0.0), snap(2, f64::NAN, 0.0)];
        let err = build_return_series(&nan_assets, FlowWeight::default()).unwrap_err();
        assert!(matches!(err, TrackerError::NonFiniteAmount(date) if date == d(2024, 1, 2)));

        let infinite_flow = vec![snap(1, 1000.0, 0.0), snap(3, 1100.0, f64::INFINITY)];
        let err = build_return_series(&infinite_flow, FlowWeight::default()).unwrap_err();
        assert!(matches!(err, TrackerError::NonFiniteAmount(date) if date == d(2024, 1, 3)));

        let first = vec![snap(1, f64::NEG_INFINITY, 0.0)];
        assert!(build_return_series(&first, FlowWeight::default()).is_err());
    }

    #[test]
    fn test_rebuilding_from_projection_is_identical() {
        let snapshots = vec![snap(1, 1000.0, 0.0), snap(2, 1600.0, 500.0), snap(3, 1500.0, -50.0)];
        let first = build_return_series(&snapshots, FlowWeight::default()).unwrap();
        let projected: Vec<Snapshot> = first
            .iter()
            .map(|r| Snapshot::new(r.date, r.total_assets, r.net_flow))
            .collect();
        let second = build_return_series(&projected, FlowWeight::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_flow_weight_rejects_out_of_range_values() {
        assert!(FlowWeight::new(0.0).is_ok());
        assert!(FlowWeight::new(1.0).is_ok());
        assert!(FlowWeight::new(1.5).is_err());
        assert!(FlowWeight::new(-0.1).is_err());
        assert!(FlowWeight::new(f64::NAN).is_err());
    }
}
