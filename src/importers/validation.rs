//! Snapshot validation
//!
//! Converts stored or imported rows into clean [`Snapshot`]s before they reach
//! the return engine. Bad values are coerced to a safe default (0.0) rather
//! than rejected, and every coercion is reported as a [`ValidationIssue`] so
//! the caller can warn about it. Only an unreadable date drops a row, since
//! the date is the row's identity.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

use crate::db::{RawSnapshot, Snapshot};

/// A data-quality problem found in one row
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Row number in the source (1-indexed for user display)
    pub row: usize,
    /// Field that has the issue ("date", "total_assets", "net_flow")
    pub field: String,
    /// The problematic value as found
    pub value: String,
    /// What was done about it
    pub reason: String,
}

impl ValidationIssue {
    pub fn new(
        row: usize,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            row,
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Clean snapshots in ascending date order plus everything that was coerced
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub snapshots: Vec<Snapshot>,
    /// What to persist for each entry of `snapshots`: amounts that parsed are
    /// written in canonical form, amounts that did not keep the text as
    /// entered so the issue is reported again on every load
    pub stored: Vec<RawSnapshot>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Count issues by field for summary reporting
    pub fn issue_summary(&self) -> BTreeMap<String, usize> {
        let mut summary = BTreeMap::new();
        for issue in &self.issues {
            *summary.entry(issue.field.clone()).or_insert(0) += 1;
        }
        summary
    }
}

/// Validate raw rows into clean snapshots.
///
/// Rows are numbered in input order starting at `first_row`. When two rows
/// share a date the later one wins.
pub fn validate_snapshots(raw: &[RawSnapshot], first_row: usize) -> ValidationResult {
    validate_rows(raw.iter().enumerate().map(|(idx, row)| (first_row + idx, row)))
}

/// Validate rows that already carry their source row number (a file line)
pub fn validate_rows<'a>(
    rows: impl IntoIterator<Item = (usize, &'a RawSnapshot)>,
) -> ValidationResult {
    let mut by_date: BTreeMap<NaiveDate, (Snapshot, RawSnapshot)> = BTreeMap::new();
    let mut issues = Vec::new();

    for (row_num, row) in rows {
        let Some(date) = parse_date(&row.date) else {
            issues.push(ValidationIssue::new(
                row_num,
                "date",
                &row.date,
                "unreadable date; row skipped",
            ));
            continue;
        };

        let (total_assets, stored_assets) = match row.total_assets.as_deref().map(str::trim) {
            None | Some("") => {
                issues.push(ValidationIssue::new(
                    row_num,
                    "total_assets",
                    "",
                    "missing total assets; treated as 0",
                ));
                (0.0, None)
            }
            Some(text) => match parse_amount(text) {
                Some(value) if value < 0.0 => {
                    issues.push(ValidationIssue::new(
                        row_num,
                        "total_assets",
                        text,
                        "negative total assets kept as entered",
                    ));
                    (value, Some(value.to_string()))
                }
                Some(value) => (value, Some(value.to_string())),
                None => {
                    issues.push(ValidationIssue::new(
                        row_num,
                        "total_assets",
                        text,
                        "not a number; treated as 0",
                    ));
                    (0.0, Some(text.to_string()))
                }
            },
        };

        let (net_flow, stored_flow) = match row.net_flow.as_deref().map(str::trim) {
            None | Some("") => (0.0, None),
            Some(text) => match parse_amount(text) {
                Some(value) => (value, Some(value.to_string())),
                None => {
                    issues.push(ValidationIssue::new(
                        row_num,
                        "net_flow",
                        text,
                        "not a number; treated as 0",
                    ));
                    (0.0, Some(text.to_string()))
                }
            },
        };

        let mut snapshot = Snapshot::new(date, total_assets, net_flow);
        if let Some(note) = &row.note {
            snapshot = snapshot.with_note(note.trim());
        }
        let stored = RawSnapshot {
            date: date.format("%Y-%m-%d").to_string(),
            total_assets: stored_assets,
            net_flow: stored_flow,
            note: snapshot.note.clone(),
        };

        if by_date.insert(date, (snapshot, stored)).is_some() {
            issues.push(ValidationIssue::new(
                row_num,
                "date",
                &row.date,
                "duplicate date; this row replaces the earlier one",
            ));
        }
    }

    for issue in &issues {
        warn!(
            "Row {}: {} '{}': {}",
            issue.row, issue.field, issue.value, issue.reason
        );
    }

    let (snapshots, stored) = by_date.into_values().unzip();
    ValidationResult {
        snapshots,
        stored,
        issues,
    }
}

/// Parse a calendar date as spreadsheets tend to export it.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, and either followed by a time part.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let date_part = text.trim().split([' ', 'T']).next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y/%m/%d"))
        .ok()
}

/// Parse a money amount.
///
/// Tolerates thousands separators, a currency marker after an optional sign
/// (`-$1,000`, `NT$ 2,500`), and accounting negatives such as `(500)`. Text
/// like `NaN` or `inf` is not a number. The digits are read straight into an
/// `f64`, so the text written by `f64::to_string` reads back bit for bit.
pub fn parse_amount(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let (mut negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
    {
        Some(inner) => (true, inner.trim()),
        None => (false, trimmed),
    };

    let (signed, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body.strip_prefix('+').unwrap_or(body)),
    };
    negative ^= signed;

    let cleaned: String = body
        .trim_start()
        .trim_start_matches(|c: char| {
            c.is_ascii_uppercase() || matches!(c, '$' | '€' | '£' | '¥')
        })
        .chars()
        .filter(|c| *c != ',' && *c != '_' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    // A sign on both sides of the currency marker is ambiguous
    if signed && cleaned.starts_with(['-', '+']) {
        return None;
    }

    let value = cleaned.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if negative { -value } else { value })
}
