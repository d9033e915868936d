//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::db::Snapshot;
use crate::importers::ValidationIssue;
use crate::pricing::BenchmarkPreset;
use crate::reports::{PerformanceView, PortfolioSummary, ReturnRecord};
use crate::utils::{colorize_pct, format_amount, format_flow, format_opt_pct, format_pct};

pub fn format_snapshot_table(snapshots: &[Snapshot]) -> String {
    #[derive(Tabled)]
    struct SnapshotRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Total Assets")]
        total_assets: String,
        #[tabled(rename = "Net Flow")]
        net_flow: String,
        #[tabled(rename = "Note")]
        note: String,
    }

    let rows: Vec<SnapshotRow> = snapshots
        .iter()
        .map(|s| SnapshotRow {
            date: s.date.format("%Y-%m-%d").to_string(),
            total_assets: format_amount(s.total_assets),
            net_flow: format_flow(s.net_flow),
            note: s.note.clone().unwrap_or_default(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..3), Alignment::right());
    table.to_string()
}

pub fn format_returns_table(series: &[ReturnRecord]) -> String {
    #[derive(Tabled)]
    struct ReturnRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Total Assets")]
        total_assets: String,
        #[tabled(rename = "Net Flow")]
        net_flow: String,
        #[tabled(rename = "Period Return")]
        period_return: String,
        #[tabled(rename = "Cumulative")]
        cumulative: String,
    }

    let rows: Vec<ReturnRow> = series
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let period_return = if i == 0 {
                "-".to_string()
            } else if r.is_flagged() {
                format!("{} {}", format_pct(0.0), "(flagged)".yellow())
            } else {
                colorize_pct(r.daily_return * 100.0).to_string()
            };
            ReturnRow {
                date: r.date.format("%Y-%m-%d").to_string(),
                total_assets: format_amount(r.total_assets),
                net_flow: format_flow(r.net_flow),
                period_return,
                cumulative: colorize_pct((r.cumulative_index - 1.0) * 100.0).to_string(),
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

pub fn format_performance_view(view: &PerformanceView) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} Performance - {}\n",
        "📈".cyan().bold(),
        view.window.label()
    ));
    match view.anchor_date {
        Some(anchor) => output.push_str(&format!(
            "  Baseline: {} (last snapshot before the window)\n\n",
            anchor
        )),
        None => output.push_str("  Baseline: first snapshot in the window\n\n"),
    }

    // Rows are built with dynamic benchmark columns, so use a builder
    let mut builder = tabled::builder::Builder::default();
    let mut header = vec![
        "Date".to_string(),
        "Total Assets".to_string(),
        "Net Flow".to_string(),
        "Portfolio".to_string(),
    ];
    header.extend(view.benchmarks.iter().map(|b| b.name.clone()));
    builder.push_record(header);

    for (i, row) in view.rows.iter().enumerate() {
        let mut record = vec![
            row.date.format("%Y-%m-%d").to_string(),
            format_amount(row.total_assets),
            format_flow(row.net_flow),
            colorize_pct(row.performance_pct).to_string(),
        ];
        record.extend(
            view.benchmarks
                .iter()
                .map(|b| format_opt_pct(b.values.get(i).copied().flatten())),
        );
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');

    if let Some(latest) = view.latest_pct() {
        output.push_str(&format!("\n{:<20} {}\n", "Window Return:".bold(), colorize_pct(latest)));
    }

    for failure in &view.benchmark_failures {
        output.push_str(&format!(
            "{} {} ({}) unavailable: {}\n",
            "⚠".yellow().bold(),
            failure.name,
            failure.ticker,
            failure.error
        ));
    }

    output
}

pub fn format_summary(summary: &PortfolioSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{} Portfolio Summary\n", "📊".cyan().bold()));
    output.push_str(&format!("{}", "━".repeat(50).bright_black()));
    output.push_str(&format!(
        "\n{:<24} {} → {} ({} snapshots)",
        "Period:".bold(),
        summary.first_date,
        summary.latest_date,
        summary.snapshot_count
    ));
    output.push_str(&format!(
        "\n{:<24} {}",
        "Starting Assets:".bold(),
        format_amount(summary.starting_assets)
    ));
    output.push_str(&format!(
        "\n{:<24} {}",
        "Latest Assets:".bold(),
        format_amount(summary.latest_assets)
    ));
    output.push_str(&format!(
        "\n{:<24} {}",
        "Net Contributions:".bold(),
        format_amount(summary.net_contributions)
    ));

    let gain = format_amount(summary.investment_gain);
    let gain_colored = if summary.investment_gain >= 0.0 {
        gain.green()
    } else {
        gain.red()
    };
    output.push_str(&format!("\n{:<24} {}", "Investment Gain:".bold(), gain_colored));
    output.push_str(&format!(
        "\n{:<24} {}\n",
        "Cumulative Return:".bold(),
        colorize_pct(summary.cumulative_return_pct)
    ));

    if summary.flagged_periods > 0 {
        output.push_str(&format!(
            "{} {} period(s) had a non-positive capital base and count as 0%\n",
            "⚠".yellow().bold(),
            summary.flagged_periods
        ));
    }
    output
}

pub fn format_benchmark_table(presets: &[BenchmarkPreset], defaults: &[String]) -> String {
    #[derive(Tabled)]
    struct PresetRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Ticker")]
        ticker: String,
        #[tabled(rename = "Default")]
        default: String,
    }

    let rows: Vec<PresetRow> = presets
        .iter()
        .map(|p| PresetRow {
            name: p.name.clone(),
            ticker: p.ticker.clone(),
            default: if defaults.iter().any(|d| p.matches(d)) {
                "✓".to_string()
            } else {
                String::new()
            },
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}

pub fn format_issues(issues: &[ValidationIssue]) -> String {
    let mut output = String::new();
    for issue in issues {
        output.push_str(&format!(
            "  {} row {}: {} '{}': {}\n",
            "⚠".yellow(),
            issue.row,
            issue.field,
            issue.value,
            issue.reason
        ));
    }
    output
}

/// Format empty store message
pub fn format_no_snapshots() -> String {
    format!(
        "{} No snapshots found\nAdd one using: {} snapshot add <date> <total_assets>\n",
        "ℹ".blue().bold(),
        "networth".bold()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{build_return_series, FlowWeight};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_no_snapshots_message() {
        let msg = format_no_snapshots();
        assert!(msg.contains("No snapshots found"));
        assert!(msg.contains("snapshot add"));
    }

    #[test]
    fn test_returns_table_marks_flagged_periods() {
        colored::control::set_override(false);
        let snapshots = vec![Snapshot::new(d(1), 0.0, 0.0), Snapshot::new(d(2), 100.0, 0.0)];
        let series = build_return_series(&snapshots, FlowWeight::SIMPLE_DIETZ).unwrap();
        let table = format_returns_table(&series);
        assert!(table.contains("2024-01-02"));
        assert!(table.contains("(flagged)"));
    }

    #[test]
    fn test_snapshot_table_shows_notes() {
        let snapshots = vec![Snapshot::new(d(1), 1500.5, 250.0).with_note("bonus")];
        let table = format_snapshot_table(&snapshots);
        assert!(table.contains("1,500.50"));
        assert!(table.contains("+250.00"));
        assert!(table.contains("bonus"));
    }
}
