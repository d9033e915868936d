use anyhow::{bail, Result};
use chrono::NaiveDate;
use colored::Colorize;
use tracing::info;

use super::{load_clean_snapshots, open_store};
use crate::cli::{formatters, SnapshotCommands};
use crate::db::{self, Snapshot};
use crate::error::TrackerError;
use crate::importers::validation::{parse_amount, parse_date};
use crate::utils::{format_amount, format_flow};

pub fn dispatch_snapshot(action: SnapshotCommands, json_output: bool) -> Result<()> {
    match action {
        SnapshotCommands::Add {
            date,
            total_assets,
            flow,
            note,
        } => dispatch_snapshot_add(&date, &total_assets, flow.as_deref(), note, json_output),
        SnapshotCommands::List => dispatch_snapshot_list(json_output),
        SnapshotCommands::Remove { date } => dispatch_snapshot_remove(&date, json_output),
    }
}

fn parse_date_arg(text: &str) -> Result<NaiveDate, TrackerError> {
    parse_date(text).ok_or_else(|| {
        TrackerError::ParseError(format!("invalid date '{}'. Use YYYY-MM-DD format.", text))
    })
}

/// Command-line amounts are rejected outright rather than coerced
fn parse_amount_arg(field: &str, text: &str) -> Result<f64, TrackerError> {
    parse_amount(text)
        .ok_or_else(|| TrackerError::ParseError(format!("invalid {} '{}'", field, text)))
}

fn dispatch_snapshot_add(
    date: &str,
    total_assets: &str,
    flow: Option<&str>,
    note: Option<String>,
    json_output: bool,
) -> Result<()> {
    let date = parse_date_arg(date)?;
    let total_assets = parse_amount_arg("total assets", total_assets)?;
    let net_flow = match flow {
        Some(text) => parse_amount_arg("flow", text)?,
        None => 0.0,
    };

    let mut snapshot = Snapshot::new(date, total_assets, net_flow);
    if let Some(note) = note {
        snapshot = snapshot.with_note(note);
    }

    let conn = open_store()?;
    let replaced = db::upsert_snapshot(&conn, &snapshot)?;
    info!("Saved snapshot for {} (replaced: {})", date, replaced);

    if json_output {
        let payload = serde_json::json!({
            "snapshot": snapshot,
            "replaced": replaced,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let verb = if replaced { "Replaced" } else { "Added" };
    println!(
        "{} {} snapshot {}: assets {}, flow {}",
        "✓".green().bold(),
        verb,
        date,
        format_amount(total_assets).cyan(),
        format_flow(net_flow)
    );
    if total_assets < 0.0 {
        println!(
            "{} Total assets are negative; recorded as entered",
            "⚠".yellow().bold()
        );
    }
    Ok(())
}

fn dispatch_snapshot_list(json_output: bool) -> Result<()> {
    let conn = open_store()?;
    let snapshots = load_clean_snapshots(&conn, json_output)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        return Ok(());
    }

    if snapshots.is_empty() {
        print!("{}", formatters::format_no_snapshots());
        return Ok(());
    }

    println!("\n{} Snapshots\n", "📒".cyan().bold());
    println!("{}", formatters::format_snapshot_table(&snapshots));
    let stored = db::count_snapshots(&conn)?;
    let unreadable = stored - snapshots.len() as i64;
    if unreadable > 0 {
        println!(
            "\nTotal: {} snapshot(s), {} stored row(s) with unreadable dates skipped",
            snapshots.len(),
            unreadable
        );
    } else {
        println!("\nTotal: {} snapshot(s)", snapshots.len());
    }
    Ok(())
}

fn dispatch_snapshot_remove(date: &str, json_output: bool) -> Result<()> {
    let date = parse_date_arg(date)?;
    let conn = open_store()?;

    if !db::delete_snapshot(&conn, date)? {
        bail!("No snapshot found for {}", date);
    }
    info!("Removed snapshot for {}", date);

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "removed": date }))?
        );
    } else {
        println!("{} Removed snapshot {}", "✓".green().bold(), date);
    }
    Ok(())
}
