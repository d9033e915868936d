use anyhow::{Context, Result};
use colored::Colorize;
use tabled::Tabled;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table,
};

use crate::cli::formatters;
use crate::db;
use crate::importers;
use crate::utils::{format_amount, format_flow};

pub fn dispatch_import(path: &str, dry_run: bool, json_output: bool) -> Result<()> {
    tracing::info!("Importing from: {}", path);

    let result = importers::import_file(path)
        .with_context(|| format!("Error reading import file {}", path))?;

    if !json_output {
        println!(
            "\n{} Found {} snapshots\n",
            "✓".green().bold(),
            result.snapshots.len()
        );

        #[derive(Tabled)]
        struct SnapshotPreview {
            #[tabled(rename = "Date")]
            date: String,
            #[tabled(rename = "Total Assets")]
            total_assets: String,
            #[tabled(rename = "Net Flow")]
            net_flow: String,
        }

        let preview: Vec<SnapshotPreview> = result
            .snapshots
            .iter()
            .take(10)
            .map(|s| SnapshotPreview {
                date: s.date.format("%Y-%m-%d").to_string(),
                total_assets: format_amount(s.total_assets),
                net_flow: format_flow(s.net_flow),
            })
            .collect();

        if !preview.is_empty() {
            let table = Table::new(preview)
                .with(Style::rounded())
                .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
                .to_string();
            println!("{}", table);
            if result.snapshots.len() > 10 {
                println!("  ... and {} more", result.snapshots.len() - 10);
            }
        }

        if result.has_issues() {
            println!(
                "\n{} {} value(s) were coerced:",
                "⚠".yellow().bold(),
                result.issues.len()
            );
            print!("{}", formatters::format_issues(&result.issues));
        }
    }

    if dry_run {
        if json_output {
            let payload = serde_json::json!({
                "dry_run": true,
                "found": result.snapshots.len(),
                "issues": result.issues.len(),
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        } else {
            println!("\n{} Dry run - no changes saved", "ℹ".blue().bold());
        }
        return Ok(());
    }

    db::init_database(None)?;
    let mut conn = db::open_db(None)?;
    let replaced = db::upsert_raw_snapshots(&mut conn, &result.stored)?;
    let added = result.snapshots.len() - replaced;

    if json_output {
        let payload = serde_json::json!({
            "dry_run": false,
            "found": result.snapshots.len(),
            "added": added,
            "replaced": replaced,
            "issues": result.issues.len(),
            "issues_by_field": result.issue_summary(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("\n{} Import complete!", "✓".green().bold());
    println!("  Added: {}", added.to_string().green());
    if replaced > 0 {
        println!("  Replaced (same date): {}", replaced.to_string().yellow());
    }
    Ok(())
}
