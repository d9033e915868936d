//! Command dispatcher that routes parsed clap commands to their handlers.

mod imports;
mod performance;
mod snapshots;

use anyhow::Result;
use colored::Colorize;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::{formatters, Commands};
use crate::config::Config;
use crate::db::{self, Snapshot};
use crate::importers::validate_snapshots;
use crate::reports;

/// Route a parsed command to its handler
pub async fn dispatch_command(command: Commands, config: &Config, json_output: bool) -> Result<()> {
    match command {
        Commands::Snapshot { action } => snapshots::dispatch_snapshot(action, json_output),
        Commands::Import { file, dry_run } => imports::dispatch_import(&file, dry_run, json_output),
        Commands::Returns => dispatch_returns(config, json_output),
        Commands::Performance { window, benchmarks } => {
            performance::dispatch_performance(window.as_deref(), &benchmarks, config, json_output)
                .await
        }
        Commands::Summary => dispatch_summary(config, json_output),
        Commands::Benchmarks => dispatch_benchmarks(config, json_output),
        Commands::Config => dispatch_config(config, json_output),
    }
}

/// Open the default store, creating it on first use
pub(crate) fn open_store() -> Result<Connection> {
    db::init_database(None)?;
    db::open_db(None)
}

/// Load stored snapshots through validation. Coerced values are logged and
/// counted on stderr; they never stop a report.
pub(crate) fn load_clean_snapshots(conn: &Connection, json_output: bool) -> Result<Vec<Snapshot>> {
    let raw = db::load_snapshots(conn)?;
    let result = validate_snapshots(&raw, 1);

    if result.has_issues() {
        warn!("{} stored value(s) needed coercion", result.issues.len());
        if !json_output {
            eprintln!(
                "{} {} stored value(s) could not be read cleanly:",
                "⚠".yellow().bold(),
                result.issues.len()
            );
            eprint!("{}", formatters::format_issues(&result.issues));
        }
    }

    info!("Loaded {} snapshots", result.snapshots.len());
    Ok(result.snapshots)
}

fn dispatch_returns(config: &Config, json_output: bool) -> Result<()> {
    let conn = open_store()?;
    let snapshots = load_clean_snapshots(&conn, json_output)?;
    let series = reports::build_return_series(&snapshots, config.flow_weight)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    if series.is_empty() {
        print!("{}", formatters::format_no_snapshots());
        return Ok(());
    }

    println!(
        "\n{} Flow-adjusted returns (flow weight {})\n",
        "📈".cyan().bold(),
        config.flow_weight.value()
    );
    println!("{}", formatters::format_returns_table(&series));
    Ok(())
}

fn dispatch_summary(config: &Config, json_output: bool) -> Result<()> {
    let conn = open_store()?;
    let snapshots = load_clean_snapshots(&conn, json_output)?;
    let series = reports::build_return_series(&snapshots, config.flow_weight)?;
    let summary = reports::summarize(&series);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    match summary {
        Some(summary) => print!("{}", formatters::format_summary(&summary)),
        None => print!("{}", formatters::format_no_snapshots()),
    }
    Ok(())
}

fn dispatch_benchmarks(config: &Config, json_output: bool) -> Result<()> {
    if json_output {
        let payload = serde_json::json!({
            "benchmarks": config.benchmarks,
            "default_benchmarks": config.default_benchmarks,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("\n{} Benchmark presets\n", "📊".cyan().bold());
    println!(
        "{}",
        formatters::format_benchmark_table(&config.benchmarks, &config.default_benchmarks)
    );
    Ok(())
}

fn dispatch_config(config: &Config, json_output: bool) -> Result<()> {
    let path = Config::default_path();

    if json_output {
        let payload = serde_json::json!({
            "path": path,
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match &path {
        Some(p) if p.exists() => println!("# {}", p.display()),
        Some(p) => println!("# {} (not present, showing defaults)", p.display()),
        None => println!("# no config directory; showing defaults"),
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
