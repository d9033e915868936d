//! Performance command dispatcher implementation

use anyhow::Result;
use chrono::Local;
use colored::Colorize;

use super::{load_clean_snapshots, open_store};
use crate::cli::formatters;
use crate::config::Config;
use crate::pricing::{self, YahooFeed};
use crate::reports::{self, Window};

pub async fn dispatch_performance(
    window: Option<&str>,
    requested_benchmarks: &[String],
    config: &Config,
    json_output: bool,
) -> Result<()> {
    let window = match window {
        Some(text) => text.parse::<Window>()?,
        None => config.default_window,
    };

    let conn = open_store()?;
    let snapshots = load_clean_snapshots(&conn, json_output)?;

    let mut benchmarks = config.resolve_benchmarks(requested_benchmarks);
    if pricing::is_offline() && !benchmarks.is_empty() {
        tracing::info!("Offline mode: skipping {} benchmark(s)", benchmarks.len());
        if !json_output {
            println!(
                "{} Offline mode - benchmarks skipped",
                "ℹ".blue().bold()
            );
        }
        benchmarks.clear();
    }

    let feed = YahooFeed::new()?;
    let today = Local::now().date_naive();
    let view =
        reports::build_performance_view(&snapshots, config, window, &benchmarks, &feed, today)
            .await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if snapshots.is_empty() {
        print!("{}", formatters::format_no_snapshots());
        return Ok(());
    }

    if view.is_empty() {
        println!(
            "{} No snapshots in window '{}'",
            "ℹ".blue().bold(),
            view.window
        );
        return Ok(());
    }

    print!("{}", formatters::format_performance_view(&view));
    Ok(())
}
