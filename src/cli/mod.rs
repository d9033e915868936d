use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "networth")]
#[command(version, about = "Net-worth tracker with flow-adjusted returns")]
#[command(
    long_about = "Record dated net-worth snapshots with their deposits and withdrawals, and see how the money itself performed: flow-adjusted returns, windowed performance, and comparison against market benchmarks."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage net-worth snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotCommands,
    },

    /// Import snapshots from a CSV export (date, total_assets, net_flow, note)
    Import {
        /// Path to the CSV file
        file: String,

        /// Preview only, don't save to database
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Show the flow-adjusted return of every period
    Returns,

    /// Show performance over a window, compared against benchmarks
    Performance {
        /// Window: all, ytd, 1y, 3m, or a start date (YYYY-MM-DD)
        #[arg(short, long)]
        window: Option<String>,

        /// Benchmark name or ticker (repeatable; "none" to disable)
        #[arg(short, long = "benchmark")]
        benchmarks: Vec<String>,
    },

    /// Show a whole-history summary
    Summary,

    /// List the benchmark presets
    Benchmarks,

    /// Show the effective configuration
    Config,
}

#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// Add or replace the snapshot for a date
    Add {
        /// Snapshot date (YYYY-MM-DD)
        date: String,

        /// Total assets at that date
        #[arg(allow_hyphen_values = true)]
        total_assets: String,

        /// Net deposits (positive) or withdrawals (negative) since the previous snapshot
        #[arg(short, long, allow_hyphen_values = true)]
        flow: Option<String>,

        /// Free-form note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List all snapshots
    List,

    /// Remove the snapshot for a date
    Remove {
        /// Snapshot date (YYYY-MM-DD)
        date: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_snapshot_add_with_negative_flow() {
        let cli = Cli::try_parse_from([
            "networth", "snapshot", "add", "2024-03-01", "1500", "--flow", "-200",
        ])
        .unwrap();
        match cli.command {
            Commands::Snapshot {
                action: SnapshotCommands::Add { date, total_assets, flow, note },
            } => {
                assert_eq!(date, "2024-03-01");
                assert_eq!(total_assets, "1500");
                assert_eq!(flow.as_deref(), Some("-200"));
                assert_eq!(note, None);
            }
            _ => panic!("expected snapshot add"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "networth", "performance", "-w", "ytd", "-b", "SPY", "-b", "QQQ", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Performance { window, benchmarks } => {
                assert_eq!(window.as_deref(), Some("ytd"));
                assert_eq!(benchmarks, vec!["SPY", "QQQ"]);
            }
            _ => panic!("expected performance"),
        }
    }
}
