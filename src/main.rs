use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use networth::cli::Cli;
use networth::config::Config;
use networth::dispatcher::dispatch_command;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays parseable; RUST_LOG overrides
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load()?;
    dispatch_command(cli.command, &config, cli.json).await
}
