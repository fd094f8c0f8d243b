//! RaidLocale CLI - Command-line interface for timelineReplace maintenance

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "raidlocale")]
#[command(about = "RaidLocale: keeps raidboss timelineReplace tables in sync with game data", long_about = None)]
struct Cli {
    /// Log decisions per file and list unchanged files
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Run the RaidLocale CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins when set
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    cli.command.execute(cli.verbose)?;

    Ok(())
}
