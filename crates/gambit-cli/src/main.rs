//! Command line tool for Gambit rule tables.
//!
//! Run with: `gambit <command>`

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Inspect, Validate};
use tracing_subscriber::EnvFilter;

/// Rule table validation and inspection
#[derive(Parser)]
#[command(name = "gambit")]
#[command(about = "Validate and inspect Gambit rule tables", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Load and validate a rule dump, optionally writing back the surviving rows
    Validate(Validate),

    /// Print the decoded rules bound for one owner
    Inspect(Inspect),
}

/// Installs the fmt subscriber. `RUST_LOG` overrides the configured filter.
fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Validate(cmd) => {
            let config = cmd.load_config()?;
            init_logging(&config.log.filter);
            cmd.execute(&config)
        }
        Command::Inspect(cmd) => {
            init_logging("warn");
            cmd.execute()
        }
    }
}
