//! Offline administration for soul point records.
//!
//! Operates on the record file the server writes, with the same rules and
//! command grammar the server uses. Stop the server (or accept that it will
//! overwrite changes on its next save) before editing records.
//!
//! Run with: `soulctl <command>`

mod commands;
mod config;
mod dirs;
mod offline;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{Adjust, AdjustKind, Check, List, Rates, Validate};

use crate::config::CliConfig;

/// Soul point administration
#[derive(Parser)]
#[command(name = "soulctl")]
#[command(about = "Inspect and edit soul point records", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding playerdata.json (defaults to SOUL_DATA_DIR, then platform location)
    #[arg(short, long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Rules file (defaults to SOUL_CONFIG, then <config dir>/soul.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Show a player's soul points, penalties and recovery timers
    Check(Check),

    /// List every stored player
    List(List),

    /// Set a player's soul points
    Set(Adjust),

    /// Give soul points to a player
    Give(Adjust),

    /// Take soul points from a player
    Take(Adjust),

    /// Set a player's personal maximum
    SetMax(Adjust),

    /// Raise a player's personal maximum
    AddMax(Adjust),

    /// Lower a player's personal maximum
    ReduceMax(Adjust),

    /// Show the penalties that apply at each level
    Rates(Rates),

    /// Load and validate the rules file
    Validate(Validate),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for SOUL_DATA_DIR and other env vars)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = CliConfig::resolve(cli.data_dir, cli.config);
    tracing::debug!("Using data directory {}", config.data_dir.display());

    match cli.command {
        Command::Check(cmd) => cmd.execute(&config).await,
        Command::List(cmd) => cmd.execute(&config).await,
        Command::Set(cmd) => cmd.execute(AdjustKind::Set, &config).await,
        Command::Give(cmd) => cmd.execute(AdjustKind::Give, &config).await,
        Command::Take(cmd) => cmd.execute(AdjustKind::Take, &config).await,
        Command::SetMax(cmd) => cmd.execute(AdjustKind::SetMax, &config).await,
        Command::AddMax(cmd) => cmd.execute(AdjustKind::AddMax, &config).await,
        Command::ReduceMax(cmd) => cmd.execute(AdjustKind::ReduceMax, &config).await,
        Command::Rates(cmd) => cmd.execute(&config),
        Command::Validate(cmd) => cmd.execute(&config),
    }
}

/// Setup logging to stderr so command output stays clean on stdout
fn setup_logging(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
