//! Show one player's standing
//!
//! Prints the same report the in-game check command gives, or the raw
//! record as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use soul_core::PlayerId;

use crate::config::CliConfig;
use crate::offline;

/// Show a player's soul points, penalties and recovery timers
#[derive(Parser)]
pub struct Check {
    /// Player id as stored in playerdata.json
    #[arg(value_name = "PLAYER")]
    player: String,

    /// Print the stored record as JSON
    #[arg(long)]
    json: bool,
}

impl Check {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let runtime = offline::open(config, false)?;

        if self.json {
            let record = runtime.handle().record(&PlayerId::new(&self.player));
            runtime.shutdown().await?;
            let record = record.with_context(|| format!("Player not found: {}", self.player))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            return Ok(());
        }

        super::run_admin(runtime, &["check".to_owned(), self.player]).await
    }
}
