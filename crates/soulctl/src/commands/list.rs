//! List stored players

use anyhow::Result;
use clap::Parser;
use console::style;
use soul_runtime::admin::progress_bar;

use crate::config::CliConfig;
use crate::offline;

/// List every stored player
#[derive(Parser)]
pub struct List {
    /// Print all records as a JSON object keyed by player id
    #[arg(long)]
    json: bool,
}

impl List {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let runtime = offline::open(config, false)?;
        let handle = runtime.handle();
        let max = handle.config().max;
        let records = handle.store().snapshot();
        runtime.shutdown().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        if records.is_empty() {
            println!("{}", style("No players stored yet").dim());
            return Ok(());
        }

        println!(
            "{} {}",
            style("Players").bold(),
            style(format!("({})", records.len())).dim()
        );
        for (player, record) in &records {
            println!(
                "  {:<20} {} {}/{} {}",
                style(player).cyan(),
                progress_bar(record.current, max),
                record.current,
                max,
                style(format!("max {}", record.personal_max)).dim()
            );
        }
        Ok(())
    }
}
