//! Print the penalty table as it resolves per level

use anyhow::{Result, bail};
use clap::Parser;
use soul_runtime::admin::describe_rates;

use crate::config::CliConfig;
use crate::offline;

/// Show the penalties that apply at each level
#[derive(Parser)]
pub struct Rates {
    /// Show a single level instead of the whole table
    #[arg(value_name = "LEVEL")]
    level: Option<u32>,
}

impl Rates {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let rules = offline::load_rules(config)?;
        let levels: Vec<u32> = match self.level {
            Some(level) if level > rules.max => {
                bail!("Level must be between 0 and {}", rules.max)
            }
            Some(level) => vec![level],
            None => (0..=rules.max).rev().collect(),
        };

        for level in levels {
            let params = rules.penalties.resolve(level, rules.max);
            println!("{}", describe_rates(level, &params));
        }
        Ok(())
    }
}
