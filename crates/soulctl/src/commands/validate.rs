//! Check a rules file without starting anything

use anyhow::Result;
use clap::Parser;
use console::style;

use crate::config::CliConfig;
use crate::offline;

/// Load and validate the rules file
#[derive(Parser)]
pub struct Validate {}

impl Validate {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let rules = offline::load_rules(config)?;
        rules.validate()?;

        let source = config
            .config_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in defaults".to_owned());
        println!("{} {}", style("✓").green().bold(), style(source).cyan());
        println!("  Enabled:        {}", rules.enabled);
        println!("  Points:         {} starting, {} max", rules.starting, rules.max);
        println!(
            "  Recovery:       {:?} every {}s",
            rules.recovery.mode, rules.recovery.interval_seconds
        );
        println!(
            "  Max points:     {} (-{} per kill)",
            if rules.max_points.enabled { "on" } else { "off" },
            rules.max_points.reduction_per_kill
        );
        println!("  Penalty tiers:  {}", rules.penalties.tiers.len());
        Ok(())
    }
}
