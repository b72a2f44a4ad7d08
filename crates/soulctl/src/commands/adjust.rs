//! Edit a player's counters

use anyhow::Result;
use clap::Parser;

use crate::config::CliConfig;
use crate::offline;

/// Which counter write to perform.
#[derive(Clone, Copy, Debug)]
pub enum AdjustKind {
    Set,
    Give,
    Take,
    SetMax,
    AddMax,
    ReduceMax,
}

impl AdjustKind {
    fn subcommand(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Give => "give",
            Self::Take => "take",
            Self::SetMax => "setmax",
            Self::AddMax => "addmax",
            Self::ReduceMax => "reducemax",
        }
    }
}

/// Arguments shared by every counter write
#[derive(Parser)]
pub struct Adjust {
    /// Player id as stored in playerdata.json
    #[arg(value_name = "PLAYER")]
    player: String,

    /// Amount (validated the same way the in-game command validates it)
    #[arg(value_name = "AMOUNT", allow_hyphen_values = true)]
    amount: String,

    /// Create a fresh record if the player has none yet
    #[arg(long)]
    create: bool,
}

impl Adjust {
    pub async fn execute(self, kind: AdjustKind, config: &CliConfig) -> Result<()> {
        tracing::debug!("Running {} for {}", kind.subcommand(), self.player);
        let runtime = offline::open(config, self.create)?;
        let args = [kind.subcommand().to_owned(), self.player, self.amount];
        super::run_admin(runtime, &args).await
    }
}
