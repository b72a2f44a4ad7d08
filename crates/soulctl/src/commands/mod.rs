//! Command implementations for soulctl
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod adjust;
mod check;
mod list;
mod rates;
mod validate;

pub use adjust::{Adjust, AdjustKind};
pub use check::Check;
pub use list::List;
pub use rates::Rates;
pub use validate::Validate;

use anyhow::Result;
use console::style;
use soul_core::SoulError;
use soul_runtime::{AdminCommand, SoulRuntime};

/// Runs an admin command against an opened runtime, prints the reply and
/// saves on the way out, also when the command failed.
async fn run_admin(runtime: SoulRuntime, args: &[String]) -> Result<()> {
    let outcome =
        AdminCommand::parse(args).and_then(|command| command.execute(&runtime.handle(), None));
    runtime.shutdown().await?;

    match outcome {
        Ok(reply) => {
            for line in reply.lines {
                println!("{}", line);
            }
            Ok(())
        }
        Err(err) => {
            tracing::debug!(
                "Admin command failed [{}, {}]",
                err.error_code(),
                err.severity().as_str()
            );
            if err.severity().is_recoverable() {
                // Disabled system: report it but exit cleanly.
                eprintln!("{} {}", style("!").yellow().bold(), err);
                return Ok(());
            }
            eprintln!("{} {}", style("✗").red().bold(), err);
            Err(err.into())
        }
    }
}
