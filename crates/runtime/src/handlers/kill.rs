//! Handler for player-versus-player kills.

use soul_core::PlayerId;

use crate::api::{BYPASS_PERMISSION, SoulHandle};
use crate::events::{ChangeReason, CounterChange};

/// Handler that shrinks a killer's personal maximum.
#[derive(Debug, Clone, Copy)]
pub struct KillHandler;

impl KillHandler {
    /// Reduces the killer's personal maximum by the configured amount.
    ///
    /// Self-kills, bypassing killers and a disabled personal maximum are
    /// ignored. Points above the new maximum are pulled down with it.
    pub fn handle(
        &self,
        soul: &SoulHandle,
        victim: &PlayerId,
        killer: &PlayerId,
    ) -> Option<CounterChange> {
        let config = soul.config();
        if !config.enabled || !config.max_points.enabled || victim == killer {
            return None;
        }
        if soul.host().has_permission(killer, BYPASS_PERMISSION) {
            tracing::debug!("{} bypasses the kill penalty", killer);
            return None;
        }

        let reduction = config.max_points.reduction_per_kill;
        if reduction == 0 {
            return None;
        }
        let change = soul.reduce_personal_max(killer, reduction, ChangeReason::PvpKill)?;
        tracing::info!(
            "{} killed {}: personal max {} -> {}",
            killer,
            victim,
            change.old,
            change.new
        );
        Some(change)
    }
}
