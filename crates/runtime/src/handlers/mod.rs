//! Reactions to host events.
//!
//! Each handler is a stateless unit struct; [`SoulHandle`] exposes one entry
//! point per host event that delegates to it.

mod death;
mod kill;
mod respawn;
mod session;

pub use death::{DeathEvent, DeathHandler};
pub use kill::KillHandler;
pub use respawn::{InventoryClose, InventoryView, RespawnHandler};
pub use session::SessionHandler;

use soul_core::{CounterGrant, PlayerId};

use crate::api::SoulHandle;
use crate::events::{CounterChange, DeathReport};

impl SoulHandle {
    pub fn on_death(&self, event: &mut DeathEvent) -> Option<DeathReport> {
        DeathHandler.handle(self, event)
    }

    pub fn on_player_kill(&self, victim: &PlayerId, killer: &PlayerId) -> Option<CounterChange> {
        KillHandler.handle(self, victim, killer)
    }

    pub fn on_inventory_close(&self, event: &InventoryClose) -> bool {
        RespawnHandler.handle(self, event)
    }

    pub fn on_join(&self, player: &PlayerId) -> Vec<CounterGrant> {
        SessionHandler.join(self, player)
    }

    pub fn on_quit(&self, player: &PlayerId) -> Vec<CounterGrant> {
        SessionHandler.quit(self, player)
    }

    pub fn sweep(&self) -> usize {
        SessionHandler.sweep(self)
    }
}
