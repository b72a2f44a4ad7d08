//! Max-health refresh after respawn.
//!
//! Hosts reset attributes on respawn. Closing the player's own inventory view
//! is the first reliable signal that the player is back in the world, so the
//! modifier is re-applied one tick later.

use soul_core::PlayerId;

use crate::api::SoulHandle;

/// Which inventory view the player closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InventoryView {
    /// The player's own inventory with its crafting grid.
    PlayerCrafting,
    /// Any container or other screen.
    Other,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InventoryClose {
    pub player: PlayerId,
    pub view: InventoryView,
    pub dead: bool,
    pub health: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct RespawnHandler;

impl RespawnHandler {
    /// Schedules a refresh if the player closed their own inventory while
    /// alive. Returns whether a refresh was scheduled.
    pub fn handle(&self, soul: &SoulHandle, event: &InventoryClose) -> bool {
        if !soul.config().enabled
            || event.view != InventoryView::PlayerCrafting
            || event.dead
            || event.health <= 0.0
        {
            return false;
        }

        let player = event.player.clone();
        soul.run_later(soul.settings().respawn_refresh_delay, move |soul| {
            if soul.host().is_online(&player) {
                soul.refresh_max_health(&player);
            }
        });
        true
    }
}
