//! Contracts the embedding game server implements.

use soul_core::{HealthAttribute, InventorySnapshot, ItemStack, PlayerId};

/// Permission that exempts a player from every penalty.
pub const BYPASS_PERMISSION: &str = "soulpoints.bypass";

/// Position in a world.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }
}

/// Player, inventory and world primitives of the game server.
///
/// Every call is made from the thread that delivered the triggering event or
/// from a task the [`TaskScheduler`](crate::TaskScheduler) runs; implementors
/// marshal to their main thread if they need to.
pub trait GameHost: Send + Sync {
    fn is_online(&self, player: &PlayerId) -> bool;

    fn online_players(&self) -> Vec<PlayerId>;

    fn player_name(&self, player: &PlayerId) -> Option<String>;

    /// Looks up an online or known player by name.
    fn resolve_player(&self, name: &str) -> Option<PlayerId>;

    fn has_permission(&self, player: &PlayerId, permission: &str) -> bool;

    fn inventory(&self, player: &PlayerId) -> InventorySnapshot;

    fn clear_inventory(&self, player: &PlayerId);

    /// Places every non-empty slot of `inventory` into the player's inventory.
    fn restore_inventory(&self, player: &PlayerId, inventory: &InventorySnapshot);

    fn spawn_items(&self, location: &Location, items: &[ItemStack]);

    /// Runs `f` against the player's max-health attribute. Returns `false`
    /// when the player or the attribute is unavailable.
    fn with_max_health(&self, player: &PlayerId, f: &mut dyn FnMut(&mut dyn HealthAttribute))
    -> bool;

    /// Whether a grave/corpse plugin will claim pending death drops.
    fn grave_collector_present(&self) -> bool {
        false
    }
}

/// Executes server commands with console privileges.
pub trait CommandDispatcher: Send + Sync {
    fn dispatch(&self, command: &str);
}
