//! Death drops waiting for a grave collector.
//!
//! Removing an entry from the map is the completion step: whichever path
//! removes it (collector claim, fallback timeout, or a second death replacing
//! it) owns the items, so they are spawned or handed over exactly once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use soul_core::{InventorySnapshot, ItemStack, PlayerId};

use crate::api::Location;

#[derive(Clone, Debug, PartialEq)]
pub struct PendingDrop {
    pub id: u64,
    pub items: Vec<ItemStack>,
    pub retained: InventorySnapshot,
    pub location: Location,
}

#[derive(Debug, Default)]
pub struct PendingDrops {
    next_id: AtomicU64,
    entries: Mutex<HashMap<PlayerId, PendingDrop>>,
}

impl PendingDrops {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a drop and returns its id plus any unreleased drop it
    /// replaced, which the caller must release immediately.
    pub fn insert(
        &self,
        player: &PlayerId,
        items: Vec<ItemStack>,
        retained: InventorySnapshot,
        location: Location,
    ) -> (u64, Option<PendingDrop>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let drop = PendingDrop {
            id,
            items,
            retained,
            location,
        };
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        (id, entries.insert(player.clone(), drop))
    }

    /// Takes the player's pending drop, whatever its id.
    pub fn take(&self, player: &PlayerId) -> Option<PendingDrop> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(player)
    }

    /// Takes the drop only if it is still the one registered as `id`.
    pub fn take_if(&self, player: &PlayerId, id: u64) -> Option<PendingDrop> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(player) {
            Some(drop) if drop.id == id => entries.remove(player),
            _ => None,
        }
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(player)
    }
}
