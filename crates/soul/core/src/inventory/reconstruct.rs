use std::collections::BTreeMap;

use super::{InventorySnapshot, ItemEntry, ItemKey, ItemStack, SlotCategory};

/// Rebuilds an inventory from retained units, one stack per origin slot.
pub fn reconstruct(retained: &[ItemEntry]) -> InventorySnapshot {
    let mut groups: BTreeMap<(SlotCategory, usize), ItemStack> = BTreeMap::new();
    for entry in retained {
        groups
            .entry((entry.category, entry.slot))
            .and_modify(|stack| stack.amount = stack.amount.saturating_add(1))
            .or_insert_with(|| ItemStack {
                item: entry.item.clone(),
                amount: 1,
            });
    }

    let mut inventory = InventorySnapshot::empty();
    for ((category, slot), stack) in groups {
        match category {
            SlotCategory::Body | SlotCategory::Hotbar => {
                if let Some(cell) = inventory.storage.get_mut(slot) {
                    *cell = Some(stack);
                }
            }
            SlotCategory::Armor(piece) => inventory.armor[piece.index()] = Some(stack),
            SlotCategory::Offhand => inventory.offhand = Some(stack),
        }
    }
    inventory
}

/// Units per item kind.
pub fn tally(entries: &[ItemEntry]) -> BTreeMap<ItemKey, u32> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.item.clone()).or_insert(0) += 1;
    }
    counts
}

/// Collapses units into as few stacks as possible for spawning in the world.
pub fn merge_stacks(entries: &[ItemEntry]) -> Vec<ItemStack> {
    let mut stacks = Vec::new();
    for (item, mut count) in tally(entries) {
        while count > 0 {
            let amount = count.min(u32::from(u16::MAX)) as u16;
            stacks.push(ItemStack {
                item: item.clone(),
                amount,
            });
            count -= u32::from(amount);
        }
    }
    stacks
}
