//! Carried-inventory model and the death partition engine.
//!
//! Layout follows the host's player inventory: 36 storage slots (0..=8 are the
//! hotbar, 9..=35 the body), four armor slots and one off-hand slot.
mod partition;
mod reconstruct;

use core::fmt;

pub use partition::{Partition, drop_count, partition};
pub use reconstruct::{merge_stacks, reconstruct, tally};

/// Opaque identity of an item kind, including any host metadata that makes
/// two units non-stackable.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ItemKey(pub String);

impl ItemKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemStack {
    pub item: ItemKey,
    pub amount: u16,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, amount: u16) -> Self {
        Self {
            item: ItemKey::new(item),
            amount,
        }
    }
}

/// Armor slot, in host armor-array order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ArmorPiece {
    Boots,
    Leggings,
    Chestplate,
    Helmet,
}

impl ArmorPiece {
    pub const fn index(self) -> usize {
        match self {
            Self::Boots => 0,
            Self::Leggings => 1,
            Self::Chestplate => 2,
            Self::Helmet => 3,
        }
    }
}

/// Where a unit came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SlotCategory {
    Body,
    Hotbar,
    Armor(ArmorPiece),
    Offhand,
}

/// One unit of a carried stack and its origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemEntry {
    pub item: ItemKey,
    /// Storage index for body and hotbar, armor index for armor, 0 for off-hand.
    pub slot: usize,
    pub category: SlotCategory,
}

/// Full carried inventory of a player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventorySnapshot {
    pub storage: Vec<Option<ItemStack>>,
    pub armor: [Option<ItemStack>; Self::ARMOR_SLOTS],
    pub offhand: Option<ItemStack>,
}

impl InventorySnapshot {
    pub const STORAGE_SLOTS: usize = 36;
    pub const HOTBAR_SLOTS: usize = 9;
    pub const ARMOR_SLOTS: usize = 4;

    pub fn empty() -> Self {
        Self {
            storage: vec![None; Self::STORAGE_SLOTS],
            armor: Default::default(),
            offhand: None,
        }
    }

    /// Places `stack` in storage slot `slot`; out-of-range slots are ignored.
    pub fn with_storage(mut self, slot: usize, stack: ItemStack) -> Self {
        if let Some(cell) = self.storage.get_mut(slot) {
            *cell = Some(stack);
        }
        self
    }

    pub fn with_armor(mut self, piece: ArmorPiece, stack: ItemStack) -> Self {
        self.armor[piece.index()] = Some(stack);
        self
    }

    pub fn with_offhand(mut self, stack: ItemStack) -> Self {
        self.offhand = Some(stack);
        self
    }

    pub fn storage_category(slot: usize) -> SlotCategory {
        if slot < Self::HOTBAR_SLOTS {
            SlotCategory::Hotbar
        } else {
            SlotCategory::Body
        }
    }

    /// Every occupied slot with its index and category. Empty and zero-sized
    /// stacks are skipped.
    pub fn stacks(&self) -> impl Iterator<Item = (usize, SlotCategory, &ItemStack)> {
        let storage = self
            .storage
            .iter()
            .enumerate()
            .take(Self::STORAGE_SLOTS)
            .filter_map(|(slot, stack)| {
                stack
                    .as_ref()
                    .map(|stack| (slot, Self::storage_category(slot), stack))
            });
        let armor = <ArmorPiece as strum::IntoEnumIterator>::iter().filter_map(|piece| {
            self.armor[piece.index()]
                .as_ref()
                .map(|stack| (piece.index(), SlotCategory::Armor(piece), stack))
        });
        let offhand = self
            .offhand
            .iter()
            .map(|stack| (0, SlotCategory::Offhand, stack));

        storage
            .chain(armor)
            .chain(offhand)
            .filter(|(_, _, stack)| stack.amount > 0)
    }

    /// Total number of carried units.
    pub fn unit_count(&self) -> usize {
        self.stacks().map(|(_, _, stack)| usize::from(stack.amount)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks().next().is_none()
    }

    /// Moves the stacks of `other` into this inventory.
    ///
    /// A stack keeps its slot when that slot is free, otherwise it takes the
    /// first free storage slot. Stacks that fit nowhere are returned.
    pub fn absorb(&mut self, other: InventorySnapshot) -> Vec<ItemStack> {
        let mut overflow = Vec::new();
        let placed: Vec<(SlotCategory, usize, ItemStack)> = other
            .stacks()
            .map(|(slot, category, stack)| (category, slot, stack.clone()))
            .collect();

        for (category, slot, stack) in placed {
            let cell = match category {
                SlotCategory::Hotbar | SlotCategory::Body => self.storage.get_mut(slot),
                SlotCategory::Armor(piece) => Some(&mut self.armor[piece.index()]),
                SlotCategory::Offhand => Some(&mut self.offhand),
            };
            if let Some(cell) = cell.filter(|cell| cell.is_none()) {
                *cell = Some(stack);
            } else if let Some(free) = self.storage.iter_mut().find(|cell| cell.is_none()) {
                *free = Some(stack);
            } else {
                overflow.push(stack);
            }
        }
        overflow
    }
}

impl Default for InventorySnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
