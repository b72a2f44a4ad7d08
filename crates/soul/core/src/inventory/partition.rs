use super::{InventorySnapshot, ItemEntry, SlotCategory};
use crate::penalty::PenaltyParameters;
use crate::rng::PcgRng;

/// Split of a carried inventory into units lost and units kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    pub forfeited: Vec<ItemEntry>,
    /// Surviving vulnerable units plus every non-vulnerable unit.
    pub retained: Vec<ItemEntry>,
    pub vulnerable_count: usize,
}

impl Partition {
    pub fn total_units(&self) -> usize {
        self.forfeited.len() + self.retained.len()
    }
}

/// Number of vulnerable units lost at `percent`, rounded up.
pub fn drop_count(vulnerable: usize, percent: u8) -> usize {
    match percent {
        0 => 0,
        p if p >= 100 => vulnerable,
        p => (vulnerable * usize::from(p)).div_ceil(100),
    }
}

fn is_vulnerable(category: SlotCategory, params: &PenaltyParameters) -> bool {
    match category {
        SlotCategory::Body => true,
        SlotCategory::Hotbar | SlotCategory::Offhand => params.hotbar_vulnerable,
        SlotCategory::Armor(_) => params.armor_vulnerable,
    }
}

/// Decides which units of `snapshot` are forfeited under `params`.
///
/// Vulnerable stacks are expanded into single units, shuffled with a PCG
/// stream seeded by `seed`, and the first `drop_count` units are forfeited.
pub fn partition(snapshot: &InventorySnapshot, params: &PenaltyParameters, seed: u64) -> Partition {
    let mut vulnerable = Vec::new();
    let mut retained = Vec::new();

    for (slot, category, stack) in snapshot.stacks() {
        let target = if is_vulnerable(category, params) {
            &mut vulnerable
        } else {
            &mut retained
        };
        target.extend((0..stack.amount).map(|_| ItemEntry {
            item: stack.item.clone(),
            slot,
            category,
        }));
    }

    let vulnerable_count = vulnerable.len();
    let dropping = drop_count(vulnerable_count, params.item_drop_percent);

    let forfeited = if dropping == 0 {
        retained.append(&mut vulnerable);
        Vec::new()
    } else if dropping >= vulnerable_count {
        vulnerable
    } else {
        PcgRng::new(seed).shuffle(&mut vulnerable);
        retained.extend(vulnerable.split_off(dropping));
        vulnerable
    };

    Partition {
        forfeited,
        retained,
        vulnerable_count,
    }
}
