//! Handler for player death.
//!
//! Resolves the penalties of the level the player died at, applies items,
//! max health and currency in that order, then decrements soul points.

use soul_core::{
    CurrencyStatus, HealthAttribute, HealthOutcome, InventorySnapshot, ItemKey, ItemStack,
    PenaltyParameters, PlayerId, apply_currency_penalty, apply_max_health_penalty,
    inventory::{merge_stacks, partition, reconstruct, tally},
};

use crate::api::{BYPASS_PERMISSION, Location, SoulHandle};
use crate::events::{ChangeReason, DeathReport, DropRelease, SoulEvent};
use crate::pending::PendingDrop;

/// Number of item kinds listed in a death report.
const TOP_DROPPED: usize = 3;

/// Death as delivered by the host.
///
/// The handler rewrites `keep_inventory` and `drops`; the host applies them
/// after the call returns.
#[derive(Clone, Debug, PartialEq)]
pub struct DeathEvent {
    pub player: PlayerId,
    pub killer: Option<PlayerId>,
    pub location: Location,
    /// World rule that keeps inventories on death.
    pub keep_inventory_rule: bool,
    pub keep_inventory: bool,
    pub drops: Vec<ItemStack>,
}

impl DeathEvent {
    pub fn new(player: PlayerId, location: Location) -> Self {
        Self {
            player,
            killer: None,
            location,
            keep_inventory_rule: false,
            keep_inventory: false,
            drops: Vec::new(),
        }
    }

    pub fn with_killer(mut self, killer: PlayerId) -> Self {
        self.killer = Some(killer);
        self
    }
}

#[derive(Default)]
struct ItemOutcome {
    dropped: usize,
    total: usize,
    top: Vec<(ItemKey, u32)>,
    awaiting_claim: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct DeathHandler;

impl DeathHandler {
    /// Applies the death penalty. Returns `None` when nothing was applied
    /// (system disabled, bypass permission, or keep-inventory world).
    pub fn handle(&self, soul: &SoulHandle, event: &mut DeathEvent) -> Option<DeathReport> {
        let config = soul.config();
        if !config.enabled {
            return None;
        }
        let player = event.player.clone();

        if soul.host().has_permission(&player, BYPASS_PERMISSION) {
            event.keep_inventory = true;
            event.drops.clear();
            tracing::debug!("{} bypasses the death penalty", player);
            return None;
        }
        if event.keep_inventory_rule {
            tracing::debug!("Keep-inventory world, no penalty for {}", player);
            return None;
        }

        let old_points = soul.points(&player);
        let params = config.drop_rates(old_points);
        let seed = soul
            .settings()
            .fixed_seed
            .unwrap_or_else(rand::random::<u64>);

        let items = self.apply_items(soul, event, &params, seed);

        let mut health = HealthOutcome::default();
        let mut apply = |attribute: &mut dyn HealthAttribute| {
            health =
                apply_max_health_penalty(attribute, Some(&params.max_health), config.min_max_health);
        };
        if !soul.host().with_max_health(&player, &mut apply) {
            tracing::warn!("Max health attribute unavailable for {}", player);
        }

        let currency = apply_currency_penalty(
            soul.inner.ledger.as_deref(),
            &player,
            &params.money,
            config.balance_epsilon,
        );
        let remaining_balance = match &currency.status {
            CurrencyStatus::NoLedger => {
                if params.money.amount > 0.0 {
                    tracing::warn!(
                        "No currency ledger attached, skipping money penalty for {}",
                        player
                    );
                }
                None
            }
            CurrencyStatus::NoPenalty => soul.inner.ledger.as_ref().map(|l| l.balance(&player)),
            CurrencyStatus::Withdrawn => Some(currency.remaining_balance),
            CurrencyStatus::Failed(reason) => {
                tracing::warn!("Failed to withdraw death penalty from {}: {}", player, reason);
                Some(currency.remaining_balance)
            }
        };

        let change = soul.store().add_points(&player, -1, ChangeReason::Death);
        soul.after_change(change.as_ref(), false);
        let new_points = change.map_or(old_points, |c| c.new);

        let report = DeathReport {
            player: player.clone(),
            old_points,
            new_points,
            items_dropped: items.dropped,
            items_total: items.total,
            top_dropped: items.top,
            money_lost: currency.amount_lost,
            remaining_balance,
            balance_depleted: currency.depleted,
            hearts_applied: health.applied_hearts,
            hearts_delta: health.delta_hearts,
            awaiting_claim: items.awaiting_claim,
        };
        tracing::info!(
            "{} died at {} soul points: {}/{} items dropped, {:.2} money lost",
            player,
            old_points,
            report.items_dropped,
            report.items_total,
            report.money_lost
        );
        soul.publish(SoulEvent::DeathPenaltyApplied(report.clone()));
        Some(report)
    }

    /// Takes the inventory over from the host: it keeps nothing and drops
    /// nothing, while forfeited stacks are spawned (or held for a grave
    /// collector) and the retained ones restored on the next tick.
    fn apply_items(
        &self,
        soul: &SoulHandle,
        event: &mut DeathEvent,
        params: &PenaltyParameters,
        seed: u64,
    ) -> ItemOutcome {
        event.keep_inventory = true;
        event.drops.clear();

        let player = &event.player;
        let snapshot = soul.host().inventory(player);
        let split = partition(&snapshot, params, seed);
        let total = split.vulnerable_count;
        if split.forfeited.is_empty() {
            return ItemOutcome {
                total,
                ..Default::default()
            };
        }

        let mut top: Vec<(ItemKey, u32)> = tally(&split.forfeited).into_iter().collect();
        top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top.truncate(TOP_DROPPED);

        let forfeited = merge_stacks(&split.forfeited);
        let retained = reconstruct(&split.retained);
        soul.host().clear_inventory(player);

        let awaiting_claim = soul.host().grave_collector_present();
        if awaiting_claim {
            hold_for_collector(soul, player, forfeited, retained, event.location.clone());
        } else {
            soul.host().spawn_items(&event.location, &forfeited);
            schedule_restore(soul, player.clone(), retained);
        }

        ItemOutcome {
            dropped: split.forfeited.len(),
            total,
            top,
            awaiting_claim,
        }
    }
}

fn hold_for_collector(
    soul: &SoulHandle,
    player: &PlayerId,
    items: Vec<ItemStack>,
    mut retained: InventorySnapshot,
    location: Location,
) {
    if let Some(stale) = soul.inner.pending.take(player) {
        tracing::warn!("{} died again before drops were claimed", player);
        soul.host().spawn_items(&stale.location, &stale.items);
        let overflow = retained.absorb(stale.retained);
        if !overflow.is_empty() {
            soul.host().spawn_items(&location, &overflow);
        }
        soul.publish(SoulEvent::DropsReleased {
            player: player.clone(),
            release: DropRelease::Superseded,
        });
    }

    let (id, replaced) = soul.inner.pending.insert(player, items, retained, location);
    if let Some(raced) = replaced {
        release_to_world(soul, player, raced, DropRelease::Superseded);
    }

    let owner = player.clone();
    soul.run_later(soul.settings().drop_claim_timeout, move |soul| {
        if let Some(drop) = soul.inner.pending.take_if(&owner, id) {
            tracing::debug!("Drops of {} were not claimed, spawning them", owner);
            release_to_world(soul, &owner, drop, DropRelease::TimedOut);
        }
    });
}

/// Spawns unclaimed drops and restores what the player kept.
fn release_to_world(
    soul: &SoulHandle,
    player: &PlayerId,
    drop: PendingDrop,
    release: DropRelease,
) {
    soul.host().spawn_items(&drop.location, &drop.items);
    soul.host().restore_inventory(player, &drop.retained);
    soul.publish(SoulEvent::DropsReleased {
        player: player.clone(),
        release,
    });
}

pub(super) fn schedule_restore(soul: &SoulHandle, player: PlayerId, retained: InventorySnapshot) {
    if retained.is_empty() {
        return;
    }
    soul.run_later(soul.settings().restore_delay, move |soul| {
        soul.host().restore_inventory(&player, &retained);
    });
}

impl SoulHandle {
    /// Called by a grave collector to take a player's pending drops.
    ///
    /// Returns the forfeited stacks exactly once; afterwards, or after the
    /// claim timeout spawned them, returns `None`.
    pub fn claim_pending_drop(&self, player: &PlayerId) -> Option<Vec<ItemStack>> {
        let drop = self.inner.pending.take(player)?;
        schedule_restore(self, player.clone(), drop.retained);
        self.publish(SoulEvent::DropsReleased {
            player: player.clone(),
            release: DropRelease::Claimed,
        });
        Some(drop.items)
    }

    pub fn has_pending_drop(&self, player: &PlayerId) -> bool {
        self.inner.pending.contains(player)
    }
}
