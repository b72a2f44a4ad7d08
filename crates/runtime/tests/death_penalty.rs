mod common;

use std::time::Duration;

use soul_core::{
    ArmorPiece, HealthMode, InventorySnapshot, ItemPenalty, ItemStack, MAX_HEALTH_MODIFIER_ID,
    MaxHealthPenalty, MoneyPenalty, PenaltyDefaults, PenaltyTable, PenaltyTier, SoulConfig,
};
use soul_runtime::{
    BYPASS_PERMISSION, ChangeReason, DeathEvent, DropRelease, RuntimeConfig, SoulEvent, Topic,
};

use common::{Harness, spawn_point};

/// Tier 3 drops half of the body and armor, keeps the hotbar, and costs two
/// hearts; tier 2 carries the commands run after dropping to level 2.
fn tiered_config() -> SoulConfig {
    let table = PenaltyTable::new(PenaltyDefaults::default())
        .with_tier(
            3,
            PenaltyTier::default()
                .with_items(ItemPenalty::new(50, false, true))
                .with_max_health(MaxHealthPenalty::new(2.0, HealthMode::Remove)),
        )
        .with_tier(
            2,
            PenaltyTier::default()
                .with_commands(["effect give %player% slowness 60", "   ", "say %player% weakened"]),
        );
    SoulConfig::default().with_penalties(table)
}

/// 10 body units, 2 armor pieces and 5 hotbar units.
fn loadout() -> InventorySnapshot {
    InventorySnapshot::empty()
        .with_storage(0, ItemStack::new("iron_sword", 1))
        .with_storage(1, ItemStack::new("bread", 4))
        .with_storage(9, ItemStack::new("cobblestone", 6))
        .with_storage(20, ItemStack::new("torch", 4))
        .with_armor(ArmorPiece::Boots, ItemStack::new("iron_boots", 1))
        .with_armor(ArmorPiece::Helmet, ItemStack::new("iron_helmet", 1))
}

fn hotbar_units(inventory: &InventorySnapshot) -> usize {
    inventory.storage[..InventorySnapshot::HOTBAR_SLOTS]
        .iter()
        .flatten()
        .map(|stack| usize::from(stack.amount))
        .sum()
}

#[tokio::test]
async fn death_at_level_three_forfeits_half_of_vulnerable_items() {
    let h = Harness::new(tiered_config());
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");
    h.host.set_inventory(&alex, loadout());
    soul.set_points(&alex, 3, ChangeReason::Api);

    let mut event = DeathEvent::new(alex.clone(), spawn_point());
    event.drops = vec![ItemStack::new("cobblestone", 6)];
    let report = soul.on_death(&mut event).expect("penalty applied");

    assert!(event.keep_inventory);
    assert!(event.drops.is_empty());
    assert_eq!((report.old_points, report.new_points), (3, 2));
    assert_eq!(report.items_total, 12);
    assert_eq!(report.items_dropped, 6);
    assert_eq!(report.money_lost, 0.0);
    assert!(!report.awaiting_claim);
    assert_eq!(soul.points(&alex), 2);

    assert_eq!(h.host.spawned_units(), 6);
    assert_eq!(h.host.spawned()[0].0, spawn_point());
    assert!(h.host.inventory_of(&alex).is_empty());

    h.scheduler.run_all();
    let restored = h.host.inventory_of(&alex);
    assert_eq!(restored.unit_count(), 11);
    assert_eq!(hotbar_units(&restored), 5);
}

#[tokio::test]
async fn death_penalties_use_the_level_before_the_decrement() {
    let h = Harness::new(tiered_config());
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");
    soul.set_points(&alex, 3, ChangeReason::Api);

    let report = soul
        .on_death(&mut DeathEvent::new(alex.clone(), spawn_point()))
        .unwrap();

    assert_eq!(report.hearts_applied, 2.0);
    let health = h.host.health_of(&alex);
    assert_eq!(health.modifiers.get(MAX_HEALTH_MODIFIER_ID), Some(&-4.0));

    // Tier 2 commands run for the new level, placeholder substituted and
    // blank entries skipped.
    assert_eq!(
        h.dispatcher.commands(),
        vec![
            "effect give Alex slowness 60".to_owned(),
            "say Alex weakened".to_owned()
        ]
    );
}

#[tokio::test]
async fn repeated_penalty_does_not_stack_health_modifier() {
    let h = Harness::new(tiered_config());
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");

    soul.set_points(&alex, 3, ChangeReason::Api);
    soul.on_death(&mut DeathEvent::new(alex.clone(), spawn_point()));
    soul.set_points(&alex, 3, ChangeReason::Api);
    let report = soul
        .on_death(&mut DeathEvent::new(alex.clone(), spawn_point()))
        .unwrap();

    assert_eq!(report.hearts_delta, 0.0);
    assert_eq!(h.host.health_of(&alex).modifiers.len(), 1);
}

#[tokio::test]
async fn percent_money_penalty_uses_balance_at_death() {
    let table = PenaltyTable::new(PenaltyDefaults {
        money: MoneyPenalty::percent(10.0),
        ..PenaltyDefaults::default()
    });
    let h = Harness::new(SoulConfig::default().with_penalties(table));
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");
    h.ledger.deposit(&alex, 250.0);

    let report = soul
        .on_death(&mut DeathEvent::new(alex.clone(), spawn_point()))
        .unwrap();

    assert!((report.money_lost - 25.0).abs() < 1e-9);
    assert_eq!(report.remaining_balance, Some(225.0));
    assert!(!report.balance_depleted);
}

#[tokio::test]
async fn refused_withdrawal_still_applies_other_penalties() {
    let table = PenaltyTable::new(PenaltyDefaults {
        money: MoneyPenalty::flat(100.0),
        ..PenaltyDefaults::default()
    });
    let h = Harness::new(SoulConfig::default().with_penalties(table));
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");
    h.ledger.deposit(&alex, 40.0);
    h.ledger.refuse_withdrawals();

    let report = soul
        .on_death(&mut DeathEvent::new(alex.clone(), spawn_point()))
        .unwrap();

    assert_eq!(report.money_lost, 0.0);
    assert_eq!(report.remaining_balance, Some(40.0));
    assert_eq!(report.new_points, 9);
}

#[tokio::test]
async fn bypass_permission_keeps_everything() {
    let h = Harness::new(tiered_config());
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");
    h.host.grant(&alex, BYPASS_PERMISSION);
    h.host.set_inventory(&alex, loadout());
    soul.set_points(&alex, 3, ChangeReason::Api);

    let mut event = DeathEvent::new(alex.clone(), spawn_point());
    event.drops = vec![ItemStack::new("torch", 4)];

    assert!(soul.on_death(&mut event).is_none());
    assert!(event.keep_inventory);
    assert!(event.drops.is_empty());
    assert_eq!(soul.points(&alex), 3);
    assert_eq!(h.host.inventory_of(&alex), loadout());
}

#[tokio::test]
async fn keep_inventory_world_skips_the_penalty() {
    let h = Harness::new(tiered_config());
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");

    let mut event = DeathEvent::new(alex.clone(), spawn_point());
    event.keep_inventory_rule = true;

    assert!(soul.on_death(&mut event).is_none());
    assert_eq!(soul.points(&alex), 10);
}

#[tokio::test]
async fn disabled_system_ignores_deaths() {
    let mut config = tiered_config();
    config.enabled = false;
    let h = Harness::new(config);
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");

    assert!(
        soul.on_death(&mut DeathEvent::new(alex.clone(), spawn_point()))
            .is_none()
    );
    assert!(!soul.store().contains(&alex));
}

#[tokio::test]
async fn points_never_drop_below_zero() {
    let h = Harness::new(SoulConfig::default());
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");
    soul.set_points(&alex, 0, ChangeReason::Api);

    let report = soul
        .on_death(&mut DeathEvent::new(alex.clone(), spawn_point()))
        .unwrap();
    assert_eq!((report.old_points, report.new_points), (0, 0));
}

#[tokio::test]
async fn grave_collector_claims_drops_exactly_once() {
    let h = Harness::new(tiered_config());
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");
    h.host.set_grave_collector(true);
    h.host.set_inventory(&alex, loadout());
    soul.set_points(&alex, 3, ChangeReason::Api);
    let mut penalties = soul.subscribe(Topic::Penalty);

    let report = soul
        .on_death(&mut DeathEvent::new(alex.clone(), spawn_point()))
        .unwrap();
    assert!(report.awaiting_claim);
    assert_eq!(h.host.spawned_units(), 0);

    let claimed = soul.claim_pending_drop(&alex).expect("drops pending");
    let units: usize = claimed.iter().map(|s| usize::from(s.amount)).sum();
    assert_eq!(units, 6);
    assert!(soul.claim_pending_drop(&alex).is_none());

    // The fallback timer fires later and finds nothing to spawn.
    h.scheduler.run_all();
    assert_eq!(h.host.spawned_units(), 0);
    assert_eq!(h.host.inventory_of(&alex).unit_count(), 11);

    assert!(matches!(
        penalties.try_recv(),
        Ok(SoulEvent::DeathPenaltyApplied(_))
    ));
    assert!(matches!(
        penalties.try_recv(),
        Ok(SoulEvent::DropsReleased {
            release: DropRelease::Claimed,
            ..
        })
    ));
    assert!(penalties.try_recv().is_err());
}

#[tokio::test]
async fn unclaimed_drops_spawn_after_timeout() {
    let h = Harness::new(tiered_config());
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");
    h.host.set_grave_collector(true);
    h.host.set_inventory(&alex, loadout());
    soul.set_points(&alex, 3, ChangeReason::Api);

    soul.on_death(&mut DeathEvent::new(alex.clone(), spawn_point()));
    assert!(soul.has_pending_drop(&alex));

    h.scheduler.run_all();
    assert_eq!(h.host.spawned_units(), 6);
    assert_eq!(h.host.inventory_of(&alex).unit_count(), 11);
    assert!(soul.claim_pending_drop(&alex).is_none());
}

#[tokio::test]
async fn second_death_supersedes_unclaimed_drops_without_losing_items() {
    let h = Harness::new(tiered_config());
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");
    h.host.set_grave_collector(true);
    h.host.set_inventory(&alex, loadout());
    soul.set_points(&alex, 3, ChangeReason::Api);

    soul.on_death(&mut DeathEvent::new(alex.clone(), spawn_point()));
    assert!(soul.has_pending_drop(&alex));
    assert!(h.host.inventory_of(&alex).is_empty());

    h.host.set_inventory(
        &alex,
        InventorySnapshot::empty().with_storage(15, ItemStack::new("dirt", 4)),
    );
    let mut penalties = soul.subscribe(Topic::Penalty);
    let elsewhere = soul_runtime::Location::new("world", -40.0, 70.0, 12.0);
    let report = soul
        .on_death(&mut DeathEvent::new(alex.clone(), elsewhere))
        .unwrap();
    assert_eq!((report.items_total, report.items_dropped), (4, 2));

    // The first drop lands where it was forfeited; nothing is restored yet.
    assert_eq!(h.host.spawned_units(), 6);
    assert_eq!(h.host.spawned()[0].0, spawn_point());
    assert!(h.host.inventory_of(&alex).is_empty());

    let mut releases = Vec::new();
    while let Ok(event) = penalties.try_recv() {
        if let SoulEvent::DropsReleased { release, .. } = event {
            releases.push(release);
        }
    }
    assert_eq!(releases, vec![DropRelease::Superseded]);

    let claimed = soul.claim_pending_drop(&alex).expect("second drop pending");
    let units: usize = claimed.iter().map(|s| usize::from(s.amount)).sum();
    assert_eq!(units, 2);

    // Both fallback timers find nothing; the restore carries what was kept
    // from both deaths.
    h.scheduler.run_all();
    assert_eq!(h.host.spawned_units(), 6);
    let restored = h.host.inventory_of(&alex);
    assert_eq!(restored.unit_count(), 11 + 2);
    assert_eq!(hotbar_units(&restored), 5);
    assert_eq!(h.host.spawned_units() + units + restored.unit_count(), 17 + 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn tokio_scheduler_releases_unclaimed_drops() {
    let settings = RuntimeConfig {
        drop_claim_timeout: Duration::from_millis(100),
        fixed_seed: Some(1),
        ..RuntimeConfig::default()
    };
    let host = std::sync::Arc::new(common::FakeHost::new());
    let runtime = soul_runtime::SoulRuntime::builder()
        .config(settings)
        .soul_config(tiered_config())
        .host(host.clone())
        .dispatcher(std::sync::Arc::new(common::RecordingDispatcher::default()))
        .build()
        .unwrap();
    let soul = runtime.handle();
    let alex = host.join("Alex");
    host.set_grave_collector(true);
    host.set_inventory(&alex, loadout());
    soul.set_points(&alex, 3, ChangeReason::Api);

    soul.on_death(&mut DeathEvent::new(alex.clone(), spawn_point()));
    assert_eq!(host.spawned_units(), 0);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(host.spawned_units(), 6);
    assert!(!soul.has_pending_drop(&alex));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn zero_drop_tier_leaves_inventory_in_place() {
    let h = Harness::new(SoulConfig::default());
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");
    h.host.set_inventory(&alex, loadout());

    let report = soul
        .on_death(&mut DeathEvent::new(alex.clone(), spawn_point()))
        .unwrap();

    assert_eq!(report.items_dropped, 0);
    assert_eq!(h.host.inventory_of(&alex), loadout());
    assert_eq!(h.scheduler.pending(), 0);
}
