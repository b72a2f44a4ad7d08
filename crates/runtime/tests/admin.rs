mod common;

use soul_core::{
    Counter, HealthMode, ItemPenalty, MAX_HEALTH_MODIFIER_ID, MaxHealthPenalty, PenaltyDefaults,
    PenaltyTable, PenaltyTier, SoulConfig,
};
use soul_runtime::{
    AdminCommand, AdminError, BYPASS_PERMISSION, ChangeReason, CounterChange, DeathEvent,
    InventoryClose, InventoryView, SoulEvent, Topic,
};

use common::{Harness, spawn_point};

fn run(h: &Harness, args: &[&str]) -> Result<Vec<String>, AdminError> {
    let command = AdminCommand::parse(args)?;
    command
        .execute(&h.runtime.handle(), None)
        .map(|reply| reply.lines)
}

#[tokio::test]
async fn invalid_number_changes_nothing() {
    let h = Harness::new(SoulConfig::default());
    let alex = h.host.join("Alex");
    let saves = h.repository.save_count();

    let err = run(&h, &["set", "Alex", "ten"]).unwrap_err();
    assert_eq!(err.to_string(), "Invalid number: ten");
    assert!(!h.runtime.handle().store().contains(&alex));
    assert_eq!(h.repository.save_count(), saves);
}

#[tokio::test]
async fn set_requires_value_within_maximum() {
    let h = Harness::new(SoulConfig::default());
    h.host.join("Alex");

    assert_eq!(
        run(&h, &["set", "Alex", "11"]),
        Err(AdminError::OutOfRange { max: 10 })
    );
    assert_eq!(
        run(&h, &["set", "Alex", "4"]).unwrap(),
        vec!["Set Alex's soul points to 4/10".to_owned()]
    );
}

#[tokio::test]
async fn give_and_take_report_actual_change() {
    let h = Harness::new(SoulConfig::default());
    let alex = h.host.join("Alex");
    h.runtime
        .handle()
        .set_points(&alex, 8, ChangeReason::Command);

    assert_eq!(
        run(&h, &["give", "alex", "5"]).unwrap(),
        vec!["Gave 2 soul points to Alex (now 10/10)".to_owned()]
    );
    assert_eq!(
        run(&h, &["take", "Alex", "3"]).unwrap(),
        vec!["Took 3 soul points from Alex (now 7/10)".to_owned()]
    );
    assert_eq!(run(&h, &["take", "Alex", "0"]), Err(AdminError::NotPositive));
    assert_eq!(
        run(&h, &["give", "Nobody", "1"]),
        Err(AdminError::UnknownPlayer("Nobody".into()))
    );
}

#[tokio::test]
async fn lowering_personal_max_clamps_points() {
    let h = Harness::new(SoulConfig::default());
    let alex = h.host.join("Alex");
    let soul = h.runtime.handle();
    let mut points = soul.subscribe(Topic::Points);

    assert_eq!(
        run(&h, &["reducemax", "Alex", "4"]).unwrap(),
        vec!["Lowered Alex's personal max by 4 (now 6/10)".to_owned()]
    );
    assert_eq!(soul.points(&alex), 6);

    let mut counters = Vec::new();
    while let Ok(SoulEvent::CounterChanged(change)) = points.try_recv() {
        counters.push((change.counter, change.old, change.new));
    }
    assert_eq!(
        counters,
        vec![(Counter::PersonalMax, 10, 6), (Counter::Points, 10, 6)]
    );
}

#[tokio::test]
async fn check_shows_standing_and_penalties() {
    let table = PenaltyTable::new(PenaltyDefaults::default())
        .with_tier(5, PenaltyTier::default().with_items(ItemPenalty::new(40, true, false)));
    let h = Harness::new(SoulConfig::default().with_penalties(table));
    let alex = h.host.join("Alex");
    h.runtime
        .handle()
        .set_points(&alex, 5, ChangeReason::Command);

    let lines = AdminCommand::parse(&["check"])
        .unwrap()
        .execute(&h.runtime.handle(), Some(&alex))
        .unwrap()
        .lines;

    assert_eq!(lines[0], "Soul Points - Alex");
    assert!(lines[1].ends_with("(5/10)"));
    assert!(lines.contains(&"  Item Drop: 40%".to_owned()));
    assert!(lines.contains(&"  Hotbar Drop: Yes".to_owned()));
    assert!(lines.contains(&"  Armor Drop: No".to_owned()));
    assert!(lines.contains(&"Next Recovery: 1h 0m 0s".to_owned()));
}

#[tokio::test]
async fn check_without_target_needs_a_sender() {
    let h = Harness::new(SoulConfig::default());
    assert!(matches!(run(&h, &["check"]), Err(AdminError::Usage(_))));
}

#[tokio::test]
async fn rates_lists_every_level() {
    let h = Harness::new(SoulConfig::default());
    let lines = run(&h, &["rates"]).unwrap();
    assert_eq!(lines.len(), 11);
    assert!(lines[0].starts_with("Level 10:"));
    assert!(lines[10].starts_with("Level 0:"));
}

#[tokio::test]
async fn pvp_kill_reduces_killer_max() {
    let h = Harness::new(SoulConfig::default());
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");
    let sam = h.host.join("Sam");

    let change = soul.on_player_kill(&sam, &alex).unwrap();
    assert_eq!(
        change,
        CounterChange {
            player: alex.clone(),
            counter: Counter::PersonalMax,
            old: 10,
            new: 9,
            reason: ChangeReason::PvpKill,
        }
    );
    assert_eq!(soul.points(&alex), 9);
    assert_eq!(soul.personal_max(&sam), 10);
}

#[tokio::test]
async fn pvp_kill_ignores_self_kills_and_bypass() {
    let h = Harness::new(SoulConfig::default());
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");
    let sam = h.host.join("Sam");
    h.host.grant(&sam, BYPASS_PERMISSION);

    assert!(soul.on_player_kill(&alex, &alex).is_none());
    assert!(soul.on_player_kill(&alex, &sam).is_none());
    assert_eq!(soul.personal_max(&alex), 10);
    assert_eq!(soul.personal_max(&sam), 10);
}

#[tokio::test]
async fn respawn_refresh_reapplies_health_modifier() {
    let table = PenaltyTable::new(PenaltyDefaults {
        max_health: MaxHealthPenalty::new(3.0, HealthMode::Remove),
        ..PenaltyDefaults::default()
    });
    let h = Harness::new(SoulConfig::default().with_penalties(table));
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");

    let close = InventoryClose {
        player: alex.clone(),
        view: InventoryView::PlayerCrafting,
        dead: false,
        health: 20.0,
    };
    assert!(soul.on_inventory_close(&close));
    assert!(!soul.on_inventory_close(&InventoryClose {
        view: InventoryView::Other,
        ..close.clone()
    }));
    assert!(h.host.health_of(&alex).modifiers.is_empty());

    h.scheduler.run_all();
    assert_eq!(
        h.host.health_of(&alex).modifiers.get(MAX_HEALTH_MODIFIER_ID),
        Some(&-6.0)
    );
}

#[tokio::test]
async fn reload_reclamps_records_and_rejects_invalid_config() {
    let h = Harness::new(SoulConfig::default());
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");
    soul.points(&alex);

    let mut smaller = SoulConfig::default();
    smaller.max = 5;
    smaller.starting = 5;
    soul.reload(smaller).unwrap();
    assert_eq!(soul.points(&alex), 5);
    assert_eq!(soul.personal_max(&alex), 5);

    let mut broken = SoulConfig::default();
    broken.max = 0;
    assert!(soul.reload(broken).is_err());
    assert_eq!(soul.config().max, 5);
}

#[tokio::test]
async fn tier_commands_run_only_for_deaths() {
    let table = PenaltyTable::new(PenaltyDefaults::default()).with_tier(
        4,
        PenaltyTier::default().with_commands(["effect give %player% slowness 60"]),
    );
    let h = Harness::new(SoulConfig::default().with_penalties(table));
    let soul = h.runtime.handle();
    let alex = h.host.join("Alex");

    run(&h, &["take", "Alex", "6"]).unwrap();
    assert_eq!(soul.points(&alex), 4);
    soul.remove_points(&alex, 1, ChangeReason::Api);
    assert!(h.dispatcher.commands().is_empty());

    soul.set_points(&alex, 5, ChangeReason::Command);
    let mut event = DeathEvent::new(alex.clone(), spawn_point());
    soul.on_death(&mut event).expect("penalty applied");
    assert_eq!(soul.points(&alex), 4);
    assert_eq!(
        h.dispatcher.commands(),
        vec!["effect give Alex slowness 60".to_owned()]
    );
}

#[tokio::test]
async fn rates_show_defaults_while_disabled() {
    let table = PenaltyTable::new(PenaltyDefaults::default()).with_tier(
        10,
        PenaltyTier::default().with_items(ItemPenalty::new(100, true, true)),
    );
    let mut config = SoulConfig::default().with_penalties(table);
    let h = Harness::new(config.clone());
    let enabled = run(&h, &["rates", "10"]).unwrap();
    assert!(enabled[0].starts_with("Level 10: 100% items, hotbar Yes, armor Yes"));

    config.enabled = false;
    h.runtime.handle().reload(config).unwrap();
    let disabled = run(&h, &["rates", "10"]).unwrap();
    assert!(disabled[0].starts_with("Level 10: 0% items, hotbar No, armor No"));
}
