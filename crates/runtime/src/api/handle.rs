//! Cloneable façade over the soul-point services.
//!
//! [`SoulHandle`] is what the embedding server and other plugins hold. Every
//! counter write goes through it so that events, tier commands and the
//! max-health refresh follow each change consistently.
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use soul_content::ConfigLoader;
use soul_core::{
    Counter, CurrencyLedger, HealthAttribute, PenaltyParameters, PlayerId, PlayerRecord,
    SoulConfig, SoulError, Timestamp, apply_max_health_penalty, recovery,
};

use super::errors::{Result, RuntimeError};
use super::host::{BYPASS_PERMISSION, CommandDispatcher, GameHost};
use crate::clock::Clock;
use crate::config::SharedConfig;
use crate::events::{ChangeReason, CounterChange, EventBus, SoulEvent, Topic};
use crate::pending::PendingDrops;
use crate::runtime::RuntimeConfig;
use crate::scheduler::TaskScheduler;
use crate::store::{Persist, SoulStore};

pub(crate) struct Inner {
    pub(crate) settings: RuntimeConfig,
    pub(crate) config: Arc<SharedConfig>,
    pub(crate) store: SoulStore,
    pub(crate) host: Arc<dyn GameHost>,
    pub(crate) ledger: Option<Arc<dyn CurrencyLedger>>,
    pub(crate) dispatcher: Arc<dyn CommandDispatcher>,
    pub(crate) scheduler: Arc<dyn TaskScheduler>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) events: EventBus,
    pub(crate) pending: PendingDrops,
}

/// Client-facing handle to the soul-point runtime
#[derive(Clone)]
pub struct SoulHandle {
    pub(crate) inner: Arc<Inner>,
}

impl SoulHandle {
    pub(crate) fn new(inner: Inner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Snapshot of the active configuration.
    pub fn config(&self) -> Arc<SoulConfig> {
        self.inner.config.get()
    }

    pub fn store(&self) -> &SoulStore {
        &self.inner.store
    }

    pub fn host(&self) -> &dyn GameHost {
        self.inner.host.as_ref()
    }

    pub fn now(&self) -> Timestamp {
        self.inner.clock.now()
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Points` - Counter changes from deaths, kills, commands and the API
    /// - `Topic::Penalty` - Death reports and released drops
    /// - `Topic::Recovery` - Counter changes made by recovery
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<SoulEvent> {
        self.inner.events.subscribe(topic)
    }

    pub(crate) fn publish(&self, event: SoulEvent) {
        self.inner.events.publish(event);
    }

    pub fn points(&self, player: &PlayerId) -> u32 {
        self.store().points(player)
    }

    pub fn personal_max(&self, player: &PlayerId) -> u32 {
        self.store().personal_max(player)
    }

    pub fn record(&self, player: &PlayerId) -> Option<PlayerRecord> {
        self.store().record(player)
    }

    pub fn set_points(
        &self,
        player: &PlayerId,
        value: i64,
        reason: ChangeReason,
    ) -> Option<CounterChange> {
        let change = self.store().set_points(player, value, reason);
        self.after_change(change.as_ref(), true);
        change
    }

    pub fn add_points(
        &self,
        player: &PlayerId,
        delta: i64,
        reason: ChangeReason,
    ) -> Option<CounterChange> {
        let change = self.store().add_points(player, delta, reason);
        self.after_change(change.as_ref(), true);
        change
    }

    pub fn remove_points(
        &self,
        player: &PlayerId,
        amount: u32,
        reason: ChangeReason,
    ) -> Option<CounterChange> {
        self.add_points(player, -i64::from(amount), reason)
    }

    pub fn set_personal_max(
        &self,
        player: &PlayerId,
        value: i64,
        reason: ChangeReason,
    ) -> Option<CounterChange> {
        self.write_personal_max(player, reason, |_| value)
    }

    pub fn add_personal_max(
        &self,
        player: &PlayerId,
        delta: i64,
        reason: ChangeReason,
    ) -> Option<CounterChange> {
        self.write_personal_max(player, reason, |old| i64::from(old) + delta)
    }

    pub fn reduce_personal_max(
        &self,
        player: &PlayerId,
        amount: u32,
        reason: ChangeReason,
    ) -> Option<CounterChange> {
        self.add_personal_max(player, -i64::from(amount), reason)
    }

    /// Writes the personal maximum and reports the points clamp it caused as
    /// a separate change.
    fn write_personal_max(
        &self,
        player: &PlayerId,
        reason: ChangeReason,
        value: impl FnOnce(u32) -> i64,
    ) -> Option<CounterChange> {
        if !self.config().enabled {
            return None;
        }
        let ((old_max, new_max), (old_points, new_points)) =
            self.store()
                .update(player, Persist::Now, |record, config| {
                    let old_max = record.personal_max;
                    let old_points = record.current;
                    let new_max = record.set_personal_max(value(old_max), config);
                    ((old_max, new_max), (old_points, record.current))
                });

        let max_change = CounterChange {
            player: player.clone(),
            counter: Counter::PersonalMax,
            old: old_max,
            new: new_max,
            reason,
        };
        self.after_change(Some(&max_change), false);

        let points_change = CounterChange {
            player: player.clone(),
            counter: Counter::Points,
            old: old_points,
            new: new_points,
            reason,
        };
        self.after_change(Some(&points_change), true);

        Some(max_change)
    }

    /// Publishes a change and runs its side effects.
    ///
    /// A death that lowers an online player's points dispatches the tier
    /// commands of the new level; other writers never run them. `refresh` re-applies the max-health modifier for the new
    /// level; the death path passes `false` because it has already applied
    /// the penalty of the level the player died at.
    pub(crate) fn after_change(&self, change: Option<&CounterChange>, refresh: bool) {
        let Some(change) = change else { return };
        if change.old == change.new {
            return;
        }
        tracing::debug!(
            "{} {:?} {} -> {} ({})",
            change.player,
            change.counter,
            change.old,
            change.new,
            change.reason.as_ref()
        );
        self.publish(SoulEvent::CounterChanged(change.clone()));

        if change.counter != Counter::Points || !self.host().is_online(&change.player) {
            return;
        }
        if change.reason == ChangeReason::Death && change.is_decrease() {
            self.dispatch_tier_commands(&change.player, change.new);
        }
        if refresh {
            self.refresh_max_health(&change.player);
        }
    }

    fn dispatch_tier_commands(&self, player: &PlayerId, level: u32) {
        let Some(name) = self.host().player_name(player) else {
            tracing::warn!("No name known for {}, skipping tier commands", player);
            return;
        };
        for command in self.drop_rates(level).commands_for(&name) {
            tracing::debug!("Dispatching tier command for {}: {}", name, command);
            self.inner.dispatcher.dispatch(&command);
        }
    }

    /// Penalties that apply at `level` under the current configuration.
    pub fn drop_rates(&self, level: u32) -> PenaltyParameters {
        self.config().drop_rates(level)
    }

    /// Milliseconds until `counter` next regenerates for `player`.
    pub fn time_until_next_recovery(&self, player: &PlayerId, counter: Counter) -> Option<u64> {
        let config = self.config();
        if !config.enabled {
            return None;
        }
        let record = self.record(player)?;
        recovery::time_until_next(&record, &config, counter, self.now())
    }

    /// Re-applies the max-health modifier for the player's current level.
    ///
    /// Clears the modifier while the system is disabled or the player holds
    /// the bypass permission. Returns `false` if the host had no attribute.
    pub fn refresh_max_health(&self, player: &PlayerId) -> bool {
        let config = self.config();
        let penalty = (config.enabled && !self.host().has_permission(player, BYPASS_PERMISSION))
            .then(|| config.drop_rates(self.points(player)).max_health);

        self.host()
            .with_max_health(player, &mut |attribute: &mut dyn HealthAttribute| {
                apply_max_health_penalty(attribute, penalty.as_ref(), config.min_max_health);
            })
    }

    /// Clears the penalty modifier without touching the record.
    pub fn clear_max_health(&self, player: &PlayerId) -> bool {
        let floor = self.config().min_max_health;
        self.host()
            .with_max_health(player, &mut |attribute: &mut dyn HealthAttribute| {
                apply_max_health_penalty(attribute, None, floor);
            })
    }

    /// Validates and installs a new configuration, then re-clamps every
    /// record and refreshes online players.
    pub fn reload(&self, config: SoulConfig) -> Result<()> {
        if let Err(e) = config.validate() {
            tracing::warn!(
                "Rejected configuration reload [{}, {}]: {}",
                e.error_code(),
                e.severity().as_str(),
                e
            );
            return Err(RuntimeError::InvalidConfig(e));
        }
        self.inner.config.replace(config);
        self.store().normalize_all();
        for player in self.host().online_players() {
            self.refresh_max_health(&player);
        }
        tracing::info!("Soul point configuration reloaded");
        Ok(())
    }

    pub fn reload_from(&self, path: &Path) -> Result<()> {
        let config =
            ConfigLoader::load(path).map_err(|e| RuntimeError::ConfigLoad(format!("{e:#}")))?;
        self.reload(config)
    }

    /// Runs `task` with a clone of this handle after `delay`.
    pub(crate) fn run_later(
        &self,
        delay: Duration,
        task: impl FnOnce(&SoulHandle) + Send + 'static,
    ) {
        let handle = self.clone();
        self.inner
            .scheduler
            .run_later(delay, Box::new(move || task(&handle)));
    }

    pub(crate) fn settings(&self) -> &RuntimeConfig {
        &self.inner.settings
    }
}
