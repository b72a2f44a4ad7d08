//! Recovery state machine shared by both replenishing counters.
//!
//! A player's record carries two counters that regenerate independently:
//! current soul points (ceiling: the player's personal maximum) and the
//! personal maximum itself (ceiling: the configured maximum). Both run the same
//! [`ReplenishingCounter`] logic with their own [`RecoveryPolicy`].
//!
//! Lifecycle per player:
//!
//! ```text
//!   idle --join--> online --quit--> idle
//!                  |    ^
//!                  +----+ sweep
//! ```
//!
//! Real-time counters consume whole intervals of wall-clock time since their
//! anchor; the anchor advances by exactly the consumed intervals. Active-time
//! counters consume whole intervals of accumulated online time; the partial
//! interval carries over to the next session.

use crate::config::{RecoveryMode, RecoveryPolicy, SoulConfig};
use crate::record::{PlayerRecord, Timestamp};

/// Which counter of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Counter {
    Points,
    PersonalMax,
}

/// Active policies. `personal_max` is `None` when its regeneration is off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverySchedule {
    pub points: RecoveryPolicy,
    pub personal_max: Option<RecoveryPolicy>,
}

impl RecoverySchedule {
    pub fn policy(&self, counter: Counter) -> Option<RecoveryPolicy> {
        match counter {
            Counter::Points => Some(self.points),
            Counter::PersonalMax => self.personal_max,
        }
    }

    /// Counters in evaluation order: the maximum first so that points see the
    /// raised ceiling in the same pass.
    fn counters(&self) -> impl Iterator<Item = ReplenishingCounter> {
        let max = self
            .personal_max
            .map(|policy| ReplenishingCounter::new(Counter::PersonalMax, policy));
        max.into_iter()
            .chain(Some(ReplenishingCounter::new(Counter::Points, self.points)))
    }

    pub fn uses_active_time(&self) -> bool {
        self.counters()
            .any(|counter| counter.policy.mode == RecoveryMode::ActiveTime)
    }
}

/// Result of one replenish step that consumed at least one interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterGrant {
    pub counter: Counter,
    pub before: u32,
    pub after: u32,
    pub intervals: u64,
}

impl CounterGrant {
    /// Points actually added; zero when the counter was already full.
    pub fn granted(&self) -> u32 {
        self.after.saturating_sub(self.before)
    }
}

struct CounterView<'a> {
    value: &'a mut u32,
    ceiling: u32,
    anchor: &'a mut Timestamp,
    accumulated: &'a mut u64,
    credited: &'a mut u64,
}

impl<'a> CounterView<'a> {
    fn of(record: &'a mut PlayerRecord, counter: Counter, config: &SoulConfig) -> Self {
        match counter {
            Counter::Points => {
                let ceiling = record.ceiling(config);
                Self {
                    value: &mut record.current,
                    ceiling,
                    anchor: &mut record.last_recovery_at,
                    accumulated: &mut record.active_play_ms,
                    credited: &mut record.credited_play_ms,
                }
            }
            Counter::PersonalMax => Self {
                value: &mut record.personal_max,
                ceiling: config.max,
                anchor: &mut record.last_max_recovery_at,
                accumulated: &mut record.max_active_play_ms,
                credited: &mut record.credited_max_play_ms,
            },
        }
    }
}

/// One counter bound to its policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplenishingCounter {
    pub counter: Counter,
    pub policy: RecoveryPolicy,
}

impl ReplenishingCounter {
    pub const fn new(counter: Counter, policy: RecoveryPolicy) -> Self {
        Self { counter, policy }
    }

    /// Converts elapsed time into increments. Intervals are consumed even when
    /// the counter is already at its ceiling.
    pub fn replenish(
        &self,
        record: &mut PlayerRecord,
        config: &SoulConfig,
        now: Timestamp,
    ) -> Option<CounterGrant> {
        let view = CounterView::of(record, self.counter, config);
        let interval = self.policy.interval_ms();

        let intervals = match self.policy.mode {
            RecoveryMode::RealTime => {
                let intervals = now.saturating_since(*view.anchor) / interval;
                *view.anchor = view.anchor.plus_millis(intervals * interval);
                intervals
            }
            RecoveryMode::ActiveTime => {
                let pending = view.accumulated.saturating_sub(*view.credited);
                let intervals = pending / interval;
                *view.credited += intervals * interval;
                intervals
            }
        };
        if intervals == 0 {
            return None;
        }

        let before = *view.value;
        let raised = u64::from(before)
            .saturating_add(intervals)
            .min(u64::from(view.ceiling)) as u32;
        *view.value = before.max(raised);

        Some(CounterGrant {
            counter: self.counter,
            before,
            after: *view.value,
            intervals,
        })
    }

    /// Milliseconds until the next increment, `None` for an active-time
    /// counter of a player who is not online.
    pub fn time_until_next(&self, record: &PlayerRecord, now: Timestamp) -> Option<u64> {
        let interval = self.policy.interval_ms();
        match self.policy.mode {
            RecoveryMode::RealTime => {
                let anchor = match self.counter {
                    Counter::Points => record.last_recovery_at,
                    Counter::PersonalMax => record.last_max_recovery_at,
                };
                Some(interval.saturating_sub(now.saturating_since(anchor)))
            }
            RecoveryMode::ActiveTime => {
                let start = record.session_start?;
                let (accumulated, credited) = match self.counter {
                    Counter::Points => (record.active_play_ms, record.credited_play_ms),
                    Counter::PersonalMax => {
                        (record.max_active_play_ms, record.credited_max_play_ms)
                    }
                };
                let pending = accumulated
                    .saturating_sub(credited)
                    .saturating_add(now.saturating_since(start));
                Some(interval.saturating_sub(pending))
            }
        }
    }
}

/// Adds online time since the session start to every active-time
/// accumulator and restarts the session at `now`.
fn flush_session(record: &mut PlayerRecord, schedule: &RecoverySchedule, now: Timestamp) {
    let Some(start) = record.session_start else {
        return;
    };
    let elapsed = now.saturating_since(start);
    for counter in schedule.counters() {
        if counter.policy.mode != RecoveryMode::ActiveTime {
            continue;
        }
        match counter.counter {
            Counter::Points => record.active_play_ms += elapsed,
            Counter::PersonalMax => record.max_active_play_ms += elapsed,
        }
    }
    record.session_start = Some(now);
}

fn replenish_all(record: &mut PlayerRecord, config: &SoulConfig, now: Timestamp) -> Vec<CounterGrant> {
    config
        .recovery_schedule()
        .counters()
        .filter_map(|counter| counter.replenish(record, config, now))
        .collect()
}

/// Player came online: real-time counters catch up on offline time,
/// active-time counters start a fresh session.
pub fn on_join(record: &mut PlayerRecord, config: &SoulConfig, now: Timestamp) -> Vec<CounterGrant> {
    let schedule = config.recovery_schedule();
    record.session_start = schedule.uses_active_time().then_some(now);

    schedule
        .counters()
        .filter(|counter| counter.policy.mode == RecoveryMode::RealTime)
        .filter_map(|counter| counter.replenish(record, config, now))
        .collect()
}

/// Periodic tick for an online player.
pub fn sweep(record: &mut PlayerRecord, config: &SoulConfig, now: Timestamp) -> Vec<CounterGrant> {
    flush_session(record, &config.recovery_schedule(), now);
    replenish_all(record, config, now)
}

/// Player went offline: bank the session and end it.
pub fn on_quit(record: &mut PlayerRecord, config: &SoulConfig, now: Timestamp) -> Vec<CounterGrant> {
    flush_session(record, &config.recovery_schedule(), now);
    let grants = replenish_all(record, config, now);
    record.session_start = None;
    grants
}

/// Milliseconds until `counter` next regenerates, `None` when it does not
/// regenerate or is paused (active-time while offline).
pub fn time_until_next(
    record: &PlayerRecord,
    config: &SoulConfig,
    counter: Counter,
    now: Timestamp,
) -> Option<u64> {
    let policy = config.recovery_schedule().policy(counter)?;
    ReplenishingCounter::new(counter, policy).time_until_next(record, now)
}
