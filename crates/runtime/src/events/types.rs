//! Event payloads published by the runtime.

use soul_core::{Counter, ItemKey, PlayerId};

/// Why a counter changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeReason {
    Death,
    Recovery,
    /// Administrative command.
    Command,
    /// Programmatic call from another plugin.
    Api,
    PvpKill,
}

/// A counter moved from `old` to `new`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterChange {
    pub player: PlayerId,
    pub counter: Counter,
    pub old: u32,
    pub new: u32,
    pub reason: ChangeReason,
}

impl CounterChange {
    pub fn is_decrease(&self) -> bool {
        self.new < self.old
    }
}

/// Everything a messaging layer needs to tell a player what a death cost.
#[derive(Clone, Debug, PartialEq)]
pub struct DeathReport {
    pub player: PlayerId,
    pub old_points: u32,
    pub new_points: u32,
    pub items_dropped: usize,
    /// Units the tier exposed to loss; protected hotbar and armor slots are
    /// not counted.
    pub items_total: usize,
    /// Most-dropped item kinds, highest count first.
    pub top_dropped: Vec<(ItemKey, u32)>,
    pub money_lost: f64,
    pub remaining_balance: Option<f64>,
    pub balance_depleted: bool,
    /// Hearts removed by the max-health penalty (negative when added).
    pub hearts_applied: f64,
    pub hearts_delta: f64,
    /// Drops are waiting for a grave collector.
    pub awaiting_claim: bool,
}

/// How pending death drops left the pending state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropRelease {
    /// The grave collector took the items.
    Claimed,
    /// Nobody claimed them; they were spawned at the death location.
    TimedOut,
    /// A later death replaced them before anyone claimed them; the items
    /// were spawned and the kept inventory carried into the newer drop.
    Superseded,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SoulEvent {
    CounterChanged(CounterChange),
    DeathPenaltyApplied(DeathReport),
    DropsReleased {
        player: PlayerId,
        release: DropRelease,
    },
}
