//! Persisted per-player state.
//!
//! A [`PlayerRecord`] is the only piece of durable data the system owns. The
//! runtime keys records by [`PlayerId`] and writes the whole map as one
//! document, so everything here must stay plain data.

use core::fmt;

use crate::config::SoulConfig;

/// Stable host-assigned player identifier (usually a UUID string).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Wall-clock instant in milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future.
    pub const fn saturating_since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub const fn plus_millis(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    pub const fn minus_millis(self, ms: u64) -> Self {
        Self(self.0.saturating_sub(ms))
    }
}

/// Durable soul-point state of one player.
///
/// Invariant: `0 <= current <= personal_max <= configured maximum`. Writers go
/// through [`PlayerRecord::set_current`] and [`PlayerRecord::set_personal_max`],
/// which re-clamp on every write.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct PlayerRecord {
    pub current: u32,
    pub personal_max: u32,
    /// Real-time recovery anchor for `current`.
    pub last_recovery_at: Timestamp,
    /// Real-time recovery anchor for `personal_max`.
    pub last_max_recovery_at: Timestamp,
    /// Total online time counted towards active-time recovery of `current`.
    pub active_play_ms: u64,
    /// Total online time counted towards active-time recovery of `personal_max`.
    pub max_active_play_ms: u64,
    /// Portion of `active_play_ms` already converted into points.
    pub credited_play_ms: u64,
    /// Portion of `max_active_play_ms` already converted into maximum.
    pub credited_max_play_ms: u64,
    pub session_start: Option<Timestamp>,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self {
            current: 0,
            personal_max: 0,
            last_recovery_at: Timestamp::default(),
            last_max_recovery_at: Timestamp::default(),
            active_play_ms: 0,
            max_active_play_ms: 0,
            credited_play_ms: 0,
            credited_max_play_ms: 0,
            session_start: None,
        }
    }
}

impl PlayerRecord {
    /// Creates a record with the configured starting values, anchored at `now`.
    pub fn new(config: &SoulConfig, now: Timestamp) -> Self {
        let mut record = Self {
            current: config.starting,
            personal_max: config.max,
            last_recovery_at: now,
            last_max_recovery_at: now,
            ..Self::default()
        };
        record.normalize(config);
        record
    }

    /// Ceiling for `current` under `config`.
    pub fn ceiling(&self, config: &SoulConfig) -> u32 {
        if config.max_points.enabled {
            self.personal_max.min(config.max)
        } else {
            config.max
        }
    }

    /// Sets `current`, clamped into `[0, ceiling]`. Returns the stored value.
    pub fn set_current(&mut self, value: i64, config: &SoulConfig) -> u32 {
        let ceiling = self.ceiling(config);
        self.current = clamp_to(value, ceiling);
        self.current
    }

    /// Sets `personal_max`, clamped into `[0, configured max]`, and re-clamps
    /// `current` against the new ceiling. Returns the stored value.
    pub fn set_personal_max(&mut self, value: i64, config: &SoulConfig) -> u32 {
        self.personal_max = clamp_to(value, config.max);
        let ceiling = self.ceiling(config);
        self.current = self.current.min(ceiling);
        self.personal_max
    }

    /// Restores the invariant after loading from storage or a config reload
    /// that lowered the configured maximum.
    pub fn normalize(&mut self, config: &SoulConfig) {
        self.personal_max = self.personal_max.min(config.max);
        self.current = self.current.min(self.ceiling(config));
        self.credited_play_ms = self.credited_play_ms.min(self.active_play_ms);
        self.credited_max_play_ms = self.credited_max_play_ms.min(self.max_active_play_ms);
    }
}

fn clamp_to(value: i64, ceiling: u32) -> u32 {
    value.clamp(0, i64::from(ceiling)) as u32
}
