//! Soul-point rules: limits, recovery policies and the penalty table.

use crate::error::ConfigError;
use crate::penalty::{PenaltyParameters, PenaltyTable};
use crate::recovery::RecoverySchedule;

/// How a counter regenerates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum RecoveryMode {
    /// Wall-clock time since the anchor, online or not.
    #[default]
    RealTime,
    /// Accumulated online time only.
    ActiveTime,
}

/// Regeneration settings for one counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct RecoveryPolicy {
    pub mode: RecoveryMode,
    pub interval_seconds: u64,
}

impl RecoveryPolicy {
    pub const DEFAULT_INTERVAL_SECONDS: u64 = 3600;

    pub const fn new(mode: RecoveryMode, interval_seconds: u64) -> Self {
        Self {
            mode,
            interval_seconds,
        }
    }

    /// Interval in milliseconds, never below one second.
    pub const fn interval_ms(&self) -> u64 {
        let seconds = if self.interval_seconds == 0 {
            1
        } else {
            self.interval_seconds
        };
        seconds.saturating_mul(1000)
    }
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self::new(RecoveryMode::RealTime, Self::DEFAULT_INTERVAL_SECONDS)
    }
}

/// Personal-maximum settings: PvP reduction and its own regeneration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct MaxPointsConfig {
    pub enabled: bool,
    pub reduction_per_kill: u32,
    pub regeneration_enabled: bool,
    pub regeneration: RecoveryPolicy,
}

impl MaxPointsConfig {
    pub const DEFAULT_REDUCTION_PER_KILL: u32 = 1;
    pub const DEFAULT_REGENERATION_SECONDS: u64 = 86_400;
}

impl Default for MaxPointsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reduction_per_kill: Self::DEFAULT_REDUCTION_PER_KILL,
            regeneration_enabled: true,
            regeneration: RecoveryPolicy::new(
                RecoveryMode::RealTime,
                Self::DEFAULT_REGENERATION_SECONDS,
            ),
        }
    }
}

/// Soul-point configuration.
///
/// `enabled` is read at every entry point; a disabled system keeps serving
/// reads but performs no penalties, recovery or writes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case", default)
)]
pub struct SoulConfig {
    pub enabled: bool,
    pub starting: u32,
    pub max: u32,
    pub recovery: RecoveryPolicy,
    pub max_points: MaxPointsConfig,
    pub penalties: PenaltyTable,
    /// Lowest max health (in health points) a remove-mode penalty may leave.
    pub min_max_health: f64,
    /// Balances at or below this are reported as depleted.
    pub balance_epsilon: f64,
}

impl SoulConfig {
    pub const DEFAULT_STARTING: u32 = 10;
    pub const DEFAULT_MAX: u32 = 10;
    pub const DEFAULT_MIN_MAX_HEALTH: f64 = 2.0;
    pub const DEFAULT_BALANCE_EPSILON: f64 = 0.0001;

    pub fn new() -> Self {
        Self {
            enabled: true,
            starting: Self::DEFAULT_STARTING,
            max: Self::DEFAULT_MAX,
            recovery: RecoveryPolicy::default(),
            max_points: MaxPointsConfig::default(),
            penalties: PenaltyTable::default(),
            min_max_health: Self::DEFAULT_MIN_MAX_HEALTH,
            balance_epsilon: Self::DEFAULT_BALANCE_EPSILON,
        }
    }

    pub fn with_penalties(mut self, penalties: PenaltyTable) -> Self {
        self.penalties = penalties;
        self
    }

    pub fn with_recovery(mut self, recovery: RecoveryPolicy) -> Self {
        self.recovery = recovery;
        self
    }

    /// Penalty parameters for a player holding `level` points. While the
    /// system is disabled only the default record applies.
    pub fn drop_rates(&self, level: u32) -> PenaltyParameters {
        if !self.enabled {
            return self.penalties.defaults_only();
        }
        self.penalties.resolve(level, self.max)
    }

    /// Recovery policies for both counters, personal maximum omitted when
    /// its regeneration is switched off.
    pub fn recovery_schedule(&self) -> RecoverySchedule {
        let personal_max = (self.max_points.enabled && self.max_points.regeneration_enabled)
            .then_some(self.max_points.regeneration);
        RecoverySchedule {
            points: self.recovery,
            personal_max,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max == 0 {
            return Err(ConfigError::ZeroMaximum);
        }
        if self.starting > self.max {
            return Err(ConfigError::StartingAboveMaximum {
                starting: self.starting,
                max: self.max,
            });
        }
        if self.recovery.interval_seconds == 0 {
            return Err(ConfigError::ZeroInterval { counter: "soul point" });
        }
        if self.max_points.regeneration_enabled && self.max_points.regeneration.interval_seconds == 0
        {
            return Err(ConfigError::ZeroInterval {
                counter: "max soul point",
            });
        }
        if !self.min_max_health.is_finite() || self.min_max_health <= 0.0 {
            return Err(ConfigError::InvalidHealthFloor(self.min_max_health));
        }
        if !self.balance_epsilon.is_finite() || self.balance_epsilon < 0.0 {
            return Err(ConfigError::InvalidEpsilon(self.balance_epsilon));
        }
        self.penalties.validate()
    }
}

impl Default for SoulConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::penalty::{ItemPenalty, PenaltyTier};

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SoulConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_starting_above_max() {
        let config = SoulConfig {
            starting: 12,
            ..SoulConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::StartingAboveMaximum {
                starting: 12,
                max: 10
            })
        );
    }

    #[test]
    fn disabled_config_reports_default_rates() {
        let penalties = PenaltyTable::default().with_tier(
            0,
            PenaltyTier::default().with_items(ItemPenalty::new(100, true, true)),
        );
        let mut config = SoulConfig::default().with_penalties(penalties);
        assert_eq!(config.drop_rates(0).item_drop_percent, 100);

        config.enabled = false;
        let rates = config.drop_rates(0);
        assert_eq!(rates.item_drop_percent, 0);
        assert!(!rates.hotbar_vulnerable);
        assert!(rates.commands.is_empty());
    }

    #[test]
    fn zero_interval_is_clamped_to_one_second() {
        let policy = RecoveryPolicy::new(RecoveryMode::ActiveTime, 0);
        assert_eq!(policy.interval_ms(), 1000);
    }

    #[test]
    fn schedule_omits_max_counter_when_regeneration_off() {
        let mut config = SoulConfig::default();
        assert!(config.recovery_schedule().personal_max.is_some());

        config.max_points.regeneration_enabled = false;
        assert!(config.recovery_schedule().personal_max.is_none());
    }
}
