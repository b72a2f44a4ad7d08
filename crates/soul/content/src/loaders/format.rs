//! On-disk TOML shape and its conversion into core types.

use std::collections::BTreeMap;

use anyhow::Context;
use serde::Deserialize;
use soul_core::{
    HealthMode, ItemPenalty, MaxHealthPenalty, MaxPointsConfig, MoneyMode, MoneyPenalty,
    PenaltyDefaults, PenaltyTable, PenaltyTier, RecoveryMode, RecoveryPolicy, SoulConfig,
};

use super::LoadResult;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub(crate) struct RawConfig {
    enabled: Option<bool>,
    starting: Option<u32>,
    max: Option<u32>,
    recovery: Option<RawRecovery>,
    max_points: Option<RawMaxPoints>,
    min_max_health: Option<f64>,
    balance_epsilon: Option<f64>,
    default_penalty: Option<RawTier>,
    drop_rates: BTreeMap<String, RawTier>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct RawRecovery {
    mode: Option<RecoveryMode>,
    interval_seconds: Option<u64>,
}

impl RawRecovery {
    fn into_policy(self, fallback: RecoveryPolicy) -> RecoveryPolicy {
        RecoveryPolicy::new(
            self.mode.unwrap_or(fallback.mode),
            self.interval_seconds.unwrap_or(fallback.interval_seconds),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct RawMaxPoints {
    enabled: Option<bool>,
    reduction_per_kill: Option<u32>,
    regeneration: Option<RawRegeneration>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct RawRegeneration {
    enabled: Option<bool>,
    mode: Option<RecoveryMode>,
    interval_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct RawTier {
    items: Option<RawItems>,
    // Flat keys from older configs; only read when `items` is absent.
    item_drop: Option<i64>,
    hotbar_drop: Option<bool>,
    armor_drop: Option<bool>,
    money: Option<RawAmount>,
    max_health: Option<RawAmount>,
    commands: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct RawItems {
    drop_percent: Option<i64>,
    hotbar: Option<bool>,
    armor: Option<bool>,
}

/// `money = 50` or `money = { amount = 10, mode = "percent" }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Scalar(f64),
    Detailed { amount: f64, mode: Option<String> },
}

impl RawAmount {
    fn split(self) -> (f64, Option<String>) {
        match self {
            Self::Scalar(amount) => (amount, None),
            Self::Detailed { amount, mode } => (amount, mode),
        }
    }

    fn into_money(self) -> LoadResult<MoneyPenalty> {
        let (amount, mode) = self.split();
        let mode = match mode {
            Some(mode) => mode.parse::<MoneyMode>()?,
            None => MoneyMode::Flat,
        };
        Ok(MoneyPenalty { amount, mode })
    }

    fn into_max_health(self) -> LoadResult<MaxHealthPenalty> {
        let (amount, mode) = self.split();
        let mode = match mode {
            Some(mode) => mode.parse::<HealthMode>()?,
            None => HealthMode::Remove,
        };
        Ok(MaxHealthPenalty::new(amount, mode))
    }
}

impl RawTier {
    /// Item rules, or `None` when the tier leaves them undefined. A negative
    /// drop percent counts as undefined.
    fn items(&self) -> Option<ItemPenalty> {
        let (percent, hotbar, armor) = match &self.items {
            Some(items) => (items.drop_percent, items.hotbar, items.armor),
            None => (self.item_drop, self.hotbar_drop, self.armor_drop),
        };
        let percent = u32::try_from(percent?).ok()?;
        Some(ItemPenalty::new(
            percent,
            hotbar.unwrap_or(false),
            armor.unwrap_or(false),
        ))
    }

    fn into_tier(self) -> LoadResult<PenaltyTier> {
        let items = self.items();
        Ok(PenaltyTier {
            items,
            money: self.money.map(RawAmount::into_money).transpose()?,
            max_health: self.max_health.map(RawAmount::into_max_health).transpose()?,
            commands: self.commands,
        })
    }

    fn into_defaults(self) -> LoadResult<PenaltyDefaults> {
        let tier = self.into_tier()?;
        Ok(PenaltyDefaults {
            items: tier.items.unwrap_or(ItemPenalty::NONE),
            money: tier.money.unwrap_or(MoneyPenalty::NONE),
            max_health: tier.max_health.unwrap_or(MaxHealthPenalty::NONE),
        })
    }
}

impl RawConfig {
    pub(crate) fn into_config(self) -> LoadResult<SoulConfig> {
        let base = SoulConfig::default();
        let max_base = MaxPointsConfig::default();

        let max_points = match self.max_points {
            Some(raw) => {
                let regeneration = raw.regeneration.unwrap_or_default();
                MaxPointsConfig {
                    enabled: raw.enabled.unwrap_or(max_base.enabled),
                    reduction_per_kill: raw
                        .reduction_per_kill
                        .unwrap_or(max_base.reduction_per_kill),
                    regeneration_enabled: regeneration
                        .enabled
                        .unwrap_or(max_base.regeneration_enabled),
                    regeneration: RawRecovery {
                        mode: regeneration.mode,
                        interval_seconds: regeneration.interval_seconds,
                    }
                    .into_policy(max_base.regeneration),
                }
            }
            None => max_base,
        };

        let defaults = match self.default_penalty {
            Some(raw) => raw
                .into_defaults()
                .context("Invalid default-penalty section")?,
            None => PenaltyDefaults::default(),
        };
        let mut penalties = PenaltyTable::new(defaults);
        for (key, raw) in self.drop_rates {
            let level: u32 = key
                .trim()
                .parse()
                .with_context(|| format!("Drop-rate tier key '{key}' is not a level"))?;
            let tier = raw
                .into_tier()
                .with_context(|| format!("Invalid drop-rate tier {level}"))?;
            penalties.tiers.insert(level, tier);
        }

        Ok(SoulConfig {
            enabled: self.enabled.unwrap_or(base.enabled),
            starting: self.starting.unwrap_or(base.starting),
            max: self.max.unwrap_or(base.max),
            recovery: self
                .recovery
                .unwrap_or_default()
                .into_policy(base.recovery),
            max_points,
            penalties,
            min_max_health: self.min_max_health.unwrap_or(base.min_max_health),
            balance_epsilon: self.balance_epsilon.unwrap_or(base.balance_epsilon),
        })
    }
}
