use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::ConfigError;

/// Unrecognised mode keyword in a penalty definition.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} mode '{value}'")]
pub struct ParseModeError {
    pub kind: &'static str,
    pub value: String,
}

/// How a currency penalty amount is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MoneyMode {
    /// Fixed amount of currency.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "absolute"))]
    Flat,
    /// Percentage of the balance at the moment of withdrawal.
    #[cfg_attr(feature = "serde", serde(alias = "percentage"))]
    Percent,
}

impl FromStr for MoneyMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" | "absolute" => Ok(Self::Flat),
            "percent" | "percentage" => Ok(Self::Percent),
            _ => Err(ParseModeError {
                kind: "money",
                value: s.to_owned(),
            }),
        }
    }
}

/// Direction of the max-health modifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum HealthMode {
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "loss", alias = "subtract"))]
    Remove,
    #[cfg_attr(feature = "serde", serde(alias = "bonus", alias = "increase"))]
    Add,
}

impl FromStr for HealthMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remove" | "loss" | "subtract" => Ok(Self::Remove),
            "add" | "bonus" | "increase" => Ok(Self::Add),
            _ => Err(ParseModeError {
                kind: "max-health",
                value: s.to_owned(),
            }),
        }
    }
}

/// Currency taken on death.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoneyPenalty {
    pub amount: f64,
    pub mode: MoneyMode,
}

impl MoneyPenalty {
    pub const NONE: Self = Self {
        amount: 0.0,
        mode: MoneyMode::Flat,
    };

    pub const fn flat(amount: f64) -> Self {
        Self {
            amount,
            mode: MoneyMode::Flat,
        }
    }

    pub const fn percent(amount: f64) -> Self {
        Self {
            amount,
            mode: MoneyMode::Percent,
        }
    }
}

/// Temporary max-health change, in hearts (one heart is two health points).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaxHealthPenalty {
    /// Non-negative magnitude; the direction comes from `mode`.
    pub amount: f64,
    pub mode: HealthMode,
}

impl MaxHealthPenalty {
    pub const NONE: Self = Self {
        amount: 0.0,
        mode: HealthMode::Remove,
    };

    pub fn new(amount: f64, mode: HealthMode) -> Self {
        Self {
            amount: amount.abs(),
            mode,
        }
    }
}

/// Item-drop rules of a tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct ItemPenalty {
    /// Share of vulnerable units dropped; values above 100 behave as 100.
    pub drop_percent: u32,
    pub hotbar: bool,
    pub armor: bool,
}

impl ItemPenalty {
    pub const NONE: Self = Self {
        drop_percent: 0,
        hotbar: false,
        armor: false,
    };

    pub const fn new(drop_percent: u32, hotbar: bool, armor: bool) -> Self {
        Self {
            drop_percent,
            hotbar,
            armor,
        }
    }
}

/// Sparse penalty definition for one level. Unset dimensions are inherited
/// from the next defined tier above, then from the defaults.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case", default)
)]
pub struct PenaltyTier {
    pub items: Option<ItemPenalty>,
    pub money: Option<MoneyPenalty>,
    pub max_health: Option<MaxHealthPenalty>,
    pub commands: Option<Vec<String>>,
}

impl PenaltyTier {
    pub fn with_items(mut self, items: ItemPenalty) -> Self {
        self.items = Some(items);
        self
    }

    pub fn with_money(mut self, money: MoneyPenalty) -> Self {
        self.money = Some(money);
        self
    }

    pub fn with_max_health(mut self, max_health: MaxHealthPenalty) -> Self {
        self.max_health = Some(max_health);
        self
    }

    pub fn with_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands = Some(commands.into_iter().map(Into::into).collect());
        self
    }
}

/// Fallback values used when no tier at or above the level defines a
/// dimension. Commands have no default.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case", default)
)]
pub struct PenaltyDefaults {
    pub items: ItemPenalty,
    pub money: MoneyPenalty,
    pub max_health: MaxHealthPenalty,
}

/// Ordered tiers plus the default record.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case", default)
)]
pub struct PenaltyTable {
    pub defaults: PenaltyDefaults,
    pub tiers: BTreeMap<u32, PenaltyTier>,
}

impl PenaltyTable {
    pub fn new(defaults: PenaltyDefaults) -> Self {
        Self {
            defaults,
            tiers: BTreeMap::new(),
        }
    }

    pub fn with_tier(mut self, level: u32, tier: PenaltyTier) -> Self {
        self.tiers.insert(level, tier);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        check_amounts("default penalty", &self.defaults.money, &self.defaults.max_health)?;
        for (level, tier) in &self.tiers {
            let money = tier.money.unwrap_or(MoneyPenalty::NONE);
            let health = tier.max_health.unwrap_or(MaxHealthPenalty::NONE);
            check_amounts(&format!("tier {level}"), &money, &health)?;
        }
        Ok(())
    }
}

fn check_amounts(
    tier: &str,
    money: &MoneyPenalty,
    health: &MaxHealthPenalty,
) -> Result<(), ConfigError> {
    if money.amount.is_finite() && health.amount.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteAmount {
            tier: tier.to_owned(),
        })
    }
}
