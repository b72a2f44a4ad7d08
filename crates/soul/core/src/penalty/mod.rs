//! Tiered penalty configuration and its resolver.
//!
//! Tiers are sparse: each may define any subset of item, money, max-health and
//! command penalties. [`PenaltyTable::resolve`] fills every dimension from the
//! nearest defining tier at or above the requested level.
mod resolve;
mod tier;

pub use resolve::{PLAYER_PLACEHOLDER, PenaltyParameters};
pub use tier::{
    HealthMode, ItemPenalty, MaxHealthPenalty, MoneyMode, MoneyPenalty, ParseModeError,
    PenaltyDefaults, PenaltyTable, PenaltyTier,
};
