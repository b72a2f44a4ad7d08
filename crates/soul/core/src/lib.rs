//! Deterministic soul-point rules shared by the runtime and offline tools.
//!
//! `soul-core` owns the data model and every pure decision of the death
//! penalty system:
//!
//! | Module | Responsibility |
//! |---|---|
//! | [`record`] | Persisted per-player state and its clamping invariant |
//! | [`penalty`] | Sparse tier table and per-dimension cascading resolver |
//! | [`inventory`] | Forfeited/retained partition and slot reconstruction |
//! | [`applier`] | Currency withdrawal and max-health modifier |
//! | [`recovery`] | Real-time / active-time replenishing counters |
//!
//! Host interaction (ledger, health attribute) is expressed as traits; the
//! runtime crate supplies scheduling, persistence and logging.
pub mod applier;
pub mod config;
pub mod error;
pub mod inventory;
pub mod penalty;
pub mod record;
pub mod recovery;
pub mod rng;

pub use applier::{
    CurrencyLedger, CurrencyOutcome, CurrencyStatus, HealthAttribute, HealthOutcome,
    MAX_HEALTH_MODIFIER_ID, SimpleHealth, Withdrawal, apply_currency_penalty,
    apply_max_health_penalty,
};
pub use config::{MaxPointsConfig, RecoveryMode, RecoveryPolicy, SoulConfig};
pub use error::{ConfigError, ErrorSeverity, SoulError};
pub use inventory::{
    ArmorPiece, InventorySnapshot, ItemEntry, ItemKey, ItemStack, Partition, SlotCategory,
    partition, reconstruct,
};
pub use penalty::{
    HealthMode, ItemPenalty, MaxHealthPenalty, MoneyMode, MoneyPenalty, PenaltyDefaults,
    PenaltyParameters, PenaltyTable, PenaltyTier,
};
pub use record::{PlayerId, PlayerRecord, Timestamp};
pub use recovery::{Counter, CounterGrant, RecoverySchedule, ReplenishingCounter};
pub use rng::PcgRng;
