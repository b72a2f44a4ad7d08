//! Currency and max-health penalties.
//!
//! Both appliers are independent: one failing or being skipped never affects
//! the other. Neither touches the soul-point record.
mod currency;
mod health;

pub use currency::{
    CurrencyLedger, CurrencyOutcome, CurrencyStatus, Withdrawal, apply_currency_penalty,
    requested_amount,
};
pub use health::{
    HEALTH_PER_HEART, HealthAttribute, HealthOutcome, MAX_HEALTH_MODIFIER_ID, SimpleHealth,
    apply_max_health_penalty,
};
