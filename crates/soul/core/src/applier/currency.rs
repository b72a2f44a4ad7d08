use crate::penalty::{MoneyMode, MoneyPenalty};
use crate::record::PlayerId;

/// Response of a ledger withdrawal.
#[derive(Clone, Debug, PartialEq)]
pub struct Withdrawal {
    pub success: bool,
    pub amount: f64,
    /// Balance after the attempt.
    pub balance: f64,
    pub error: Option<String>,
}

impl Withdrawal {
    pub fn ok(amount: f64, balance: f64) -> Self {
        Self {
            success: true,
            amount,
            balance,
            error: None,
        }
    }

    pub fn failed(balance: f64, error: impl Into<String>) -> Self {
        Self {
            success: false,
            amount: 0.0,
            balance,
            error: Some(error.into()),
        }
    }
}

/// External currency store.
pub trait CurrencyLedger: Send + Sync {
    fn balance(&self, player: &PlayerId) -> f64;

    fn withdraw(&self, player: &PlayerId, amount: f64) -> Withdrawal;
}

/// What happened to the player's currency.
#[derive(Clone, Debug, PartialEq)]
pub enum CurrencyStatus {
    /// No ledger is attached.
    NoLedger,
    /// The resolved amount was zero or negative.
    NoPenalty,
    /// Ledger accepted the withdrawal (possibly of zero).
    Withdrawn,
    /// Ledger refused; nothing was taken.
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CurrencyOutcome {
    pub amount_lost: f64,
    pub remaining_balance: f64,
    pub depleted: bool,
    pub status: CurrencyStatus,
}

impl CurrencyOutcome {
    fn untouched(status: CurrencyStatus) -> Self {
        Self {
            amount_lost: 0.0,
            remaining_balance: 0.0,
            depleted: false,
            status,
        }
    }
}

/// Amount a penalty asks for against `balance`, before clamping.
pub fn requested_amount(penalty: &MoneyPenalty, balance: f64) -> f64 {
    match penalty.mode {
        MoneyMode::Flat => penalty.amount,
        MoneyMode::Percent => balance.max(0.0) * penalty.amount / 100.0,
    }
}

/// Withdraws the currency penalty from `player`.
///
/// Percent penalties use the balance read immediately before withdrawal. The
/// withdrawal is clamped to `[0, balance]`, so the balance never goes negative
/// through this path.
pub fn apply_currency_penalty(
    ledger: Option<&dyn CurrencyLedger>,
    player: &PlayerId,
    penalty: &MoneyPenalty,
    epsilon: f64,
) -> CurrencyOutcome {
    let Some(ledger) = ledger else {
        return CurrencyOutcome::untouched(CurrencyStatus::NoLedger);
    };
    if penalty.amount <= 0.0 {
        return CurrencyOutcome::untouched(CurrencyStatus::NoPenalty);
    }

    let balance = ledger.balance(player);
    let to_withdraw = requested_amount(penalty, balance).clamp(0.0, balance.max(0.0));

    if to_withdraw <= 0.0 {
        return CurrencyOutcome {
            amount_lost: 0.0,
            remaining_balance: balance,
            depleted: balance <= epsilon,
            status: CurrencyStatus::Withdrawn,
        };
    }

    let response = ledger.withdraw(player, to_withdraw);
    if response.success {
        CurrencyOutcome {
            amount_lost: response.amount,
            remaining_balance: response.balance,
            depleted: response.balance <= epsilon,
            status: CurrencyStatus::Withdrawn,
        }
    } else {
        let remaining = ledger.balance(player);
        CurrencyOutcome {
            amount_lost: 0.0,
            remaining_balance: remaining,
            depleted: remaining <= epsilon,
            status: CurrencyStatus::Failed(
                response
                    .error
                    .unwrap_or_else(|| "withdrawal refused".to_owned()),
            ),
        }
    }
}
