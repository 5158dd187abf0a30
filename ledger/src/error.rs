//! Ledger error types

use thiserror::Error;
use uuid::Uuid;

/// Coin ledger errors
///
/// Every variant is a typed outcome, not a fatal condition: after any of
/// these the wallet is unchanged, valid and queryable.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Insufficient coins: need {required}, have {available}")]
    InsufficientCoins { required: u64, available: u64 },

    #[error("Daily earning limit reached: earned {earned_today} of {max_daily} today")]
    DailyLimitReached { earned_today: u64, max_daily: u64 },

    #[error("Activity '{activity}' already completed {limit} time(s) today")]
    ActivityLimitReached { activity: String, limit: u32 },

    #[error("Unknown or zero-rate earning activity: {0}")]
    InvalidEarningType(String),

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Reveal {0} was already refunded")]
    AlreadyRefunded(Uuid),

    #[error("Reveal not found: {0}")]
    RevealNotFound(Uuid),
}

impl LedgerError {
    /// Expected business conditions a UI should explain to the user.
    ///
    /// The remaining variants indicate a bug in the calling code (bad
    /// activity key, zero purchase, refunding the wrong reveal) and should be
    /// logged and fixed rather than shown as a normal flow.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            LedgerError::InsufficientCoins { .. }
                | LedgerError::DailyLimitReached { .. }
                | LedgerError::ActivityLimitReached { .. }
                | LedgerError::PaymentFailed(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
