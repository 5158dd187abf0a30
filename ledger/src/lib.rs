//! Rozgar Coin Ledger Module
//!
//! The single source of truth for user coin balances:
//! - Coin purchase crediting through a payment gateway seam
//! - Contact reveals with dynamic pricing and idempotent re-access
//! - Activity-based earning with daily limits
//! - Per-user transaction and reveal history
//!
//! All balance-mutating operations are serialized per user; wallets are
//! fully independent of each other.

pub mod earning;
pub mod error;
pub mod ledger;
pub mod payment;
pub mod transaction;
pub mod wallet;

pub use earning::EarningPolicy;
pub use error::{LedgerError, Result};
pub use ledger::{CoinLedger, MAX_PURCHASE_COINS};
pub use payment::{
    ApprovingGateway, DecliningGateway, PaymentGateway, PaymentOutcome, PaymentRequest,
    ScriptedGateway,
};
pub use transaction::{
    CoinTransaction, ContactInfo, ContactReveal, RevealTarget, TransactionKind,
};
pub use wallet::CoinWallet;

/// Business timezone used for the "daily" earning window (IST, UTC+05:30)
pub fn default_timezone() -> chrono::FixedOffset {
    chrono::FixedOffset::east_opt(5 * 3600 + 1800).expect("IST offset is valid")
}
