//! Immutable ledger records: transactions and contact reveals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rozgar_pricing::{DynamicCoinCost, ListingAttributes};

/// Closed set of balance-affecting transaction kinds.
///
/// Adding a kind is a compile-time-checked change: every match over this
/// enum is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Coins bought through the payment gateway
    Purchase,
    /// Coins deducted for a contact reveal
    Spend,
    /// Coins awarded for a platform activity
    Bonus,
    /// Coins credited back for a previously charged reveal
    Refund,
}

impl TransactionKind {
    /// Sign the given coin count according to the kind: spends debit,
    /// everything else credits.
    pub fn signed_amount(self, coins: u64) -> i64 {
        match self {
            TransactionKind::Spend => -(coins as i64),
            TransactionKind::Purchase | TransactionKind::Bonus | TransactionKind::Refund => {
                coins as i64
            }
        }
    }
}

/// A single immutable ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinTransaction {
    pub id: Uuid,
    pub user_id: String,
    pub kind: TransactionKind,
    /// Signed coin delta: positive for purchase/bonus/refund, negative for spend
    pub amount: i64,
    pub description: String,
    /// Earning activity type, set on bonus transactions
    pub activity: Option<String>,
    /// Job or worker the transaction relates to, set on spends
    pub related_job_id: Option<String>,
    /// Reveal a refund reverses, set on refunds
    pub related_reveal_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl CoinTransaction {
    pub fn new(
        user_id: &str,
        kind: TransactionKind,
        coins: u64,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            kind,
            amount: kind.signed_amount(coins),
            description,
            activity: None,
            related_job_id: None,
            related_reveal_id: None,
            created_at,
        }
    }

    pub fn with_activity(mut self, activity: &str) -> Self {
        self.activity = Some(activity.to_string());
        self
    }

    pub fn with_related_job(mut self, job_id: &str) -> Self {
        self.related_job_id = Some(job_id.to_string());
        self
    }

    pub fn with_related_reveal(mut self, reveal_id: Uuid) -> Self {
        self.related_reveal_id = Some(reveal_id);
        self
    }
}

/// Contact payload supplied by the job/worker catalog once a reveal clears
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: String,
    pub business_name: Option<String>,
    pub address: Option<String>,
}

/// What the catalog hands the ledger when a user asks to unlock a listing
#[derive(Debug, Clone)]
pub struct RevealTarget {
    /// Job or worker identifier the reveal is scoped to
    pub target_id: String,
    pub attributes: ListingAttributes,
    pub contact_info: ContactInfo,
}

/// Permanent proof-of-purchase for an unlocked contact.
///
/// The embedded cost is a snapshot from the moment of the reveal; later
/// pricing changes never alter it, and re-revealing the same target returns
/// this record at no charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactReveal {
    pub id: Uuid,
    pub revealer_id: String,
    pub target_id: String,
    pub coins_spent: u64,
    pub dynamic_cost: DynamicCoinCost,
    pub contact_info: ContactInfo,
    pub revealed_at: DateTime<Utc>,
}
