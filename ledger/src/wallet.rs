//! Per-user coin wallet
//!
//! A wallet owns a balance, monotone lifetime totals, and the newest-first
//! transaction and reveal histories. Every mutation goes through a method
//! that keeps the accounting identity
//! `balance == total_earned + total_purchased + total_refunded - total_spent`
//! and refuses to drive the balance negative.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::transaction::{CoinTransaction, ContactReveal, TransactionKind};

/// A user's coin account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinWallet {
    user_id: String,
    balance: u64,
    total_earned: u64,
    total_spent: u64,
    total_purchased: u64,
    total_refunded: u64,
    /// Newest first
    transactions: VecDeque<CoinTransaction>,
    /// Newest first
    contact_reveals: VecDeque<ContactReveal>,
}

impl CoinWallet {
    /// Create an empty wallet for a user. Wallets are created on first
    /// authenticated access and live for the lifetime of the account.
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            balance: 0,
            total_earned: 0,
            total_spent: 0,
            total_purchased: 0,
            total_refunded: 0,
            transactions: VecDeque::new(),
            contact_reveals: VecDeque::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn total_earned(&self) -> u64 {
        self.total_earned
    }

    pub fn total_spent(&self) -> u64 {
        self.total_spent
    }

    pub fn total_purchased(&self) -> u64 {
        self.total_purchased
    }

    pub fn total_refunded(&self) -> u64 {
        self.total_refunded
    }

    /// Transaction history, newest first
    pub fn transactions(&self) -> &VecDeque<CoinTransaction> {
        &self.transactions
    }

    /// Reveal history, newest first
    pub fn contact_reveals(&self) -> &VecDeque<ContactReveal> {
        &self.contact_reveals
    }

    /// The existing reveal for a target, if this user already paid for it
    pub fn find_reveal(&self, target_id: &str) -> Option<&ContactReveal> {
        self.contact_reveals
            .iter()
            .find(|reveal| reveal.target_id == target_id)
    }

    pub fn find_reveal_by_id(&self, reveal_id: Uuid) -> Option<&ContactReveal> {
        self.contact_reveals
            .iter()
            .find(|reveal| reveal.id == reveal_id)
    }

    /// Whether a refund transaction already references this reveal
    pub fn has_refund_for(&self, reveal_id: Uuid) -> bool {
        self.transactions.iter().any(|tx| {
            tx.kind == TransactionKind::Refund && tx.related_reveal_id == Some(reveal_id)
        })
    }

    /// Coins earned (bonus transactions only) on the given business-day date
    pub fn earned_on(&self, date: NaiveDate, timezone: FixedOffset) -> u64 {
        self.transactions
            .iter()
            .filter(|tx| tx.kind == TransactionKind::Bonus)
            .filter(|tx| tx.created_at.with_timezone(&timezone).date_naive() == date)
            .map(|tx| tx.amount.max(0) as u64)
            .sum()
    }

    /// Completions of an earning activity on the given business-day date
    pub fn activity_count_on(&self, activity: &str, date: NaiveDate, timezone: FixedOffset) -> u32 {
        self.transactions
            .iter()
            .filter(|tx| tx.kind == TransactionKind::Bonus)
            .filter(|tx| tx.activity.as_deref() == Some(activity))
            .filter(|tx| tx.created_at.with_timezone(&timezone).date_naive() == date)
            .count() as u32
    }

    /// Credit purchased coins after the payment gateway approved the charge.
    ///
    /// Fails with [`LedgerError::InvalidAmount`] if the credit would overflow
    /// the wallet totals; the wallet is untouched in that case.
    pub fn credit_purchase(
        &mut self,
        coins: u64,
        description: String,
        now: DateTime<Utc>,
    ) -> Result<&CoinTransaction> {
        self.ensure_credit_fits(coins)?;
        let tx = CoinTransaction::new(
            &self.user_id,
            TransactionKind::Purchase,
            coins,
            description,
            now,
        );
        self.balance += coins;
        self.total_purchased += coins;
        Ok(self.push_transaction(tx))
    }

    /// Credit earned coins for a platform activity
    pub fn credit_bonus(
        &mut self,
        coins: u64,
        activity: &str,
        description: String,
        now: DateTime<Utc>,
    ) -> Result<&CoinTransaction> {
        self.ensure_credit_fits(coins)?;
        let tx = CoinTransaction::new(&self.user_id, TransactionKind::Bonus, coins, description, now)
            .with_activity(activity);
        self.balance += coins;
        self.total_earned += coins;
        Ok(self.push_transaction(tx))
    }

    /// Credit coins back for a previously charged reveal
    pub fn credit_refund(
        &mut self,
        coins: u64,
        reveal_id: Uuid,
        description: String,
        now: DateTime<Utc>,
    ) -> Result<&CoinTransaction> {
        self.ensure_credit_fits(coins)?;
        let tx =
            CoinTransaction::new(&self.user_id, TransactionKind::Refund, coins, description, now)
                .with_related_reveal(reveal_id);
        self.balance += coins;
        self.total_refunded += coins;
        Ok(self.push_transaction(tx))
    }

    /// Refuse credits that would wrap the lifetime totals.
    ///
    /// Guards the sum of the three credit totals; since the balance never
    /// exceeds that sum, the balance addition cannot wrap either. The plain
    /// sum below is safe because this guard has held for every prior credit.
    fn ensure_credit_fits(&self, coins: u64) -> Result<()> {
        let credits = self.total_earned + self.total_purchased + self.total_refunded;
        if credits.checked_add(coins).is_none() {
            return Err(LedgerError::InvalidAmount(format!(
                "crediting {} coins would overflow the wallet totals",
                coins
            )));
        }
        Ok(())
    }

    /// Deduct coins for a reveal; fails without touching the wallet when the
    /// balance does not cover the cost.
    pub fn spend(
        &mut self,
        coins: u64,
        job_id: &str,
        description: String,
        now: DateTime<Utc>,
    ) -> Result<&CoinTransaction> {
        if self.balance < coins {
            return Err(LedgerError::InsufficientCoins {
                required: coins,
                available: self.balance,
            });
        }

        let tx = CoinTransaction::new(&self.user_id, TransactionKind::Spend, coins, description, now)
            .with_related_job(job_id);
        self.balance -= coins;
        self.total_spent += coins;
        Ok(self.push_transaction(tx))
    }

    /// Record a completed reveal (the matching spend must already be booked)
    pub fn record_reveal(&mut self, reveal: ContactReveal) -> &ContactReveal {
        self.contact_reveals.push_front(reveal);
        &self.contact_reveals[0]
    }

    fn push_transaction(&mut self, tx: CoinTransaction) -> &CoinTransaction {
        self.transactions.push_front(tx);
        debug_assert!(self.check_identity(), "wallet accounting identity broken");
        &self.transactions[0]
    }

    fn check_identity(&self) -> bool {
        let credits = self.total_earned + self.total_purchased + self.total_refunded;
        credits >= self.total_spent && self.balance == credits - self.total_spent
    }
}
