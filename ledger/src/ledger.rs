//! The coin ledger: single source of truth for balances
//!
//! One wallet per user, guarded by its own mutex. Every mutating operation
//! locks the wallet for its whole read-check-write sequence, so concurrent
//! calls for the same user serialize and the balance, totals and histories
//! always move together. Wallets of different users share nothing.

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

use crate::earning::EarningPolicy;
use crate::error::{LedgerError, Result};
use crate::payment::{PaymentGateway, PaymentRequest};
use crate::transaction::{CoinTransaction, ContactReveal, RevealTarget};
use crate::wallet::CoinWallet;
use rozgar_pricing::{calculate_contact_cost, PricingSettings};

/// Largest single coin purchase the ledger accepts.
///
/// Bounds the credit path long before `u64` arithmetic could wrap, and is
/// checked before the payment gateway is charged so an absurd amount never
/// costs the user real money.
pub const MAX_PURCHASE_COINS: u64 = 1_000_000;

pub struct CoinLedger {
    settings: Arc<PricingSettings>,
    gateway: Arc<dyn PaymentGateway>,
    policy: EarningPolicy,
    wallets: DashMap<String, Arc<Mutex<CoinWallet>>>,
}

impl CoinLedger {
    /// Ledger using the default business timezone (IST)
    pub fn new(settings: Arc<PricingSettings>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self::with_policy(settings, gateway, EarningPolicy::default())
    }

    pub fn with_policy(
        settings: Arc<PricingSettings>,
        gateway: Arc<dyn PaymentGateway>,
        policy: EarningPolicy,
    ) -> Self {
        Self {
            settings,
            gateway,
            policy,
            wallets: DashMap::new(),
        }
    }

    /// Wallet handle for a user, created empty on first access
    fn wallet(&self, user_id: &str) -> Arc<Mutex<CoinWallet>> {
        self.wallets
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(CoinWallet::new(user_id))))
            .clone()
    }

    /// Buy coins through the payment gateway.
    ///
    /// The gateway is called before the wallet lock is taken; a declined
    /// charge leaves the wallet untouched and surfaces as
    /// [`LedgerError::PaymentFailed`].
    pub fn purchase(&self, user_id: &str, coins: u64, method: &str) -> Result<CoinTransaction> {
        if coins == 0 {
            return Err(LedgerError::InvalidAmount(
                "purchase must be at least 1 coin".to_string(),
            ));
        }
        if coins > MAX_PURCHASE_COINS {
            return Err(LedgerError::InvalidAmount(format!(
                "purchase of {} coins exceeds the {} coin limit",
                coins, MAX_PURCHASE_COINS
            )));
        }

        let request = PaymentRequest {
            user_id: user_id.to_string(),
            coins,
            method: method.to_string(),
        };
        let outcome = self.gateway.process_payment(&request);
        if !outcome.approved {
            let reason = outcome
                .decline_reason
                .unwrap_or_else(|| "declined".to_string());
            log::warn!("payment declined for {}: {}", user_id, reason);
            return Err(LedgerError::PaymentFailed(reason));
        }

        let description = match &outcome.reference {
            Some(reference) => format!("Purchased {} coins (ref {})", coins, reference),
            None => format!("Purchased {} coins", coins),
        };

        let handle = self.wallet(user_id);
        let mut wallet = handle.lock();
        let tx = wallet.credit_purchase(coins, description, Utc::now())?.clone();
        log::info!(
            "{} purchased {} coins via {}, balance {}",
            user_id,
            coins,
            method,
            wallet.balance()
        );
        Ok(tx)
    }

    /// Unlock a listing's contact details, charging the dynamic price.
    ///
    /// Idempotent per `(user, target)`: if the user already paid for this
    /// target the existing reveal is returned at no charge, regardless of any
    /// pricing changes since. Otherwise the current price is computed, the
    /// coins are deducted and the reveal is recorded, all under the wallet
    /// lock.
    pub fn reveal_contact(&self, user_id: &str, target: &RevealTarget) -> Result<ContactReveal> {
        let handle = self.wallet(user_id);
        let mut wallet = handle.lock();

        if let Some(existing) = wallet.find_reveal(&target.target_id) {
            log::debug!(
                "{} re-opened reveal for {} at no charge",
                user_id,
                target.target_id
            );
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let config = self.settings.get();
        let cost = calculate_contact_cost(&target.attributes, &config, now);

        wallet.spend(
            cost.final_cost,
            &target.target_id,
            format!(
                "Revealed contact for {} ({} coins)",
                target.target_id, cost.final_cost
            ),
            now,
        )?;

        let reveal = ContactReveal {
            id: Uuid::new_v4(),
            revealer_id: user_id.to_string(),
            target_id: target.target_id.clone(),
            coins_spent: cost.final_cost,
            dynamic_cost: cost,
            contact_info: target.contact_info.clone(),
            revealed_at: now,
        };
        let recorded = wallet.record_reveal(reveal).clone();
        log::info!(
            "{} revealed {} for {} coins, balance {}",
            user_id,
            recorded.target_id,
            recorded.coins_spent,
            wallet.balance()
        );
        Ok(recorded)
    }

    /// Credit coins for a platform activity, subject to the daily limits.
    ///
    /// Unknown or zero-rate activities are a caller bug and surface as
    /// [`LedgerError::InvalidEarningType`]. The limit check and the credit
    /// run under the wallet lock, so concurrent earns cannot jointly exceed
    /// the caps.
    pub fn earn(
        &self,
        user_id: &str,
        activity: &str,
        description: Option<&str>,
    ) -> Result<CoinTransaction> {
        let config = self.settings.get();
        let amount = config.earning_rates.get(activity).copied().unwrap_or(0);
        if amount == 0 {
            return Err(LedgerError::InvalidEarningType(activity.to_string()));
        }

        let handle = self.wallet(user_id);
        let mut wallet = handle.lock();

        let now = Utc::now();
        self.policy.check(&wallet, activity, amount, &config, now)?;

        let description = description
            .map(str::to_string)
            .unwrap_or_else(|| format!("Earned {} coins for {}", amount, activity));
        let tx = wallet.credit_bonus(amount, activity, description, now)?.clone();
        log::info!(
            "{} earned {} coins for {}, balance {}",
            user_id,
            amount,
            activity,
            wallet.balance()
        );
        Ok(tx)
    }

    /// Credit back the coins of a prior reveal (support path).
    ///
    /// The reveal record itself is untouched and the user keeps contact
    /// access; a reveal can be refunded at most once.
    pub fn refund_reveal(
        &self,
        user_id: &str,
        reveal_id: Uuid,
        reason: &str,
    ) -> Result<CoinTransaction> {
        let handle = self.wallet(user_id);
        let mut wallet = handle.lock();

        let (coins, target_id) = match wallet.find_reveal_by_id(reveal_id) {
            Some(reveal) => (reveal.coins_spent, reveal.target_id.clone()),
            None => return Err(LedgerError::RevealNotFound(reveal_id)),
        };
        if wallet.has_refund_for(reveal_id) {
            return Err(LedgerError::AlreadyRefunded(reveal_id));
        }

        let tx = wallet
            .credit_refund(
                coins,
                reveal_id,
                format!("Refund for reveal of {}: {}", target_id, reason),
                Utc::now(),
            )?
            .clone();
        log::info!(
            "{} refunded {} coins for reveal {}, balance {}",
            user_id,
            coins,
            reveal_id,
            wallet.balance()
        );
        Ok(tx)
    }

    /// Current balance; zero for users who have no wallet yet
    pub fn balance(&self, user_id: &str) -> u64 {
        self.wallets
            .get(user_id)
            .map(|entry| entry.lock().balance())
            .unwrap_or(0)
    }

    /// Transaction history, newest first
    pub fn transactions(&self, user_id: &str) -> Vec<CoinTransaction> {
        self.wallets
            .get(user_id)
            .map(|entry| entry.lock().transactions().iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Reveal history, newest first
    pub fn contact_reveals(&self, user_id: &str) -> Vec<ContactReveal> {
        self.wallets
            .get(user_id)
            .map(|entry| entry.lock().contact_reveals().iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Coins earned so far on the current business day
    pub fn today_earnings(&self, user_id: &str) -> u64 {
        self.wallets
            .get(user_id)
            .map(|entry| self.policy.earnings_today(&entry.lock(), Utc::now()))
            .unwrap_or(0)
    }

    pub fn has_revealed(&self, user_id: &str, target_id: &str) -> bool {
        self.wallets
            .get(user_id)
            .map(|entry| entry.lock().find_reveal(target_id).is_some())
            .unwrap_or(false)
    }

    /// Point-in-time copy of a user's wallet, if one exists
    pub fn wallet_snapshot(&self, user_id: &str) -> Option<CoinWallet> {
        self.wallets.get(user_id).map(|entry| entry.lock().clone())
    }
}
