//! Daily earning limits
//!
//! Enforces the aggregate per-day earning cap and the per-activity completion
//! caps. Callers must hold the wallet lock while checking and crediting, so
//! the check is always against the wallet state the credit will apply to.

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::{LedgerError, Result};
use crate::wallet::CoinWallet;
use rozgar_pricing::PricingConfig;

/// Earning limit policy for a fixed business timezone.
///
/// The timezone pins the calendar-day boundary; "today" never depends on the
/// machine's local clock settings.
#[derive(Debug, Clone, Copy)]
pub struct EarningPolicy {
    timezone: FixedOffset,
}

impl EarningPolicy {
    pub fn new(timezone: FixedOffset) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    /// Coins the wallet has earned so far on the current business day
    pub fn earnings_today(&self, wallet: &CoinWallet, now: DateTime<Utc>) -> u64 {
        let today = now.with_timezone(&self.timezone).date_naive();
        wallet.earned_on(today, self.timezone)
    }

    /// Decide whether crediting `amount` coins for `activity` is allowed now.
    ///
    /// Must be called with the wallet lock held and immediately followed by
    /// the credit, so concurrent earns cannot jointly exceed the cap.
    pub fn check(
        &self,
        wallet: &CoinWallet,
        activity: &str,
        amount: u64,
        config: &PricingConfig,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let today = now.with_timezone(&self.timezone).date_naive();

        if let Some(&limit) = config.activity_daily_limits.get(activity) {
            let done = wallet.activity_count_on(activity, today, self.timezone);
            if done >= limit {
                return Err(LedgerError::ActivityLimitReached {
                    activity: activity.to_string(),
                    limit,
                });
            }
        }

        let earned_today = wallet.earned_on(today, self.timezone);
        let over_cap = match earned_today.checked_add(amount) {
            Some(total) => total > config.max_daily_earnings,
            // A sum too large for u64 is over any cap
            None => true,
        };
        if over_cap {
            return Err(LedgerError::DailyLimitReached {
                earned_today,
                max_daily: config.max_daily_earnings,
            });
        }

        Ok(())
    }
}

impl Default for EarningPolicy {
    fn default() -> Self {
        Self::new(crate::default_timezone())
    }
}
