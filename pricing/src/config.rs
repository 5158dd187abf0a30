//! Pricing configuration and the admin settings surface
//!
//! All tunable numbers live in [`PricingConfig`]: the base contact cost, the
//! per-city and per-category multipliers, demand thresholds, recency decay
//! bands, coin earning rates and daily earning caps. Admin code reads and
//! updates a shared [`PricingSettings`] handle; nothing in this crate holds
//! config as ambient global state.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Key that every multiplier table must contain as its fallback entry
pub const DEFAULT_KEY: &str = "default";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Base contact cost must be at least 1, got {0}")]
    InvalidBaseCost(u64),

    #[error("Multiplier for {table} key '{key}' must be positive and finite, got {value}")]
    InvalidMultiplier {
        table: &'static str,
        key: String,
        value: f64,
    },

    #[error("Missing 'default' entry in {0} multipliers")]
    MissingDefault(&'static str),

    #[error("Recency decay factor '{band}' must be positive and finite, got {value}")]
    InvalidDecay { band: &'static str, value: f64 },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Application-count cut points for the demand premium tiers.
///
/// Note: the shipped defaults set `medium` and `high` to the same value (15),
/// which makes the medium tier unreachable until an admin spreads the
/// thresholds apart. This mirrors the production configuration on purpose and
/// is flagged for product review rather than corrected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandThresholds {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

impl Default for DemandThresholds {
    fn default() -> Self {
        Self {
            low: 5,
            medium: 15,
            high: 15,
        }
    }
}

/// Recency multipliers by listing age band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecencyDecay {
    /// Posted within the last day
    pub fresh: f64,
    /// Posted within the last week
    pub week: f64,
    /// Posted within the last month
    pub month: f64,
    /// Posted within the last quarter
    pub quarter: f64,
    /// Older than a quarter
    pub stale: f64,
}

impl Default for RecencyDecay {
    fn default() -> Self {
        Self {
            fresh: 1.3,
            week: 1.1,
            month: 1.0,
            quarter: 0.9,
            stale: 0.7,
        }
    }
}

/// The complete pricing table for contact reveals and coin earning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Coins charged before any multiplier is applied
    pub base_contact_cost: u64,

    /// City name (normalized, lowercase) -> price multiplier
    pub location_multipliers: HashMap<String, f64>,

    /// Job category -> price multiplier
    pub category_multipliers: HashMap<String, f64>,

    /// Application-count cut points for demand pricing
    pub demand_thresholds: DemandThresholds,

    /// Listing-age multipliers
    pub recency_decay: RecencyDecay,

    /// Earning activity type -> coins awarded per completion
    pub earning_rates: HashMap<String, u64>,

    /// Earning activity type -> maximum completions per calendar day.
    /// Activities absent from this table are limited only by the
    /// aggregate daily cap.
    pub activity_daily_limits: HashMap<String, u32>,

    /// Maximum coins a user may earn per calendar day across all activities
    pub max_daily_earnings: u64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let location_multipliers = HashMap::from(
            [
                ("mumbai", 1.5),
                ("delhi", 1.4),
                ("bangalore", 1.4),
                ("pune", 1.2),
                ("hyderabad", 1.2),
                ("chennai", 1.2),
                ("kolkata", 1.1),
                (DEFAULT_KEY, 1.0),
            ]
            .map(|(k, v)| (k.to_string(), v)),
        );

        let category_multipliers = HashMap::from(
            [
                ("electricians", 1.8),
                ("plumbers", 1.6),
                ("carpenters", 1.5),
                ("cooks", 1.3),
                ("drivers", 1.2),
                ("security-guards", 1.1),
                ("housekeeping", 1.0),
                (DEFAULT_KEY, 1.0),
            ]
            .map(|(k, v)| (k.to_string(), v)),
        );

        let earning_rates = HashMap::from(
            [
                ("daily_login", 5u64),
                ("complete_profile", 20),
                ("refer_friend", 25),
                ("first_application", 10),
            ]
            .map(|(k, v)| (k.to_string(), v)),
        );

        let activity_daily_limits =
            HashMap::from([("daily_login", 1u32)].map(|(k, v)| (k.to_string(), v)));

        Self {
            base_contact_cost: 5,
            location_multipliers,
            category_multipliers,
            demand_thresholds: DemandThresholds::default(),
            recency_decay: RecencyDecay::default(),
            earning_rates,
            activity_daily_limits,
            max_daily_earnings: 50,
        }
    }
}

impl PricingConfig {
    /// Check every invariant the pricing model relies on.
    ///
    /// Multipliers and decay factors must be positive and finite, both
    /// multiplier tables must carry a `"default"` entry, and the base cost
    /// must be at least one coin.
    pub fn validate(&self) -> Result<()> {
        if self.base_contact_cost < 1 {
            return Err(ConfigError::InvalidBaseCost(self.base_contact_cost));
        }

        Self::validate_table("location", &self.location_multipliers)?;
        Self::validate_table("category", &self.category_multipliers)?;

        let decay = &self.recency_decay;
        for (band, value) in [
            ("fresh", decay.fresh),
            ("week", decay.week),
            ("month", decay.month),
            ("quarter", decay.quarter),
            ("stale", decay.stale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidDecay { band, value });
            }
        }

        Ok(())
    }

    fn validate_table(table: &'static str, multipliers: &HashMap<String, f64>) -> Result<()> {
        if !multipliers.contains_key(DEFAULT_KEY) {
            return Err(ConfigError::MissingDefault(table));
        }
        for (key, &value) in multipliers {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidMultiplier {
                    table,
                    key: key.clone(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Export the configuration as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Partial update applied to the current configuration.
///
/// Multiplier and rate maps replace individual entries rather than the whole
/// table, so an admin can retune one city without restating the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingUpdate {
    pub base_contact_cost: Option<u64>,
    pub location_multipliers: Option<HashMap<String, f64>>,
    pub category_multipliers: Option<HashMap<String, f64>>,
    pub demand_thresholds: Option<DemandThresholds>,
    pub recency_decay: Option<RecencyDecay>,
    pub earning_rates: Option<HashMap<String, u64>>,
    pub activity_daily_limits: Option<HashMap<String, u32>>,
    pub max_daily_earnings: Option<u64>,
}

/// Shared, injectable settings handle.
///
/// `get` returns a snapshot; `update` validates the patched configuration
/// before swapping it in, so readers never observe an invalid table. Costs
/// already snapshotted into reveal records are unaffected by later updates.
#[derive(Debug)]
pub struct PricingSettings {
    inner: RwLock<PricingConfig>,
}

impl PricingSettings {
    pub fn new(config: PricingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: RwLock::new(config),
        })
    }

    /// Current configuration snapshot
    pub fn get(&self) -> PricingConfig {
        self.inner.read().clone()
    }

    /// Apply a partial update; an invalid result leaves settings unchanged
    pub fn update(&self, patch: PricingUpdate) -> Result<()> {
        let mut candidate = self.get();

        if let Some(base) = patch.base_contact_cost {
            candidate.base_contact_cost = base;
        }
        if let Some(entries) = patch.location_multipliers {
            candidate.location_multipliers.extend(entries);
        }
        if let Some(entries) = patch.category_multipliers {
            candidate.category_multipliers.extend(entries);
        }
        if let Some(thresholds) = patch.demand_thresholds {
            candidate.demand_thresholds = thresholds;
        }
        if let Some(decay) = patch.recency_decay {
            candidate.recency_decay = decay;
        }
        if let Some(rates) = patch.earning_rates {
            candidate.earning_rates.extend(rates);
        }
        if let Some(limits) = patch.activity_daily_limits {
            candidate.activity_daily_limits.extend(limits);
        }
        if let Some(max) = patch.max_daily_earnings {
            candidate.max_daily_earnings = max;
        }

        candidate.validate()?;
        *self.inner.write() = candidate;
        Ok(())
    }
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            inner: RwLock::new(PricingConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PricingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_demand_thresholds_collapse() {
        // Production config ships medium == high; keep it that way until
        // product decides otherwise.
        let thresholds = DemandThresholds::default();
        assert_eq!(thresholds.medium, thresholds.high);
        assert_eq!(thresholds.high, 15);
    }

    #[test]
    fn test_zero_base_cost_rejected() {
        let mut config = PricingConfig::default();
        config.base_contact_cost = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseCost(0))
        ));
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let mut config = PricingConfig::default();
        config
            .location_multipliers
            .insert("nagpur".to_string(), -0.5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMultiplier { table: "location", .. })
        ));
    }

    #[test]
    fn test_missing_default_rejected() {
        let mut config = PricingConfig::default();
        config.category_multipliers.remove(DEFAULT_KEY);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingDefault("category"))
        ));
    }

    #[test]
    fn test_partial_update_merges_entries() {
        let settings = PricingSettings::default();
        settings
            .update(PricingUpdate {
                location_multipliers: Some(HashMap::from([("surat".to_string(), 1.15)])),
                max_daily_earnings: Some(80),
                ..Default::default()
            })
            .unwrap();

        let config = settings.get();
        assert_eq!(config.location_multipliers["surat"], 1.15);
        // Untouched entries survive the patch
        assert_eq!(config.location_multipliers["mumbai"], 1.5);
        assert_eq!(config.max_daily_earnings, 80);
    }

    #[test]
    fn test_invalid_update_leaves_settings_unchanged() {
        let settings = PricingSettings::default();
        let before = settings.get();

        let result = settings.update(PricingUpdate {
            base_contact_cost: Some(0),
            ..Default::default()
        });

        assert!(result.is_err());
        assert_eq!(
            settings.get().base_contact_cost,
            before.base_contact_cost
        );
    }

    #[test]
    fn test_json_round_trip() {
        let config = PricingConfig::default();
        let json = config.to_json().unwrap();
        let loaded = PricingConfig::from_json(&json).unwrap();
        assert_eq!(loaded.base_contact_cost, config.base_contact_cost);
        assert_eq!(loaded.location_multipliers, config.location_multipliers);
    }
}
