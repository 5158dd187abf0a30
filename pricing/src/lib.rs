//! Rozgar Pricing Module
//!
//! Implements the dynamic contact-reveal pricing model including:
//! - Admin-tunable pricing configuration
//! - Multi-factor contact cost calculation
//! - Coin earning rates and daily limits

pub mod config;
pub mod cost;

pub use config::{
    ConfigError, DemandThresholds, PricingConfig, PricingSettings, PricingUpdate, RecencyDecay,
};
pub use cost::{calculate_contact_cost, CostBreakdown, DynamicCoinCost, ListingAttributes};

/// Pricing constants
pub mod constants {
    /// Demand multiplier applied at or above the high threshold
    pub const HIGH_DEMAND_MULTIPLIER: f64 = 1.5;

    /// Demand multiplier applied at or above the medium threshold
    pub const MEDIUM_DEMAND_MULTIPLIER: f64 = 1.2;

    /// Demand multiplier below the medium threshold
    pub const BASE_DEMAND_MULTIPLIER: f64 = 1.0;

    /// Every computed contact cost is at least this many coins
    pub const MINIMUM_CONTACT_COST: u64 = 1;
}
