//! Dynamic contact cost calculation
//!
//! The price of revealing a listing's contact details is the base cost scaled
//! by four independent factors: location, category, demand (application
//! count) and recency (listing age). The calculation is a pure function of
//! the listing attributes, the pricing configuration and the current time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{PricingConfig, DEFAULT_KEY};
use crate::constants::{
    BASE_DEMAND_MULTIPLIER, HIGH_DEMAND_MULTIPLIER, MEDIUM_DEMAND_MULTIPLIER,
    MINIMUM_CONTACT_COST,
};

/// Listing attributes the price depends on.
///
/// `applications_count` is unsigned; a negative demand signal is a caller bug
/// the type system rules out rather than something we clamp at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingAttributes {
    pub category: String,
    pub city: String,
    pub applications_count: u32,
    pub posted_at: DateTime<Utc>,
}

/// Human-readable explanation of each pricing factor.
///
/// Display-only; nothing downstream may derive numbers from these strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub location: String,
    pub category: String,
    pub demand: String,
    pub recency: String,
}

/// A computed contact price with its factor decomposition.
///
/// Recomputed on demand and snapshotted into reveal records at spend time;
/// never treated as a persistent source of truth on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicCoinCost {
    pub base_cost: u64,
    pub location_multiplier: f64,
    pub category_multiplier: f64,
    pub demand_multiplier: f64,
    pub recency_multiplier: f64,
    pub final_cost: u64,
    pub breakdown: CostBreakdown,
}

/// Normalize a free-text city name for multiplier lookup: trim, lowercase,
/// and collapse runs of internal whitespace.
pub fn normalize_city(city: &str) -> String {
    city.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn lookup_multiplier(table: &std::collections::HashMap<String, f64>, key: &str) -> f64 {
    table
        .get(key)
        .or_else(|| table.get(DEFAULT_KEY))
        .copied()
        .unwrap_or(1.0)
}

fn demand_multiplier(applications_count: u32, config: &PricingConfig) -> f64 {
    let thresholds = config.demand_thresholds;
    if applications_count >= thresholds.high {
        HIGH_DEMAND_MULTIPLIER
    } else if applications_count >= thresholds.medium {
        MEDIUM_DEMAND_MULTIPLIER
    } else {
        BASE_DEMAND_MULTIPLIER
    }
}

/// Whole days since the listing was posted, clamped to zero for listings
/// timestamped in the future (clock skew prices them as brand-new).
pub fn days_since_posted(posted_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - posted_at).num_days().max(0)
}

fn recency_multiplier(days: i64, config: &PricingConfig) -> f64 {
    let decay = config.recency_decay;
    match days {
        0..=1 => decay.fresh,
        2..=7 => decay.week,
        8..=30 => decay.month,
        31..=90 => decay.quarter,
        _ => decay.stale,
    }
}

/// Compute the coin price for revealing a listing's contact details.
///
/// Pure and deterministic for a given `now`. Unknown cities and categories
/// fall back to the `"default"` multiplier; the result never drops below one
/// coin. Rounding is half away from zero (round-half-up on this positive
/// domain), so e.g. a raw cost of 4.5 charges 5 coins.
pub fn calculate_contact_cost(
    listing: &ListingAttributes,
    config: &PricingConfig,
    now: DateTime<Utc>,
) -> DynamicCoinCost {
    let city = normalize_city(&listing.city);
    let location_multiplier = lookup_multiplier(&config.location_multipliers, &city);
    let category_multiplier = lookup_multiplier(&config.category_multipliers, &listing.category);
    let demand_multiplier = demand_multiplier(listing.applications_count, config);

    let days = days_since_posted(listing.posted_at, now);
    let recency_multiplier = recency_multiplier(days, config);

    let base_cost = config.base_contact_cost;
    let raw = base_cost as f64
        * location_multiplier
        * category_multiplier
        * demand_multiplier
        * recency_multiplier;
    let final_cost = (raw.round() as u64).max(MINIMUM_CONTACT_COST);

    let breakdown = CostBreakdown {
        location: format!("Location factor for {}: {:.2}x", city, location_multiplier),
        category: format!(
            "Category factor for {}: {:.2}x",
            listing.category, category_multiplier
        ),
        demand: format!(
            "{} applications so far: {:.2}x demand factor",
            listing.applications_count, demand_multiplier
        ),
        recency: format!(
            "Posted {} day(s) ago: {:.2}x recency factor",
            days, recency_multiplier
        ),
    };

    DynamicCoinCost {
        base_cost,
        location_multiplier,
        category_multiplier,
        demand_multiplier,
        recency_multiplier,
        final_cost,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn listing(city: &str, category: &str, applications: u32, days_old: i64) -> ListingAttributes {
        ListingAttributes {
            category: category.to_string(),
            city: city.to_string(),
            applications_count: applications,
            posted_at: Utc::now() - Duration::days(days_old),
        }
    }

    #[test]
    fn test_normalize_city() {
        assert_eq!(normalize_city("  Mumbai "), "mumbai");
        assert_eq!(normalize_city("NEW   DELHI"), "new delhi");
        assert_eq!(normalize_city(""), "");
    }

    #[test]
    fn test_demand_tiers() {
        let config = PricingConfig::default();
        assert_eq!(demand_multiplier(0, &config), 1.0);
        assert_eq!(demand_multiplier(14, &config), 1.0);
        // medium == high in the default config, so 15 lands straight on the
        // high tier and the 1.2x tier is unreachable
        assert_eq!(demand_multiplier(15, &config), 1.5);
        assert_eq!(demand_multiplier(100, &config), 1.5);
    }

    #[test]
    fn test_demand_medium_tier_reachable_when_thresholds_differ() {
        let mut config = PricingConfig::default();
        config.demand_thresholds.high = 30;
        assert_eq!(demand_multiplier(15, &config), 1.2);
        assert_eq!(demand_multiplier(29, &config), 1.2);
        assert_eq!(demand_multiplier(30, &config), 1.5);
    }

    #[test]
    fn test_recency_bands() {
        let config = PricingConfig::default();
        assert_eq!(recency_multiplier(0, &config), 1.3);
        assert_eq!(recency_multiplier(1, &config), 1.3);
        assert_eq!(recency_multiplier(2, &config), 1.1);
        assert_eq!(recency_multiplier(7, &config), 1.1);
        assert_eq!(recency_multiplier(8, &config), 1.0);
        assert_eq!(recency_multiplier(30, &config), 1.0);
        assert_eq!(recency_multiplier(31, &config), 0.9);
        assert_eq!(recency_multiplier(90, &config), 0.9);
        assert_eq!(recency_multiplier(91, &config), 0.7);
        assert_eq!(recency_multiplier(365, &config), 0.7);
    }

    #[test]
    fn test_future_posting_clamps_to_fresh() {
        let config = PricingConfig::default();
        let mut attrs = listing("pune", "drivers", 0, 0);
        attrs.posted_at = Utc::now() + Duration::days(3);

        let cost = calculate_contact_cost(&attrs, &config, Utc::now());
        assert_eq!(cost.recency_multiplier, 1.3);
    }

    #[test]
    fn test_base_scenario_rounds_half_up() {
        let config = PricingConfig::default();
        let attrs = listing("Unknown City", "other", 3, 45);

        let cost = calculate_contact_cost(&attrs, &config, Utc::now());
        assert_eq!(cost.location_multiplier, 1.0);
        assert_eq!(cost.category_multiplier, 1.0);
        assert_eq!(cost.demand_multiplier, 1.0);
        assert_eq!(cost.recency_multiplier, 0.9);
        // 5 * 0.9 = 4.5 rounds up to 5
        assert_eq!(cost.final_cost, 5);
    }

    #[test]
    fn test_stacked_premiums_scenario() {
        let config = PricingConfig::default();
        let attrs = listing("Mumbai", "electricians", 20, 0);

        let cost = calculate_contact_cost(&attrs, &config, Utc::now());
        // 5 * 1.5 * 1.8 * 1.5 * 1.3 = 26.325
        assert_eq!(cost.final_cost, 26);
    }

    #[test]
    fn test_unknown_keys_fall_back_to_default() {
        let config = PricingConfig::default();
        let attrs = listing("Atlantis", "dragon-taming", 0, 10);

        let cost = calculate_contact_cost(&attrs, &config, Utc::now());
        assert_eq!(cost.location_multiplier, 1.0);
        assert_eq!(cost.category_multiplier, 1.0);
        assert_eq!(cost.final_cost, 5);
    }

    #[test]
    fn test_minimum_cost_floor() {
        let mut config = PricingConfig::default();
        config.base_contact_cost = 1;
        config
            .location_multipliers
            .insert("default".to_string(), 0.5);
        let attrs = listing("Unknown", "other", 0, 400);

        // 1 * 0.5 * 0.7 = 0.35 rounds to 0, floored back to 1
        let cost = calculate_contact_cost(&attrs, &config, Utc::now());
        assert_eq!(cost.final_cost, 1);
    }

    #[test]
    fn test_breakdown_is_descriptive_only() {
        let config = PricingConfig::default();
        let attrs = listing("Mumbai", "plumbers", 2, 3);

        let cost = calculate_contact_cost(&attrs, &config, Utc::now());
        assert!(cost.breakdown.location.contains("mumbai"));
        assert!(cost.breakdown.category.contains("plumbers"));
        assert!(cost.breakdown.demand.contains("2 applications"));
    }
}
