//! # Trust Integration Configuration
//!
//! Weights, bonuses, caps, and decay windows. Values are policy with
//! sensible defaults; the caps and the decay floor are the contract.

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::TrustIntegrator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustConfig {
    /// Base contribution of one verification before weighting.
    pub base_contribution: f64,
    /// Deployment-wide weight applied to every government source.
    pub source_weight: f64,
    /// Minimum confidence a verification needs to create a scope.
    pub min_confidence: f64,
    /// Flat bonus when more than three fields verified.
    pub field_bonus: f64,
    /// Flat bonus when the source confirmed document validity.
    pub validity_bonus: f64,
    /// Cap on a single verification's contribution.
    pub single_cap: f64,
    /// Days a contribution stays undiscounted.
    pub freshness_window_days: u32,
    /// Age in days at which the freshness discount reaches its floor.
    pub decay_horizon_days: u32,
    /// The freshness floor: the fraction of the original contribution an
    /// arbitrarily old scope retains.
    pub decay_floor: f64,
    /// Bonus per distinct source kind beyond the first.
    pub multi_source_bonus: f64,
    /// Bonus per distinct jurisdiction beyond the first.
    pub jurisdiction_bonus: f64,
    /// Days until a scope expires.
    pub scope_ttl_days: u32,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            base_contribution: 0.25,
            source_weight: 1.0,
            min_confidence: 0.7,
            field_bonus: 0.05,
            validity_bonus: 0.05,
            single_cap: 0.5,
            freshness_window_days: 90,
            decay_horizon_days: 365,
            decay_floor: 0.5,
            multi_source_bonus: 0.05,
            jurisdiction_bonus: 0.02,
            scope_ttl_days: 365,
        }
    }
}

impl TrustConfig {
    /// Builder: set the minimum confidence gate.
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Builder: set the freshness window and decay horizon.
    pub fn with_decay(mut self, window_days: u32, horizon_days: u32) -> Self {
        self.freshness_window_days = window_days;
        self.decay_horizon_days = horizon_days;
        self
    }

    /// Builder: set the scope time-to-live.
    pub fn with_scope_ttl(mut self, ttl_days: u32) -> Self {
        self.scope_ttl_days = ttl_days;
        self
    }
}
