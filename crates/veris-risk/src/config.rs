//! # Fraud Engine Configuration
//!
//! Thresholds and policy knobs. The aggregation coefficients are
//! deliberately configuration: deployments tune them per risk appetite,
//! while the qualitative shape (one strong signal dominates, weak
//! signals corroborate, everything clamps to [0, 1]) is fixed.

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::FraudEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudConfig {
    /// Aggregate score at or above which the action becomes flag.
    pub flag_threshold: f64,
    /// Aggregate score at or above which the action becomes block.
    pub block_threshold: f64,
    /// Weight applied to every non-maximal signal during aggregation.
    pub corroboration_weight: f64,
    /// Velocity window length in seconds.
    pub velocity_window_secs: u64,
    /// Checks allowed inside the velocity window before the velocity
    /// signal fires.
    pub velocity_ceiling: u32,
    /// Whether a critical signal forces a block regardless of score.
    pub block_on_critical: bool,
    /// Whether a high-severity signal forces a block regardless of score.
    pub block_on_high: bool,
    /// Success results below this confidence emit a low-confidence
    /// signal.
    pub confidence_floor: f64,
    /// Per-field mismatches tolerated before the mismatch signal fires.
    pub mismatch_tolerance: usize,
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            flag_threshold: 0.5,
            block_threshold: 0.8,
            corroboration_weight: 0.1,
            velocity_window_secs: 3600,
            velocity_ceiling: 10,
            block_on_critical: true,
            block_on_high: false,
            confidence_floor: 0.7,
            mismatch_tolerance: 2,
        }
    }
}

impl FraudConfig {
    /// Builder: set flag/block thresholds.
    pub fn with_thresholds(mut self, flag: f64, block: f64) -> Self {
        self.flag_threshold = flag;
        self.block_threshold = block;
        self
    }

    /// Builder: set the velocity window and ceiling.
    pub fn with_velocity(mut self, window_secs: u64, ceiling: u32) -> Self {
        self.velocity_window_secs = window_secs;
        self.velocity_ceiling = ceiling;
        self
    }

    /// Builder: set the severity-override block flags.
    pub fn with_severity_blocks(mut self, on_critical: bool, on_high: bool) -> Self {
        self.block_on_critical = on_critical;
        self.block_on_high = on_high;
        self
    }
}
