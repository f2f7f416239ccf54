//! # Cost Models and Records
//!
//! The per-adapter billing model, the record written for every charged
//! call, the alerts raised against budget utilization, and the summary
//! shape returned for reporting periods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// BillingModel
// ---------------------------------------------------------------------------

/// How an adapter bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingModel {
    /// A flat rate per call, successful or not.
    PerCall,
    /// The per-success rate for successful verifications when it exceeds
    /// the per-call rate; the per-call rate otherwise.
    PerSuccess,
}

impl BillingModel {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerCall => "per_call",
            Self::PerSuccess => "per_success",
        }
    }
}

impl std::fmt::Display for BillingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CostModel
// ---------------------------------------------------------------------------

/// Billing configuration for one adapter. Amounts and budgets are minor
/// units; a budget of 0 means unlimited for that window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostModel {
    /// Cost of one call, in minor units.
    pub per_call_minor: i64,
    /// Cost of one successful verification, in minor units.
    pub per_success_minor: i64,
    /// Daily budget ceiling in minor units. 0 = unlimited.
    pub daily_budget_minor: i64,
    /// Monthly budget ceiling in minor units. 0 = unlimited.
    pub monthly_budget_minor: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// The billing model in force.
    pub billing: BillingModel,
    /// Utilization percentage at which a warning alert is raised.
    pub alert_threshold_pct: u8,
}

impl CostModel {
    /// A flat per-call model with no budget.
    pub fn per_call(per_call_minor: i64, currency: impl Into<String>) -> Self {
        Self {
            per_call_minor,
            per_success_minor: 0,
            daily_budget_minor: 0,
            monthly_budget_minor: 0,
            currency: currency.into(),
            billing: BillingModel::PerCall,
            alert_threshold_pct: 80,
        }
    }

    /// A per-success model with no budget.
    pub fn per_success(
        per_call_minor: i64,
        per_success_minor: i64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            per_call_minor,
            per_success_minor,
            daily_budget_minor: 0,
            monthly_budget_minor: 0,
            currency: currency.into(),
            billing: BillingModel::PerSuccess,
            alert_threshold_pct: 80,
        }
    }

    /// Builder: set daily and monthly budget ceilings.
    pub fn with_budgets(mut self, daily_minor: i64, monthly_minor: i64) -> Self {
        self.daily_budget_minor = daily_minor;
        self.monthly_budget_minor = monthly_minor;
        self
    }

    /// Builder: set the warning threshold percentage.
    pub fn with_alert_threshold(mut self, pct: u8) -> Self {
        self.alert_threshold_pct = pct;
        self
    }

    /// The cost of one call under this model.
    pub fn cost_of(&self, success: bool) -> i64 {
        match self.billing {
            BillingModel::PerCall => self.per_call_minor,
            BillingModel::PerSuccess => {
                if success && self.per_success_minor > self.per_call_minor {
                    self.per_success_minor
                } else {
                    self.per_call_minor
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CostRecord
// ---------------------------------------------------------------------------

/// One charged call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRecord {
    /// The adapter that was charged.
    pub adapter: String,
    /// Amount in minor units.
    pub amount_minor: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Whether the underlying call verified successfully.
    pub success: bool,
    /// When the cost was recorded.
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// The budget window an alert or rejection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetWindow {
    /// The daily rolling total.
    Daily,
    /// The monthly rolling total.
    Monthly,
}

impl BudgetWindow {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for BudgetWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Utilization crossed the warning threshold.
    Warning,
    /// Utilization reached or exceeded the budget.
    Critical,
}

impl AlertLevel {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A budget utilization alert, raised at cost-recording time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostAlert {
    /// The adapter whose budget is utilized.
    pub adapter: String,
    /// The window the alert refers to.
    pub window: BudgetWindow,
    /// Alert severity.
    pub level: AlertLevel,
    /// Utilization as a whole percentage at alert time.
    pub utilization_pct: u32,
    /// Spend in the window, minor units.
    pub spent_minor: i64,
    /// The window's budget, minor units.
    pub budget_minor: i64,
    /// When the alert was raised.
    pub raised_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// CostSummary
// ---------------------------------------------------------------------------

/// Aggregated spend over a reporting range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSummary {
    /// Start of the range (inclusive).
    pub from: DateTime<Utc>,
    /// End of the range (exclusive).
    pub to: DateTime<Utc>,
    /// Total spend in minor units.
    pub total_minor: i64,
    /// Number of charged calls.
    pub call_count: usize,
    /// Number of charged calls that verified successfully.
    pub success_count: usize,
    /// Spend per adapter, minor units.
    pub by_adapter: BTreeMap<String, i64>,
    /// Spend per bucket (day or month, per the requested grouping),
    /// minor units.
    pub by_bucket: BTreeMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_call_model_charges_flat() {
        let model = CostModel::per_call(50, "USD");
        assert_eq!(model.cost_of(true), 50);
        assert_eq!(model.cost_of(false), 50);
    }

    #[test]
    fn per_success_model_charges_higher_rate_on_success() {
        let model = CostModel::per_success(50, 120, "USD");
        assert_eq!(model.cost_of(true), 120);
        assert_eq!(model.cost_of(false), 50);
    }

    #[test]
    fn per_success_model_falls_back_when_rate_is_lower() {
        // The per-success rate only applies when it exceeds per-call.
        let model = CostModel::per_success(50, 30, "USD");
        assert_eq!(model.cost_of(true), 50);
        assert_eq!(model.cost_of(false), 50);
    }

    #[test]
    fn budget_builder() {
        let model = CostModel::per_call(50, "USD")
            .with_budgets(1_000, 20_000)
            .with_alert_threshold(75);
        assert_eq!(model.daily_budget_minor, 1_000);
        assert_eq!(model.monthly_budget_minor, 20_000);
        assert_eq!(model.alert_threshold_pct, 75);
    }

    #[test]
    fn enum_strings() {
        assert_eq!(BillingModel::PerCall.to_string(), "per_call");
        assert_eq!(BudgetWindow::Monthly.to_string(), "monthly");
        assert_eq!(AlertLevel::Critical.to_string(), "critical");
    }

    #[test]
    fn model_serde_roundtrip() {
        let model = CostModel::per_success(50, 120, "EUR").with_budgets(500, 5_000);
        let json = serde_json::to_string(&model).unwrap();
        let back: CostModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
