//! # Cost Ledger
//!
//! Owner of cost records and the rolling daily/monthly totals per
//! adapter. Budget checks and alert generation read the same totals the
//! recording path maintains, under the same lock discipline as the other
//! component stores.
//!
//! Alerts fire on crossings: the record that moves utilization across
//! the warning threshold (or to 100%) raises the alert, subsequent
//! records above the line do not repeat it.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Utc};
use parking_lot::RwLock;
use thiserror::Error;

use crate::model::{
    AlertLevel, BudgetWindow, CostAlert, CostModel, CostRecord, CostSummary,
};

/// Budget enforcement failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CostError {
    /// A rolling total has reached its ceiling; further spend for the
    /// adapter is rejected until the window rolls over.
    #[error("{window} budget exceeded for adapter {adapter}: spent {spent_minor} of {budget_minor} minor units")]
    BudgetExceeded {
        /// The adapter whose budget is exhausted.
        adapter: String,
        /// The exhausted window.
        window: BudgetWindow,
        /// Spend inside the window, minor units.
        spent_minor: i64,
        /// The ceiling, minor units.
        budget_minor: i64,
    },
}

#[derive(Debug, Default)]
struct LedgerState {
    models: HashMap<String, CostModel>,
    records: Vec<CostRecord>,
    /// Rolling totals keyed by (adapter, bucket), where bucket is a
    /// `YYYY-MM-DD` day or `YYYY-MM` month string.
    daily_totals: HashMap<(String, String), i64>,
    monthly_totals: HashMap<(String, String), i64>,
}

/// The cost/budget ledger.
#[derive(Debug, Default)]
pub struct CostLedger {
    state: RwLock<LedgerState>,
}

fn day_bucket(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}-{:02}", at.year(), at.month(), at.day())
}

fn month_bucket(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}

impl CostLedger {
    /// Create an empty ledger with no models.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the cost model for an adapter.
    pub fn set_model(&self, adapter: impl Into<String>, model: CostModel) {
        self.state.write().models.insert(adapter.into(), model);
    }

    /// Builder: register a model.
    pub fn with_model(self, adapter: impl Into<String>, model: CostModel) -> Self {
        self.set_model(adapter, model);
        self
    }

    /// The model registered for an adapter.
    pub fn model_for(&self, adapter: &str) -> Option<CostModel> {
        self.state.read().models.get(adapter).cloned()
    }

    /// The cost of one call for an adapter. Adapters without a model are
    /// free.
    pub fn calculate(&self, adapter: &str, success: bool) -> i64 {
        self.state
            .read()
            .models
            .get(adapter)
            .map(|m| m.cost_of(success))
            .unwrap_or(0)
    }

    /// Spend recorded for an adapter on the day containing `at`.
    pub fn daily_spend(&self, adapter: &str, at: DateTime<Utc>) -> i64 {
        self.state
            .read()
            .daily_totals
            .get(&(adapter.to_string(), day_bucket(at)))
            .copied()
            .unwrap_or(0)
    }

    /// Spend recorded for an adapter in the month containing `at`.
    pub fn monthly_spend(&self, adapter: &str, at: DateTime<Utc>) -> i64 {
        self.state
            .read()
            .monthly_totals
            .get(&(adapter.to_string(), month_bucket(at)))
            .copied()
            .unwrap_or(0)
    }

    /// Reject further spend once a rolling total meets or exceeds its
    /// ceiling. Windows without a configured budget (ceiling 0) never
    /// reject.
    pub fn check_budget(&self, adapter: &str, at: DateTime<Utc>) -> Result<(), CostError> {
        let state = self.state.read();
        let Some(model) = state.models.get(adapter) else {
            return Ok(());
        };

        let daily = state
            .daily_totals
            .get(&(adapter.to_string(), day_bucket(at)))
            .copied()
            .unwrap_or(0);
        if model.daily_budget_minor > 0 && daily >= model.daily_budget_minor {
            return Err(CostError::BudgetExceeded {
                adapter: adapter.to_string(),
                window: BudgetWindow::Daily,
                spent_minor: daily,
                budget_minor: model.daily_budget_minor,
            });
        }

        let monthly = state
            .monthly_totals
            .get(&(adapter.to_string(), month_bucket(at)))
            .copied()
            .unwrap_or(0);
        if model.monthly_budget_minor > 0 && monthly >= model.monthly_budget_minor {
            return Err(CostError::BudgetExceeded {
                adapter: adapter.to_string(),
                window: BudgetWindow::Monthly,
                spent_minor: monthly,
                budget_minor: model.monthly_budget_minor,
            });
        }

        Ok(())
    }

    /// Record a cost and return any alerts this recording raised.
    ///
    /// Both rolling totals update under one write lock. An alert is
    /// raised for a window when this record moves utilization across the
    /// warning threshold or to 100%, independently per window.
    pub fn record(
        &self,
        adapter: &str,
        amount_minor: i64,
        success: bool,
        at: DateTime<Utc>,
    ) -> Vec<CostAlert> {
        let mut state = self.state.write();
        let (currency, daily_budget, monthly_budget, threshold_pct) = match state
            .models
            .get(adapter)
        {
            Some(model) => (
                model.currency.clone(),
                model.daily_budget_minor,
                model.monthly_budget_minor,
                model.alert_threshold_pct,
            ),
            None => ("USD".to_string(), 0, 0, 100),
        };

        state.records.push(CostRecord {
            adapter: adapter.to_string(),
            amount_minor,
            currency,
            success,
            recorded_at: at,
        });

        let daily_key = (adapter.to_string(), day_bucket(at));
        let daily_before = state.daily_totals.get(&daily_key).copied().unwrap_or(0);
        let daily_after = daily_before + amount_minor;
        state.daily_totals.insert(daily_key, daily_after);

        let monthly_key = (adapter.to_string(), month_bucket(at));
        let monthly_before = state.monthly_totals.get(&monthly_key).copied().unwrap_or(0);
        let monthly_after = monthly_before + amount_minor;
        state.monthly_totals.insert(monthly_key, monthly_after);
        drop(state);

        let mut alerts = Vec::new();
        for (window, budget, before, after) in [
            (BudgetWindow::Daily, daily_budget, daily_before, daily_after),
            (
                BudgetWindow::Monthly,
                monthly_budget,
                monthly_before,
                monthly_after,
            ),
        ] {
            if let Some(alert) =
                utilization_alert(adapter, window, budget, threshold_pct, before, after, at)
            {
                tracing::warn!(
                    adapter,
                    window = %alert.window,
                    level = %alert.level,
                    utilization_pct = alert.utilization_pct,
                    "budget utilization alert"
                );
                alerts.push(alert);
            }
        }
        alerts
    }

    /// Aggregate spend over `[from, to)`, bucketed by the given window.
    pub fn summary(
        &self,
        window: BudgetWindow,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> CostSummary {
        let state = self.state.read();
        let mut total = 0i64;
        let mut call_count = 0usize;
        let mut success_count = 0usize;
        let mut by_adapter: BTreeMap<String, i64> = BTreeMap::new();
        let mut by_bucket: BTreeMap<String, i64> = BTreeMap::new();

        for record in &state.records {
            if record.recorded_at < from || record.recorded_at >= to {
                continue;
            }
            total += record.amount_minor;
            call_count += 1;
            if record.success {
                success_count += 1;
            }
            *by_adapter.entry(record.adapter.clone()).or_default() += record.amount_minor;
            let bucket = match window {
                BudgetWindow::Daily => day_bucket(record.recorded_at),
                BudgetWindow::Monthly => month_bucket(record.recorded_at),
            };
            *by_bucket.entry(bucket).or_default() += record.amount_minor;
        }

        CostSummary {
            from,
            to,
            total_minor: total,
            call_count,
            success_count,
            by_adapter,
            by_bucket,
        }
    }

    /// Number of recorded costs.
    pub fn record_count(&self) -> usize {
        self.state.read().records.len()
    }
}

/// Build the alert for one window, when this recording crossed a line.
fn utilization_alert(
    adapter: &str,
    window: BudgetWindow,
    budget_minor: i64,
    threshold_pct: u8,
    before_minor: i64,
    after_minor: i64,
    at: DateTime<Utc>,
) -> Option<CostAlert> {
    if budget_minor <= 0 {
        return None;
    }
    let pct_of = |spent: i64| ((spent as f64 / budget_minor as f64) * 100.0) as u32;
    let before_pct = pct_of(before_minor);
    let after_pct = pct_of(after_minor);

    let level = if before_pct < 100 && after_pct >= 100 {
        AlertLevel::Critical
    } else if before_pct < u32::from(threshold_pct) && after_pct >= u32::from(threshold_pct) {
        AlertLevel::Warning
    } else {
        return None;
    };

    Some(CostAlert {
        adapter: adapter.to_string(),
        window,
        level,
        utilization_pct: after_pct,
        spent_minor: after_minor,
        budget_minor,
        raised_at: at,
    })
}
