//! # veris-cost: Cost and Budget Governance
//!
//! Tracks per-adapter spend against daily and monthly budgets and raises
//! utilization alerts. Amounts are integer minor units (cents); money is
//! never a float anywhere in this crate.
//!
//! A budget ceiling of zero means no budget is configured for that
//! window: spend is unlimited and never rejected.

pub mod ledger;
pub mod model;

pub use ledger::{CostError, CostLedger};
pub use model::{
    AlertLevel, BillingModel, BudgetWindow, CostAlert, CostModel, CostRecord, CostSummary,
};
