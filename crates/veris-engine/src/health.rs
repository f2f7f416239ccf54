//! # Service Health Snapshot
//!
//! Point-in-time view of the orchestrator and its components. Storage
//! failures recorded during operation (audit write rejections and the
//! like) surface here; they are never silently discarded.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use veris_source::AdapterStatus;

/// Counters from one housekeeping pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousekeepingReport {
    /// Consent records purged.
    pub consents_purged: usize,
    /// Audit entries purged.
    pub audit_purged: usize,
    /// Cached results purged.
    pub results_purged: usize,
    /// Trust scopes purged.
    pub scopes_purged: usize,
}

impl HousekeepingReport {
    /// Total records removed by the pass.
    pub fn total(&self) -> usize {
        self.consents_purged + self.audit_purged + self.results_purged + self.scopes_purged
    }
}

/// Point-in-time service health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Whether the service accepts requests.
    pub enabled: bool,
    /// Per-component status strings, `"ok"` or an error description.
    pub components: BTreeMap<String, String>,
    /// Operational statistics for every registered adapter.
    pub adapters: Vec<AdapterStatus>,
    /// Stored consent records.
    pub consent_records: usize,
    /// Stored audit entries.
    pub audit_entries: usize,
    /// Cached verification results.
    pub results_cached: usize,
    /// Stored trust scopes.
    pub trust_scopes: usize,
    /// Recorded cost entries.
    pub cost_records: usize,
    /// Storage-level warnings recorded since startup, oldest first.
    pub storage_warnings: Vec<String>,
    /// When housekeeping last ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_housekeeping: Option<DateTime<Utc>>,
    /// When this snapshot was taken.
    pub generated_at: DateTime<Utc>,
}

impl ServiceHealth {
    /// Whether every component reports `"ok"` and no storage warnings
    /// are outstanding.
    pub fn is_healthy(&self) -> bool {
        self.components.values().all(|status| status == "ok") && self.storage_warnings.is_empty()
    }
}
