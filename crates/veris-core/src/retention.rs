//! # Retention Policy Schedule
//!
//! Per-jurisdiction data-retention windows for the three record classes
//! the core persists: verification results, audit entries, and consent
//! records. Privacy law differs by jurisdiction, so the schedule is keyed
//! by jurisdiction code with a country-prefix fallback and a default
//! policy for everything else.
//!
//! Windows are day counts. Expiry stamps are computed at write time so a
//! later purge pass only compares timestamps.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::jurisdiction::JurisdictionCode;

/// Retention windows for one jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Days a cached verification result is kept.
    pub result_days: u32,
    /// Days an audit entry is kept.
    pub audit_days: u32,
    /// Days a revoked or expired consent record is kept before purge.
    pub consent_days: u32,
    /// Whether the housekeeping pass purges records for this jurisdiction.
    pub auto_purge: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        // Conservative defaults: short-lived results, long audit trail.
        Self {
            result_days: 90,
            audit_days: 2555,
            consent_days: 1825,
            auto_purge: true,
        }
    }
}

impl RetentionPolicy {
    /// Expiry timestamp for a verification result written at `now`.
    pub fn result_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(i64::from(self.result_days))
    }

    /// Expiry timestamp for an audit entry written at `now`.
    pub fn audit_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(i64::from(self.audit_days))
    }

    /// The earliest time a consent that ended (expired or was revoked) at
    /// `ended_at` may be purged.
    pub fn consent_purge_after(&self, ended_at: DateTime<Utc>) -> DateTime<Utc> {
        ended_at + Duration::days(i64::from(self.consent_days))
    }
}

/// A schedule of retention policies keyed by jurisdiction.
///
/// Lookup order: exact jurisdiction code, then its 2-letter country
/// prefix, then the default policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetentionSchedule {
    /// Jurisdiction-specific overrides, keyed by canonical code string.
    #[serde(default)]
    overrides: HashMap<String, RetentionPolicy>,
    /// Fallback policy when no override matches.
    #[serde(default)]
    default_policy: RetentionPolicy,
}

impl RetentionSchedule {
    /// Create a schedule with only the given default policy.
    pub fn new(default_policy: RetentionPolicy) -> Self {
        Self {
            overrides: HashMap::new(),
            default_policy,
        }
    }

    /// Register an override for a jurisdiction. Replaces any existing
    /// override for the same code.
    pub fn set(&mut self, jurisdiction: JurisdictionCode, policy: RetentionPolicy) {
        self.overrides.insert(jurisdiction.as_str().to_string(), policy);
    }

    /// Builder: add an override.
    pub fn with(mut self, jurisdiction: JurisdictionCode, policy: RetentionPolicy) -> Self {
        self.set(jurisdiction, policy);
        self
    }

    /// Resolve the policy for a jurisdiction.
    pub fn policy_for(&self, jurisdiction: &JurisdictionCode) -> RetentionPolicy {
        if let Some(p) = self.overrides.get(jurisdiction.as_str()) {
            return *p;
        }
        if jurisdiction.has_subdivision() {
            if let Some(p) = self.overrides.get(jurisdiction.country()) {
                return *p;
            }
        }
        self.default_policy
    }

    /// The fallback policy.
    pub fn default_policy(&self) -> RetentionPolicy {
        self.default_policy
    }
}
