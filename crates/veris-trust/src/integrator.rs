//! # Trust Integrator
//!
//! Owns the scope store and the scoring formulas. Scores are pure
//! functions of the stored scopes and the supplied clock, so repeated
//! calls at the same instant return the same value.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use thiserror::Error;

use veris_core::{RequesterId, ScopeId};
use veris_source::{VerificationRequest, VerificationResponse, VerificationStatus};

use crate::config::TrustConfig;
use crate::scope::{source_multiplier, ScopeStatus, TrustScope};

/// Trust integration failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrustError {
    /// Only successful verifications create scopes.
    #[error("verification status {status} is not eligible for trust integration")]
    NotSuccessful {
        /// The ineligible status.
        status: VerificationStatus,
    },

    /// The verification's confidence is below the configured minimum.
    #[error("confidence {confidence:.2} is below the trust minimum {minimum:.2}")]
    ConfidenceBelowThreshold {
        /// The verification's confidence.
        confidence: f64,
        /// The configured minimum.
        minimum: f64,
    },

    /// A lifecycle operation referenced a scope that does not exist.
    #[error("trust scope {scope_id} not found")]
    ScopeNotFound {
        /// The missing scope.
        scope_id: ScopeId,
    },
}

/// The freshness multiplier for a scope of the given age.
///
/// 1.0 inside the freshness window, then a linear discount that reaches
/// the configured floor at the decay horizon and never goes below it.
pub fn freshness_factor(age_days: i64, config: &TrustConfig) -> f64 {
    let window = i64::from(config.freshness_window_days);
    let horizon = i64::from(config.decay_horizon_days);
    if age_days <= window {
        return 1.0;
    }
    if age_days >= horizon || horizon <= window {
        return config.decay_floor;
    }
    let progress = (age_days - window) as f64 / (horizon - window) as f64;
    1.0 - (1.0 - config.decay_floor) * progress
}

/// Owner of all trust scopes, keyed by id with per-requester access.
#[derive(Debug)]
pub struct TrustIntegrator {
    config: TrustConfig,
    scopes: RwLock<HashMap<ScopeId, TrustScope>>,
}

impl TrustIntegrator {
    /// Create an integrator with the given configuration.
    pub fn new(config: TrustConfig) -> Self {
        Self {
            config,
            scopes: RwLock::new(HashMap::new()),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &TrustConfig {
        &self.config
    }

    /// Compute the contribution a verification earns, before storage.
    ///
    /// base x confidence x deployment source weight x per-source
    /// multiplier, plus the verified-fields and document-validity
    /// bonuses, capped at the single-verification cap.
    pub fn contribution(&self, response: &VerificationResponse) -> f64 {
        let mut value = self.config.base_contribution
            * response.confidence
            * self.config.source_weight
            * source_multiplier(response.source);
        if response.matched_field_count() > 3 {
            value += self.config.field_bonus;
        }
        if response.document_valid {
            value += self.config.validity_bonus;
        }
        value.min(self.config.single_cap)
    }

    /// Create and store a scope from a completed verification.
    ///
    /// # Errors
    ///
    /// Fails when the status is not a success status or the confidence is
    /// below the configured minimum.
    pub fn create_scope(
        &self,
        response: &VerificationResponse,
        request: &VerificationRequest,
        now: DateTime<Utc>,
    ) -> Result<TrustScope, TrustError> {
        if !response.status.is_success() {
            return Err(TrustError::NotSuccessful {
                status: response.status,
            });
        }
        if response.confidence < self.config.min_confidence {
            return Err(TrustError::ConfidenceBelowThreshold {
                confidence: response.confidence,
                minimum: self.config.min_confidence,
            });
        }

        let scope = TrustScope {
            id: ScopeId::new(),
            requester: request.requester.clone(),
            document_type: request.document_type,
            jurisdiction: request.jurisdiction.clone(),
            source: response.source,
            verification_status: response.status,
            confidence: response.confidence,
            contribution: self.contribution(response),
            verified_at: now,
            expires_at: now + Duration::days(i64::from(self.config.scope_ttl_days)),
            status: ScopeStatus::Active,
        };
        self.scopes.write().insert(scope.id.clone(), scope.clone());

        tracing::info!(
            scope_id = %scope.id,
            requester = %scope.requester,
            contribution = scope.contribution,
            "trust scope created"
        );
        Ok(scope)
    }

    /// Revoke a scope.
    ///
    /// # Errors
    ///
    /// Returns [`TrustError::ScopeNotFound`] when the id is unknown.
    pub fn revoke_scope(&self, scope_id: &ScopeId) -> Result<(), TrustError> {
        let mut scopes = self.scopes.write();
        let scope = scopes
            .get_mut(scope_id)
            .ok_or_else(|| TrustError::ScopeNotFound {
                scope_id: scope_id.clone(),
            })?;
        scope.status = ScopeStatus::Revoked;
        Ok(())
    }

    /// All scopes belonging to a requester, active or not.
    pub fn scopes_for(&self, requester: &RequesterId) -> Vec<TrustScope> {
        self.scopes
            .read()
            .values()
            .filter(|s| s.requester == *requester)
            .cloned()
            .collect()
    }

    /// The requester's aggregate multi-source trust score at `now`.
    ///
    /// Sums each active scope's stored contribution after freshness
    /// decay, adds the source- and jurisdiction-diversity bonuses, and
    /// caps the total at 1.0.
    pub fn multi_source_score(&self, requester: &RequesterId, now: DateTime<Utc>) -> f64 {
        let scopes = self.scopes.read();
        let mut total = 0.0;
        let mut kinds = BTreeSet::new();
        let mut jurisdictions = BTreeSet::new();

        for scope in scopes.values() {
            if scope.requester != *requester || !scope.is_active(now) {
                continue;
            }
            total += scope.contribution * freshness_factor(scope.age_days(now), &self.config);
            kinds.insert(scope.source);
            jurisdictions.insert(scope.jurisdiction.clone());
        }
        drop(scopes);

        if !kinds.is_empty() {
            total += self.config.multi_source_bonus * (kinds.len() - 1) as f64;
        }
        if !jurisdictions.is_empty() {
            total += self.config.jurisdiction_bonus * (jurisdictions.len() - 1) as f64;
        }
        total.clamp(0.0, 1.0)
    }

    /// Number of stored scopes.
    pub fn len(&self) -> usize {
        self.scopes.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.scopes.read().is_empty()
    }

    /// Remove expired and revoked scopes. Returns the number removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut scopes = self.scopes.write();
        let initial = scopes.len();
        scopes.retain(|_, s| s.is_active(now));
        let removed = initial - scopes.len();
        drop(scopes);

        if removed > 0 {
            tracing::info!(removed, "trust scope purge completed");
        }
        removed
    }
}
