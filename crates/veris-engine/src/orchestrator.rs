//! # Verifier
//!
//! The orchestrated request lifecycle: shape validation, the rate-limit
//! and consent gates, budget check, routing, the adapter call,
//! normalization, audit, result caching, fraud analysis, trust
//! integration, and cost recording.
//!
//! Each component store is owned by its component and reached only
//! through that component's interface. The adapter call is the single
//! awaited operation and runs with no lock held.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use veris_audit::{AuditAction, AuditEntry, AuditLog};
use veris_consent::{Consent, ConsentError, ConsentManager};
use veris_core::{AuditEntryId, ConsentId, DocumentType, JurisdictionCode, RequesterId};
use veris_cost::CostLedger;
use veris_risk::{FraudDetector, FraudEngine, FraudReporter, LivenessProbe, LivenessResult};
use veris_source::{
    SourceAdapter, SourceError, SourceRegistry, VerificationRequest, VerificationResponse,
    VerificationStatus,
};
use veris_trust::TrustIntegrator;

use crate::config::ServiceConfig;
use crate::error::VerifyError;
use crate::health::{HousekeepingReport, ServiceHealth};
use crate::ratelimit::RateLimiter;
use crate::results::ResultStore;

/// The verification orchestrator.
pub struct Verifier {
    config: ServiceConfig,
    registry: SourceRegistry,
    rate_limiter: RateLimiter,
    consents: ConsentManager,
    audit: AuditLog,
    results: ResultStore,
    fraud: FraudEngine,
    trust: TrustIntegrator,
    costs: CostLedger,
    liveness: Option<Arc<dyn LivenessProbe>>,
    storage_warnings: RwLock<Vec<String>>,
    last_housekeeping: RwLock<Option<DateTime<Utc>>>,
}

impl Verifier {
    /// Build a verifier from configuration and a populated adapter
    /// registry.
    pub fn new(config: ServiceConfig, registry: SourceRegistry) -> Self {
        let audit = match config.audit_capacity {
            Some(capacity) => AuditLog::with_capacity(capacity),
            None => AuditLog::new(),
        };
        let costs = CostLedger::new();
        for (adapter, model) in &config.cost_models {
            costs.set_model(adapter.clone(), model.clone());
        }

        Self {
            rate_limiter: RateLimiter::new(config.rate_limit),
            consents: ConsentManager::new(),
            audit,
            results: ResultStore::new(),
            fraud: FraudEngine::new(config.fraud.clone()),
            trust: TrustIntegrator::new(config.trust.clone()),
            costs,
            liveness: None,
            storage_warnings: RwLock::new(Vec::new()),
            last_housekeeping: RwLock::new(None),
            config,
            registry,
        }
    }

    /// Builder: attach the liveness pipeline.
    pub fn with_liveness(mut self, probe: Arc<dyn LivenessProbe>) -> Self {
        self.liveness = Some(probe);
        self
    }

    /// Builder: attach an external fraud detector.
    pub fn with_fraud_detector(mut self, detector: Arc<dyn FraudDetector>) -> Self {
        let fraud = self.fraud;
        self.fraud = fraud.with_detector(detector);
        self
    }

    /// Builder: attach an external fraud reporter.
    pub fn with_fraud_reporter(mut self, reporter: Arc<dyn FraudReporter>) -> Self {
        let fraud = self.fraud;
        self.fraud = fraud.with_reporter(reporter);
        self
    }

    // -- Component access ---------------------------------------------------

    /// The active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The adapter registry.
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// The rate limiter (admin reset lives here).
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// The consent manager.
    pub fn consents(&self) -> &ConsentManager {
        &self.consents
    }

    /// The audit log.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// The verification result store.
    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    /// The fraud engine (blacklist management lives here).
    pub fn fraud(&self) -> &FraudEngine {
        &self.fraud
    }

    /// The trust integrator.
    pub fn trust(&self) -> &TrustIntegrator {
        &self.trust
    }

    /// The cost ledger.
    pub fn costs(&self) -> &CostLedger {
        &self.costs
    }

    // -- Verification lifecycle ---------------------------------------------

    /// Run one verification request through the full pipeline.
    ///
    /// Admission and routing rejections return before any adapter call;
    /// no cost is recorded and no verification audit entry is written
    /// for them beyond a rejection log event. Adapter errors are
    /// recorded as a failed verification, audited, and then returned.
    pub async fn verify(
        &self,
        request: VerificationRequest,
    ) -> Result<VerificationResponse, VerifyError> {
        let started = Utc::now();

        if !self.config.enabled {
            return Err(self.reject(&request, VerifyError::Disabled));
        }
        if let Err(e) = request.validate() {
            return Err(self.reject(&request, VerifyError::InvalidRequest(e)));
        }
        if !self.rate_limiter.allow(&request.requester, started) {
            return Err(self.reject(&request, VerifyError::RateLimited));
        }
        if self.config.require_consent {
            if let Err(e) = self
                .consents
                .validate(request.consent_id.as_ref(), &request, started)
            {
                return Err(self.reject(&request, VerifyError::Consent(e)));
            }
        }
        let adapter = match self.registry.route(&request.jurisdiction, request.document_type) {
            Ok(adapter) => adapter,
            Err(e) => return Err(self.reject(&request, VerifyError::Route(e))),
        };
        if let Err(e) = self.costs.check_budget(adapter.name(), started) {
            return Err(self.reject(&request, VerifyError::Budget(e)));
        }

        // The only blocking operation. No lock is held across it, and
        // dropping this future propagates the caller's cancellation into
        // the adapter call.
        let outcome = adapter.verify(&request).await;

        let completed = Utc::now();
        let duration_ms = completed
            .signed_duration_since(started)
            .num_milliseconds()
            .max(0) as u64;
        let policy = self.config.retention.policy_for(&request.jurisdiction);

        match outcome {
            Ok(mut response) => {
                // Normalize: key the response by our request, clamp is
                // already enforced by construction, stamp the result
                // expiry from the jurisdiction's retention policy.
                response.request_id = request.request_id.clone();
                response.result_expires_at = Some(policy.result_expiry(completed));

                response.audit_entry_id = self.write_audit(
                    AuditEntry::new(
                        AuditAction::VerificationAttempted,
                        request.requester.clone(),
                        response.status.as_str(),
                        completed,
                        policy.audit_expiry(completed),
                    )
                    .with_request(request.request_id.clone())
                    .with_jurisdiction(request.jurisdiction.clone())
                    .with_document_type(request.document_type)
                    .with_source(response.source)
                    .with_duration_ms(duration_ms),
                );

                self.results
                    .insert(request.requester.clone(), response.clone());

                if self.config.fraud_checks_enabled {
                    let liveness = self.collect_liveness(&request).await;
                    let check = self
                        .fraud
                        .check(&request, Some(&response), liveness.as_ref(), completed)
                        .await;
                    let mut warnings: Vec<String> = check
                        .signals
                        .iter()
                        .map(|s| format!("{}: {}", s.kind, s.evidence))
                        .collect();
                    if check.blocked {
                        warnings.push("verification blocked by fraud policy".to_string());
                    }
                    if !warnings.is_empty() {
                        self.results.annotate(&request.request_id, &warnings);
                        response.warnings.extend(warnings);
                    }
                }

                if self.config.trust_integration_enabled && response.status.is_success() {
                    if let Err(e) = self.trust.create_scope(&response, &request, completed) {
                        tracing::info!(
                            request_id = %request.request_id,
                            reason = %e,
                            "trust integration skipped"
                        );
                    }
                }

                let success = response.status.is_success();
                let amount = self.costs.calculate(adapter.name(), success);
                self.costs.record(adapter.name(), amount, success, completed);

                tracing::info!(
                    request_id = %request.request_id,
                    status = %response.status,
                    confidence = response.confidence,
                    adapter = adapter.name(),
                    duration_ms,
                    "verification completed"
                );
                Ok(response)
            }
            Err(source_err) => {
                let failure_status = match &source_err {
                    SourceError::RequestFailed { .. } => VerificationStatus::Failed,
                    SourceError::Unavailable { .. } | SourceError::Timeout { .. } => {
                        VerificationStatus::SourceUnavailable
                    }
                };

                let mut response = VerificationResponse::new(
                    request.request_id.clone(),
                    failure_status,
                    0.0,
                    adapter.kind(),
                    adapter.jurisdiction().clone(),
                );
                response.completed_at = completed;
                response.result_expires_at = Some(policy.result_expiry(completed));
                response.audit_entry_id = self.write_audit(
                    AuditEntry::new(
                        AuditAction::VerificationAttempted,
                        request.requester.clone(),
                        failure_status.as_str(),
                        completed,
                        policy.audit_expiry(completed),
                    )
                    .with_request(request.request_id.clone())
                    .with_jurisdiction(request.jurisdiction.clone())
                    .with_document_type(request.document_type)
                    .with_source(adapter.kind())
                    .with_duration_ms(duration_ms),
                );
                self.results.insert(request.requester.clone(), response);

                let amount = self.costs.calculate(adapter.name(), false);
                self.costs.record(adapter.name(), amount, false, completed);

                tracing::warn!(
                    request_id = %request.request_id,
                    adapter = adapter.name(),
                    error = %source_err,
                    "adapter verification failed"
                );
                Err(VerifyError::Source(source_err))
            }
        }
    }

    /// Replay the pipeline for each request in order. With `fail_fast`,
    /// stop after the first failed item; its error is the last element
    /// of the returned vector.
    pub async fn verify_batch(
        &self,
        requests: Vec<VerificationRequest>,
        fail_fast: bool,
    ) -> Vec<Result<VerificationResponse, VerifyError>> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            let outcome = self.verify(request).await;
            let failed = outcome.is_err();
            outcomes.push(outcome);
            if fail_fast && failed {
                break;
            }
        }
        outcomes
    }

    // -- Consent lifecycle --------------------------------------------------

    /// Grant a consent through the orchestrator, writing the audit entry
    /// synchronously before returning.
    pub fn grant_consent(
        &self,
        requester: RequesterId,
        document_types: BTreeSet<DocumentType>,
        jurisdictions: BTreeSet<JurisdictionCode>,
        purpose: impl Into<String>,
    ) -> Consent {
        let now = Utc::now();
        let consent = self.consents.grant(
            requester.clone(),
            document_types,
            jurisdictions,
            purpose,
            Duration::days(i64::from(self.config.default_consent_days)),
            now,
        );

        let policy = self.config.retention.default_policy();
        self.write_audit(
            AuditEntry::new(
                AuditAction::ConsentGranted,
                requester,
                "granted",
                now,
                policy.audit_expiry(now),
            )
            .with_consent(consent.id.clone()),
        );
        consent
    }

    /// Revoke a consent through the orchestrator, writing the audit
    /// entry synchronously before returning.
    pub fn revoke_consent(&self, consent_id: &ConsentId) -> Result<Consent, ConsentError> {
        let now = Utc::now();
        let consent = self.consents.revoke(consent_id, now)?;

        let policy = self.config.retention.default_policy();
        self.write_audit(
            AuditEntry::new(
                AuditAction::ConsentRevoked,
                consent.requester.clone(),
                "revoked",
                now,
                policy.audit_expiry(now),
            )
            .with_consent(consent.id.clone()),
        );
        Ok(consent)
    }

    // -- Housekeeping and health --------------------------------------------

    /// One purge pass over every retention-governed store. Takes the
    /// same locks as normal traffic, one store at a time.
    pub fn run_housekeeping(&self, now: DateTime<Utc>) -> HousekeepingReport {
        let report = HousekeepingReport {
            consents_purged: self.consents.purge_expired(&self.config.retention, now),
            audit_purged: self.audit.purge_expired(now),
            results_purged: self.results.purge_expired(now),
            scopes_purged: self.trust.purge_expired(now),
        };
        *self.last_housekeeping.write() = Some(now);

        tracing::info!(
            consents = report.consents_purged,
            audit = report.audit_purged,
            results = report.results_purged,
            scopes = report.scopes_purged,
            "housekeeping pass completed"
        );
        report
    }

    /// Point-in-time health snapshot. Storage failures recorded during
    /// operation surface here.
    pub fn health(&self) -> ServiceHealth {
        let storage_warnings = self.storage_warnings.read().clone();
        let audit_status = if storage_warnings.is_empty() {
            "ok".to_string()
        } else {
            format!("degraded: {} rejected writes", storage_warnings.len())
        };

        let components = [
            ("router", "ok".to_string()),
            ("rate_limiter", "ok".to_string()),
            ("consent", "ok".to_string()),
            ("audit", audit_status),
            ("results", "ok".to_string()),
            ("fraud", "ok".to_string()),
            ("trust", "ok".to_string()),
            ("cost", "ok".to_string()),
        ]
        .into_iter()
        .map(|(name, status)| (name.to_string(), status))
        .collect();

        ServiceHealth {
            enabled: self.config.enabled,
            components,
            adapters: self.registry.statuses(),
            consent_records: self.consents.len(),
            audit_entries: self.audit.len(),
            results_cached: self.results.len(),
            trust_scopes: self.trust.len(),
            cost_records: self.costs.record_count(),
            storage_warnings,
            last_housekeeping: *self.last_housekeeping.read(),
            generated_at: Utc::now(),
        }
    }

    // -- Internals ----------------------------------------------------------

    /// Log a rejection. Rejections produce no cost and no verification
    /// audit entry; the log event is their only trace.
    fn reject(&self, request: &VerificationRequest, error: VerifyError) -> VerifyError {
        tracing::warn!(
            request_id = %request.request_id,
            requester = %request.requester,
            jurisdiction = %request.jurisdiction,
            status = %error.status(),
            error = %error,
            "verification request rejected"
        );
        error
    }

    /// Write an audit entry. Failure is a service-level warning; the
    /// originating call continues without an entry id.
    fn write_audit(&self, entry: AuditEntry) -> Option<AuditEntryId> {
        match self.audit.log(entry) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "audit write failed; continuing without audit entry");
                self.storage_warnings
                    .write()
                    .push(format!("audit write failed: {e}"));
                None
            }
        }
    }

    async fn collect_liveness(&self, request: &VerificationRequest) -> Option<LivenessResult> {
        let probe = self.liveness.as_ref()?;
        match probe.check_liveness(request).await {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(
                    request_id = %request.request_id,
                    error = %e,
                    "liveness probe failed; continuing without liveness signals"
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("enabled", &self.config.enabled)
            .field("adapters", &self.registry.len())
            .field("results_cached", &self.results.len())
            .finish()
    }
}
