//! # Fraud Engine
//!
//! Runs the four built-in detectors, merges the external detector when
//! one is configured and available, aggregates signal scores, resolves
//! the action, and escalates critical findings to the external reporter.
//!
//! The engine owns the velocity map and the hashed blacklist. Raw
//! document numbers never enter engine state; the blacklist keys on
//! SHA-256 digests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use veris_core::{DocumentNumber, RequesterId};
use veris_source::{VerificationRequest, VerificationResponse, VerificationStatus};

use crate::config::FraudConfig;
use crate::liveness::{LivenessResult, SpoofCategory};
use crate::plugin::{FraudDetector, FraudReport, FraudReporter};
use crate::signal::{FraudCheckResult, FraudSignal, RecommendedAction, Severity, SignalKind};

/// Aggregate signal scores: the maximum score plus `corroboration_weight`
/// times the sum of the remaining scores, clamped to [0, 1].
///
/// One strong signal dominates; additional weaker signals push the score
/// up with diminishing influence. An empty slice scores 0.
pub fn aggregate_score(signals: &[FraudSignal], corroboration_weight: f64) -> f64 {
    let Some(max) = signals
        .iter()
        .map(|s| s.score)
        .fold(None::<f64>, |acc, s| Some(acc.map_or(s, |a| a.max(s))))
    else {
        return 0.0;
    };
    let rest: f64 = signals.iter().map(|s| s.score).sum::<f64>() - max;
    (max + corroboration_weight * rest).clamp(0.0, 1.0)
}

/// The fraud/risk engine.
pub struct FraudEngine {
    config: FraudConfig,
    velocity: RwLock<HashMap<RequesterId, Vec<DateTime<Utc>>>>,
    blacklist: RwLock<HashSet<String>>,
    detector: Option<Arc<dyn FraudDetector>>,
    reporter: Option<Arc<dyn FraudReporter>>,
}

impl FraudEngine {
    /// Create an engine with the given configuration and no plug-ins.
    pub fn new(config: FraudConfig) -> Self {
        Self {
            config,
            velocity: RwLock::new(HashMap::new()),
            blacklist: RwLock::new(HashSet::new()),
            detector: None,
            reporter: None,
        }
    }

    /// Builder: attach an external fraud detector.
    pub fn with_detector(mut self, detector: Arc<dyn FraudDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Builder: attach an external fraud reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn FraudReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &FraudConfig {
        &self.config
    }

    // -- Blacklist ----------------------------------------------------------

    /// Add a document number to the blacklist (stored as its digest).
    pub fn blacklist_document(&self, document_number: &DocumentNumber) {
        self.blacklist.write().insert(document_number.digest());
    }

    /// Add a pre-computed digest to the blacklist, for loading compiled
    /// denylists.
    pub fn blacklist_digest(&self, digest: impl Into<String>) {
        self.blacklist.write().insert(digest.into());
    }

    /// Whether a document number is blacklisted.
    pub fn is_blacklisted(&self, document_number: &DocumentNumber) -> bool {
        self.blacklist.read().contains(&document_number.digest())
    }

    /// Number of blacklist entries.
    pub fn blacklist_len(&self) -> usize {
        self.blacklist.read().len()
    }

    // -- Velocity -----------------------------------------------------------

    /// Record a check for the requester and return the count inside the
    /// current window, including this one. Stale timestamps are pruned in
    /// the same critical section.
    pub fn record_attempt(&self, requester: &RequesterId, now: DateTime<Utc>) -> usize {
        let window = Duration::seconds(self.config.velocity_window_secs as i64);
        let mut velocity = self.velocity.write();
        let attempts = velocity.entry(requester.clone()).or_default();
        attempts.retain(|ts| now.signed_duration_since(*ts) < window);
        attempts.push(now);
        attempts.len()
    }

    /// The number of recorded checks inside the requester's current
    /// window, without recording one.
    pub fn attempts_in_window(&self, requester: &RequesterId, now: DateTime<Utc>) -> usize {
        let window = Duration::seconds(self.config.velocity_window_secs as i64);
        self.velocity
            .read()
            .get(requester)
            .map(|attempts| {
                attempts
                    .iter()
                    .filter(|ts| now.signed_duration_since(**ts) < window)
                    .count()
            })
            .unwrap_or(0)
    }

    // -- Check --------------------------------------------------------------

    /// Run all detectors against one request and resolve the result.
    ///
    /// `response` is the just-completed verification outcome, when one
    /// exists; `liveness` is the attached liveness verdict, when one was
    /// collected. Both detectors are skipped without their input, the
    /// velocity and blacklist detectors always run.
    pub async fn check(
        &self,
        request: &VerificationRequest,
        response: Option<&VerificationResponse>,
        liveness: Option<&LivenessResult>,
        now: DateTime<Utc>,
    ) -> FraudCheckResult {
        let mut signals: Vec<FraudSignal> = Vec::new();

        // 1. Velocity.
        let attempts = self.record_attempt(&request.requester, now);
        if attempts > self.config.velocity_ceiling as usize {
            signals.push(FraudSignal::new(
                SignalKind::VelocityAnomaly,
                Severity::Medium,
                0.5,
                RecommendedAction::Flag,
                format!(
                    "{attempts} checks within {}s window (ceiling {})",
                    self.config.velocity_window_secs, self.config.velocity_ceiling
                ),
            ));
        }

        // 2. Blacklist.
        if self.is_blacklisted(&request.document_number) {
            let digest = request.document_number.digest();
            signals.push(FraudSignal::new(
                SignalKind::BlacklistedDocument,
                Severity::Critical,
                1.0,
                RecommendedAction::Block,
                format!("document digest {} matched blacklist", &digest[..12]),
            ));
        }

        // 3. Result analysis.
        if let Some(response) = response {
            signals.extend(self.analyze_response(response, now));
        }

        // 4. Liveness analysis.
        if let Some(liveness) = liveness {
            signals.extend(analyze_liveness(liveness));
        }

        // External detector, merged when configured and available.
        let mut external_score: Option<f64> = None;
        if let Some(detector) = &self.detector {
            if detector.is_available().await {
                match detector.check(request).await {
                    Ok(assessment) => {
                        external_score = Some(assessment.score.clamp(0.0, 1.0));
                        signals.extend(assessment.signals);
                    }
                    Err(e) => {
                        tracing::warn!(request_id = %request.request_id, error = %e, "external fraud detector failed; continuing with built-in signals");
                    }
                }
            }
        }

        let mut score = aggregate_score(&signals, self.config.corroboration_weight);
        if let Some(external) = external_score {
            score = score.max(external);
        }

        let action = self.resolve_action(&signals, score);
        let blocked = action == RecommendedAction::Block;

        let report_id = if signals.iter().any(|s| s.severity == Severity::Critical) {
            self.submit_report(request, score, &signals, now).await
        } else {
            None
        };

        if blocked {
            tracing::warn!(
                request_id = %request.request_id,
                requester = %request.requester,
                score,
                "fraud check blocked verification"
            );
        }

        FraudCheckResult {
            request_id: request.request_id.clone(),
            score,
            signals,
            action,
            blocked,
            report_id,
            checked_at: now,
        }
    }

    fn analyze_response(
        &self,
        response: &VerificationResponse,
        now: DateTime<Utc>,
    ) -> Vec<FraudSignal> {
        let mut signals = Vec::new();

        let expired_status = response.status == VerificationStatus::DocumentExpired;
        let expired_by_date = response
            .document_expires_at
            .is_some_and(|expiry| expiry <= now);
        if expired_status || expired_by_date {
            signals.push(FraudSignal::new(
                SignalKind::DocumentExpired,
                Severity::High,
                0.65,
                RecommendedAction::Flag,
                "document reported expired or revoked by source",
            ));
        }

        if response.status.is_success() && response.confidence < self.config.confidence_floor {
            signals.push(FraudSignal::new(
                SignalKind::LowConfidence,
                Severity::Medium,
                0.4,
                RecommendedAction::Flag,
                format!(
                    "success result at confidence {:.2}, floor {:.2}",
                    response.confidence, self.config.confidence_floor
                ),
            ));
        }

        let mismatches = response.mismatched_field_count();
        if mismatches > self.config.mismatch_tolerance {
            signals.push(FraudSignal::new(
                SignalKind::FieldMismatches,
                Severity::High,
                0.75,
                RecommendedAction::Flag,
                format!(
                    "{mismatches} field mismatches, tolerance {}",
                    self.config.mismatch_tolerance
                ),
            ));
        }

        signals
    }

    fn resolve_action(&self, signals: &[FraudSignal], score: f64) -> RecommendedAction {
        // Severity overrides take precedence over threshold comparison.
        if self.config.block_on_critical
            && signals.iter().any(|s| s.severity == Severity::Critical)
        {
            return RecommendedAction::Block;
        }
        if self.config.block_on_high && signals.iter().any(|s| s.severity >= Severity::High) {
            return RecommendedAction::Block;
        }
        if score >= self.config.block_threshold {
            RecommendedAction::Block
        } else if score >= self.config.flag_threshold {
            RecommendedAction::Flag
        } else {
            RecommendedAction::Allow
        }
    }

    async fn submit_report(
        &self,
        request: &VerificationRequest,
        score: f64,
        signals: &[FraudSignal],
        now: DateTime<Utc>,
    ) -> Option<String> {
        let reporter = self.reporter.as_ref()?;
        let report = FraudReport {
            request_id: request.request_id.clone(),
            requester: request.requester.clone(),
            score,
            evidence: signals
                .iter()
                .filter(|s| s.severity == Severity::Critical)
                .map(|s| s.evidence.clone())
                .collect(),
            created_at: now,
        };
        match reporter.submit(&report).await {
            Ok(report_id) => {
                tracing::info!(request_id = %request.request_id, report_id, "fraud report submitted");
                Some(report_id)
            }
            Err(e) => {
                tracing::warn!(request_id = %request.request_id, error = %e, "fraud report submission failed");
                None
            }
        }
    }
}

fn analyze_liveness(liveness: &LivenessResult) -> Vec<FraudSignal> {
    let mut signals = Vec::new();
    match liveness.spoof {
        Some(SpoofCategory::Deepfake) => signals.push(FraudSignal::new(
            SignalKind::SpoofDetected,
            Severity::Critical,
            0.95,
            RecommendedAction::Block,
            "liveness detected deepfake presentation",
        )),
        Some(SpoofCategory::Mask) => signals.push(FraudSignal::new(
            SignalKind::SpoofDetected,
            Severity::High,
            0.75,
            RecommendedAction::Flag,
            "liveness detected mask presentation",
        )),
        Some(category @ (SpoofCategory::Photo | SpoofCategory::Screen)) => {
            signals.push(FraudSignal::new(
                SignalKind::SpoofDetected,
                Severity::Medium,
                0.55,
                RecommendedAction::Flag,
                format!("liveness detected {category} presentation"),
            ))
        }
        None => {
            if !liveness.passed && liveness.confidence < 0.5 {
                signals.push(FraudSignal::new(
                    SignalKind::LivenessFailed,
                    Severity::Medium,
                    0.5,
                    RecommendedAction::Flag,
                    format!(
                        "liveness failed at low confidence {:.2} without spoof classification",
                        liveness.confidence
                    ),
                ));
            }
        }
    }
    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{ExternalAssessment, PluginError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use veris_core::{DocumentType, JurisdictionCode, RequestId};
    use veris_source::{FieldMatch, FieldVerificationResult};

    fn request() -> VerificationRequest {
        VerificationRequest::new(
            RequesterId::new(),
            DocumentType::DriversLicense,
            JurisdictionCode::new("US-CA").unwrap(),
            DocumentNumber::new("D1234567").unwrap(),
        )
    }

    fn response(status: VerificationStatus, confidence: f64) -> VerificationResponse {
        VerificationResponse::new(
            RequestId::new(),
            status,
            confidence,
            veris_core::SourceKind::Dmv,
            JurisdictionCode::new("US").unwrap(),
        )
        .with_document_valid(true)
    }

    fn signal(score: f64, severity: Severity) -> FraudSignal {
        FraudSignal::new(
            SignalKind::External,
            severity,
            score,
            RecommendedAction::Flag,
            "test",
        )
    }

    // -- aggregate_score ----------------------------------------------------

    #[test]
    fn aggregate_empty_is_zero() {
        assert_eq!(aggregate_score(&[], 0.1), 0.0);
    }

    #[test]
    fn aggregate_single_signal_is_its_score() {
        let signals = vec![signal(0.6, Severity::Medium)];
        assert!((aggregate_score(&signals, 0.1) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn aggregate_rewards_strong_signal_with_corroboration() {
        let signals = vec![signal(0.8, Severity::High), signal(0.3, Severity::Low)];
        let score = aggregate_score(&signals, 0.1);
        assert!((score - 0.83).abs() < 1e-9);
    }

    #[test]
    fn aggregate_many_weak_signals_stay_below_strong() {
        let weak: Vec<_> = (0..5).map(|_| signal(0.2, Severity::Low)).collect();
        let score = aggregate_score(&weak, 0.1);
        // 0.2 + 0.1 * 0.8 = 0.28, far from a block threshold.
        assert!((score - 0.28).abs() < 1e-9);
    }

    #[test]
    fn aggregate_clamps_at_one() {
        let signals = vec![
            signal(1.0, Severity::Critical),
            signal(1.0, Severity::Critical),
            signal(1.0, Severity::Critical),
        ];
        assert_eq!(aggregate_score(&signals, 0.5), 1.0);
    }

    // -- velocity -----------------------------------------------------------

    #[tokio::test]
    async fn velocity_signal_fires_above_ceiling() {
        let engine = FraudEngine::new(FraudConfig::default().with_velocity(3600, 2));
        let req = request();
        let now = Utc::now();

        let first = engine.check(&req, None, None, now).await;
        assert!(first.signals.is_empty());
        let second = engine.check(&req, None, None, now).await;
        assert!(second.signals.is_empty());

        let third = engine.check(&req, None, None, now).await;
        assert_eq!(third.signals.len(), 1);
        assert_eq!(third.signals[0].kind, SignalKind::VelocityAnomaly);
        assert_eq!(third.signals[0].severity, Severity::Medium);
    }

    #[test]
    fn velocity_window_prunes_old_attempts() {
        let engine = FraudEngine::new(FraudConfig::default().with_velocity(60, 5));
        let requester = RequesterId::new();
        let start = Utc::now();

        assert_eq!(engine.record_attempt(&requester, start), 1);
        assert_eq!(engine.record_attempt(&requester, start), 2);
        // Past the window, old attempts no longer count.
        let later = start + Duration::seconds(61);
        assert_eq!(engine.record_attempt(&requester, later), 1);
        assert_eq!(engine.attempts_in_window(&requester, later), 1);
    }

    // -- blacklist ----------------------------------------------------------

    #[tokio::test]
    async fn blacklist_hit_is_critical_and_blocks() {
        let engine = FraudEngine::new(FraudConfig::default());
        let req = request();
        engine.blacklist_document(&req.document_number);
        assert!(engine.is_blacklisted(&req.document_number));
        assert_eq!(engine.blacklist_len(), 1);

        let result = engine.check(&req, None, None, Utc::now()).await;
        assert!(result.blocked);
        assert_eq!(result.action, RecommendedAction::Block);
        assert!(result.has_severity(Severity::Critical));
        assert_eq!(result.score, 1.0);
        // Evidence carries the digest prefix, never the raw number.
        assert!(!result.signals[0].evidence.contains("D1234567"));
    }

    #[tokio::test]
    async fn blacklist_critical_without_block_on_critical_falls_to_thresholds() {
        let config = FraudConfig::default().with_severity_blocks(false, false);
        let engine = FraudEngine::new(config);
        let req = request();
        engine.blacklist_document(&req.document_number);

        let result = engine.check(&req, None, None, Utc::now()).await;
        // Score 1.0 still crosses the block threshold.
        assert!(result.blocked);
    }

    // -- result analysis ----------------------------------------------------

    #[tokio::test]
    async fn expired_document_signal() {
        let engine = FraudEngine::new(FraudConfig::default());
        let req = request();
        let resp = response(VerificationStatus::DocumentExpired, 0.9);
        let result = engine.check(&req, Some(&resp), None, Utc::now()).await;
        assert!(result
            .signals
            .iter()
            .any(|s| s.kind == SignalKind::DocumentExpired && s.severity == Severity::High));
    }

    #[tokio::test]
    async fn low_confidence_success_signal() {
        let engine = FraudEngine::new(FraudConfig::default());
        let req = request();
        let resp = response(VerificationStatus::Verified, 0.5);
        let result = engine.check(&req, Some(&resp), None, Utc::now()).await;
        assert!(result
            .signals
            .iter()
            .any(|s| s.kind == SignalKind::LowConfidence));
    }

    #[tokio::test]
    async fn confident_success_emits_nothing() {
        let engine = FraudEngine::new(FraudConfig::default());
        let req = request();
        let resp = response(VerificationStatus::Verified, 0.95);
        let result = engine.check(&req, Some(&resp), None, Utc::now()).await;
        assert!(result.signals.is_empty());
        assert_eq!(result.action, RecommendedAction::Allow);
        assert!(!result.blocked);
    }

    #[tokio::test]
    async fn field_mismatch_signal_needs_more_than_tolerance() {
        let engine = FraudEngine::new(FraudConfig::default());
        let req = request();

        let mut resp = response(VerificationStatus::Failed, 0.9);
        for name in ["a", "b"] {
            resp = resp.with_field(FieldVerificationResult::new(name, FieldMatch::NoMatch, 0.9));
        }
        let result = engine.check(&req, Some(&resp), None, Utc::now()).await;
        assert!(!result
            .signals
            .iter()
            .any(|s| s.kind == SignalKind::FieldMismatches));

        let resp = resp.with_field(FieldVerificationResult::new("c", FieldMatch::NoMatch, 0.9));
        let result = engine.check(&req, Some(&resp), None, Utc::now()).await;
        assert!(result
            .signals
            .iter()
            .any(|s| s.kind == SignalKind::FieldMismatches && s.severity == Severity::High));
    }

    // -- liveness -----------------------------------------------------------

    #[tokio::test]
    async fn spoof_severity_by_category() {
        let engine = FraudEngine::new(FraudConfig::default());
        let req = request();
        let now = Utc::now();

        let deepfake = LivenessResult::failed(0.9, Some(SpoofCategory::Deepfake));
        let result = engine.check(&req, None, Some(&deepfake), now).await;
        assert!(result.has_severity(Severity::Critical));
        assert!(result.blocked);

        let mask = LivenessResult::failed(0.9, Some(SpoofCategory::Mask));
        let result = engine.check(&req, None, Some(&mask), now).await;
        assert_eq!(result.signals[0].severity, Severity::High);

        let photo = LivenessResult::failed(0.9, Some(SpoofCategory::Photo));
        let result = engine.check(&req, None, Some(&photo), now).await;
        assert_eq!(result.signals[0].severity, Severity::Medium);

        let screen = LivenessResult::failed(0.9, Some(SpoofCategory::Screen));
        let result = engine.check(&req, None, Some(&screen), now).await;
        assert_eq!(result.signals[0].severity, Severity::Medium);
    }

    #[tokio::test]
    async fn low_confidence_liveness_failure_without_spoof() {
        let engine = FraudEngine::new(FraudConfig::default());
        let req = request();
        let now = Utc::now();

        let failed = LivenessResult::failed(0.3, None);
        let result = engine.check(&req, None, Some(&failed), now).await;
        assert!(result
            .signals
            .iter()
            .any(|s| s.kind == SignalKind::LivenessFailed));

        // Confident failure without spoof classification: no signal.
        let confident = LivenessResult::failed(0.9, None);
        let result = engine.check(&req, None, Some(&confident), now).await;
        assert!(result.signals.is_empty());

        // A pass never signals.
        let passed = LivenessResult::passed(0.9);
        let result = engine.check(&req, None, Some(&passed), now).await;
        assert!(result.signals.is_empty());
    }

    // -- action resolution --------------------------------------------------

    #[tokio::test]
    async fn block_on_high_forces_block() {
        let config = FraudConfig::default().with_severity_blocks(true, true);
        let engine = FraudEngine::new(config);
        let req = request();
        let mask = LivenessResult::failed(0.9, Some(SpoofCategory::Mask));
        let result = engine.check(&req, None, Some(&mask), Utc::now()).await;
        assert!(result.blocked);
    }

    #[tokio::test]
    async fn score_thresholds_resolve_flag() {
        let engine = FraudEngine::new(FraudConfig::default());
        let req = request();
        // Mask spoof: high severity, score 0.75, block_on_high disabled.
        let mask = LivenessResult::failed(0.9, Some(SpoofCategory::Mask));
        let result = engine.check(&req, None, Some(&mask), Utc::now()).await;
        assert_eq!(result.action, RecommendedAction::Flag);
        assert!(!result.blocked);
    }

    // -- external plug-ins --------------------------------------------------

    struct StubDetector {
        available: bool,
        score: f64,
    }

    #[async_trait]
    impl FraudDetector for StubDetector {
        async fn is_available(&self) -> bool {
            self.available
        }

        async fn check(
            &self,
            _request: &VerificationRequest,
        ) -> Result<ExternalAssessment, PluginError> {
            Ok(ExternalAssessment {
                score: self.score,
                signals: vec![FraudSignal::new(
                    SignalKind::External,
                    Severity::Medium,
                    self.score,
                    RecommendedAction::Flag,
                    "external finding",
                )],
            })
        }
    }

    struct StubReporter {
        submitted: Mutex<Vec<FraudReport>>,
    }

    #[async_trait]
    impl FraudReporter for StubReporter {
        async fn submit(&self, report: &FraudReport) -> Result<String, PluginError> {
            self.submitted.lock().push(report.clone());
            Ok("report-001".to_string())
        }
    }

    #[tokio::test]
    async fn external_detector_signals_are_merged() {
        let engine = FraudEngine::new(FraudConfig::default()).with_detector(Arc::new(
            StubDetector {
                available: true,
                score: 0.3,
            },
        ));
        let req = request();
        let result = engine.check(&req, None, None, Utc::now()).await;
        assert!(result.signals.iter().any(|s| s.kind == SignalKind::External));
    }

    #[tokio::test]
    async fn external_score_taken_when_higher() {
        let engine = FraudEngine::new(FraudConfig::default()).with_detector(Arc::new(
            StubDetector {
                available: true,
                score: 0.9,
            },
        ));
        let req = request();
        let result = engine.check(&req, None, None, Utc::now()).await;
        // Built-in aggregation of the single 0.9 signal is 0.9; the
        // external score matches. Both paths keep the maximum.
        assert!(result.score >= 0.9);
        assert!(result.blocked);
    }

    #[tokio::test]
    async fn unavailable_detector_is_skipped() {
        let engine = FraudEngine::new(FraudConfig::default()).with_detector(Arc::new(
            StubDetector {
                available: false,
                score: 1.0,
            },
        ));
        let req = request();
        let result = engine.check(&req, None, None, Utc::now()).await;
        assert!(result.signals.is_empty());
        assert_eq!(result.score, 0.0);
    }

    #[tokio::test]
    async fn critical_signal_triggers_report() {
        let reporter = Arc::new(StubReporter {
            submitted: Mutex::new(Vec::new()),
        });
        let engine =
            FraudEngine::new(FraudConfig::default()).with_reporter(Arc::clone(&reporter) as _);
        let req = request();
        engine.blacklist_document(&req.document_number);

        let result = engine.check(&req, None, None, Utc::now()).await;
        assert_eq!(result.report_id.as_deref(), Some("report-001"));
        let submitted = reporter.submitted.lock();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].request_id, req.request_id);
        assert!(!submitted[0].evidence.is_empty());
    }

    #[tokio::test]
    async fn no_report_without_critical_signal() {
        let reporter = Arc::new(StubReporter {
            submitted: Mutex::new(Vec::new()),
        });
        let engine =
            FraudEngine::new(FraudConfig::default()).with_reporter(Arc::clone(&reporter) as _);
        let req = request();
        let resp = response(VerificationStatus::Verified, 0.5);

        let result = engine.check(&req, Some(&resp), None, Utc::now()).await;
        assert!(result.report_id.is_none());
        assert!(reporter.submitted.lock().is_empty());
    }
}
