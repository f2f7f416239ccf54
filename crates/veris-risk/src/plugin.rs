//! # External Fraud Plug-ins
//!
//! Contracts for the optional external fraud detector and the external
//! fraud reporter. Both are object-safe async traits so deployments wire
//! concrete integrations at runtime; the engine works without either.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use veris_core::{RequestId, RequesterId};
use veris_source::VerificationRequest;

use crate::signal::FraudSignal;

/// Failures from an external fraud plug-in. Opaque beyond the variant.
#[derive(Error, Debug)]
pub enum PluginError {
    /// The plug-in is unreachable or reported itself down.
    #[error("fraud plug-in unavailable: {reason}")]
    Unavailable {
        /// Human-readable description of the outage.
        reason: String,
    },

    /// The plug-in accepted the call but the operation failed.
    #[error("fraud plug-in call failed: {reason}")]
    Failed {
        /// Description of the failure.
        reason: String,
    },
}

/// The external detector's view of one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalAssessment {
    /// The detector's own aggregate score, within [0, 1].
    pub score: f64,
    /// Signals to merge into the engine's result.
    pub signals: Vec<FraudSignal>,
}

/// An external fraud detection service.
#[async_trait]
pub trait FraudDetector: Send + Sync {
    /// Whether the detector can currently serve traffic.
    async fn is_available(&self) -> bool;

    /// Assess a request. Only called when [`Self::is_available`] reported
    /// `true` for this check.
    async fn check(&self, request: &VerificationRequest)
        -> Result<ExternalAssessment, PluginError>;
}

/// A report escalated to an external authority or case system after a
/// critical signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudReport {
    /// The request that triggered the report.
    pub request_id: RequestId,
    /// The requester involved.
    pub requester: RequesterId,
    /// The aggregate fraud score at escalation time.
    pub score: f64,
    /// The critical signals, as evidence strings.
    pub evidence: Vec<String>,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
}

/// An external fraud reporting sink.
#[async_trait]
pub trait FraudReporter: Send + Sync {
    /// Submit a report, returning the sink's report identifier.
    async fn submit(&self, report: &FraudReport) -> Result<String, PluginError>;
}

/// The external liveness-detection pipeline.
///
/// Consumed by the orchestrator to collect a [`crate::LivenessResult`]
/// for the fraud engine's liveness detector. A probe failure degrades
/// the check (no liveness signals), it never fails the verification.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Run a liveness check for the subject of the request.
    async fn check_liveness(
        &self,
        request: &VerificationRequest,
    ) -> Result<crate::liveness::LivenessResult, PluginError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_error_display() {
        let err = PluginError::Unavailable {
            reason: "dns failure".to_string(),
        };
        assert!(format!("{err}").contains("dns failure"));

        let err = PluginError::Failed {
            reason: "schema mismatch".to_string(),
        };
        assert!(format!("{err}").contains("schema mismatch"));
    }

    #[test]
    fn report_serde_roundtrip() {
        let report = FraudReport {
            request_id: RequestId::new(),
            requester: RequesterId::new(),
            score: 0.97,
            evidence: vec!["digest matched blacklist".to_string()],
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: FraudReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.request_id, report.request_id);
        assert_eq!(back.evidence, report.evidence);
    }
}
