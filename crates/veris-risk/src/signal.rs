//! # Fraud Signals
//!
//! Typed signals emitted by the detectors, and the per-check aggregate
//! result. A check result is request-scoped; it is not retained beyond
//! the check unless escalated to an external report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use veris_core::RequestId;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Signal severity ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Low,
    /// Worth flagging.
    Medium,
    /// Strong indicator.
    High,
    /// Decisive indicator.
    Critical,
}

impl Severity {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RecommendedAction
// ---------------------------------------------------------------------------

/// The action a signal or a whole check recommends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    /// Let the verification stand.
    Allow,
    /// Let it stand but flag for review.
    Flag,
    /// Reject the verification outcome.
    Block,
}

impl RecommendedAction {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Flag => "flag",
            Self::Block => "block",
        }
    }
}

impl std::fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SignalKind
// ---------------------------------------------------------------------------

/// The detector finding a signal encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Abnormally frequent checks from one requester.
    VelocityAnomaly,
    /// The document number is on the blacklist.
    BlacklistedDocument,
    /// The document is expired or revoked.
    DocumentExpired,
    /// A success result carried sub-threshold confidence.
    LowConfidence,
    /// More than the tolerated number of per-field mismatches.
    FieldMismatches,
    /// Liveness analysis detected a presentation attack.
    SpoofDetected,
    /// Liveness failed at low confidence without an explicit spoof class.
    LivenessFailed,
    /// Contributed by the external detector plug-in.
    External,
}

impl SignalKind {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VelocityAnomaly => "velocity_anomaly",
            Self::BlacklistedDocument => "blacklisted_document",
            Self::DocumentExpired => "document_expired",
            Self::LowConfidence => "low_confidence",
            Self::FieldMismatches => "field_mismatches",
            Self::SpoofDetected => "spoof_detected",
            Self::LivenessFailed => "liveness_failed",
            Self::External => "external",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FraudSignal
// ---------------------------------------------------------------------------

/// One typed finding from a detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudSignal {
    /// What was detected.
    pub kind: SignalKind,
    /// How severe the finding is.
    pub severity: Severity,
    /// Raw score contribution, within [0, 1].
    pub score: f64,
    /// The action this signal alone recommends.
    pub action: RecommendedAction,
    /// Human-readable evidence for review and reports.
    pub evidence: String,
}

impl FraudSignal {
    /// Create a signal, clamping the score into [0, 1].
    pub fn new(
        kind: SignalKind,
        severity: Severity,
        score: f64,
        action: RecommendedAction,
        evidence: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            score: score.clamp(0.0, 1.0),
            action,
            evidence: evidence.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// FraudCheckResult
// ---------------------------------------------------------------------------

/// The aggregate outcome of one fraud check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudCheckResult {
    /// The request that was checked.
    pub request_id: RequestId,
    /// Aggregate score, within [0, 1].
    pub score: f64,
    /// Every contributing signal, in detector order.
    pub signals: Vec<FraudSignal>,
    /// The resolved action.
    pub action: RecommendedAction,
    /// Whether the resolved action blocks the verification outcome.
    pub blocked: bool,
    /// Identifier returned by the external reporter, when a critical
    /// signal was escalated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    /// When the check ran.
    pub checked_at: DateTime<Utc>,
}

impl FraudCheckResult {
    /// Whether any signal reaches the given severity.
    pub fn has_severity(&self, severity: Severity) -> bool {
        self.signals.iter().any(|s| s.severity >= severity)
    }
}
