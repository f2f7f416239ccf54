//! # Verification Response
//!
//! The normalized outcome of one verification attempt. A response is
//! created once per completed request and is immutable afterwards, with
//! one exception: fraud analysis may append warning annotations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use veris_core::{AuditEntryId, JurisdictionCode, RequestId, SourceKind};

// ---------------------------------------------------------------------------
// VerificationStatus
// ---------------------------------------------------------------------------

/// The closed set of verification outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// All checked fields matched and the document is valid.
    Verified,
    /// Some fields matched; the source could not confirm everything.
    Partial,
    /// The source answered and the claims did not hold.
    Failed,
    /// The document number is unknown to the source.
    NotFound,
    /// The document exists but is expired or revoked.
    DocumentExpired,
    /// Admission rejected the request at the rate-limit gate.
    RateLimited,
    /// Admission rejected the request at the consent gate.
    ConsentRequired,
    /// The routed adapter was unreachable or reported itself down.
    SourceUnavailable,
    /// The attempt failed for a reason outside the above.
    Error,
}

impl VerificationStatus {
    /// Return the string value used in serialized form and audit entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Partial => "partial",
            Self::Failed => "failed",
            Self::NotFound => "not_found",
            Self::DocumentExpired => "document_expired",
            Self::RateLimited => "rate_limited",
            Self::ConsentRequired => "consent_required",
            Self::SourceUnavailable => "source_unavailable",
            Self::Error => "error",
        }
    }

    /// Whether this status counts as a successful verification for trust
    /// scoring.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Verified | Self::Partial)
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Field results
// ---------------------------------------------------------------------------

/// Outcome of checking one claimed field against source records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldMatch {
    /// The claimed value matched source records exactly.
    Exact,
    /// The claimed value matched after normalization (case, diacritics,
    /// formatting).
    Fuzzy,
    /// The claimed value contradicts source records.
    NoMatch,
    /// The source does not hold this field.
    Unavailable,
    /// The field was outside the requested scope.
    NotChecked,
}

impl FieldMatch {
    /// Return the string value used in serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::NoMatch => "no_match",
            Self::Unavailable => "unavailable",
            Self::NotChecked => "not_checked",
        }
    }

    /// Whether this outcome confirms the claimed value.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Exact | Self::Fuzzy)
    }
}

impl std::fmt::Display for FieldMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field verification outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldVerificationResult {
    /// The claimed field name.
    pub field: String,
    /// How the claimed value compared against source records.
    pub outcome: FieldMatch,
    /// Source confidence in the outcome, within [0, 1].
    pub confidence: f64,
}

impl FieldVerificationResult {
    /// Create a field result, clamping confidence into [0, 1].
    pub fn new(field: impl Into<String>, outcome: FieldMatch, confidence: f64) -> Self {
        Self {
            field: field.into(),
            outcome,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// VerificationResponse
// ---------------------------------------------------------------------------

/// The normalized outcome of one verification attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResponse {
    /// The request this response answers.
    pub request_id: RequestId,
    /// Overall outcome.
    pub status: VerificationStatus,
    /// Overall confidence, within [0, 1].
    pub confidence: f64,
    /// Per-field outcomes, in the order the source reported them.
    pub fields: Vec<FieldVerificationResult>,
    /// The class of source that produced this response.
    pub source: SourceKind,
    /// The jurisdiction of the responding source.
    pub source_jurisdiction: JurisdictionCode,
    /// Whether the source confirmed the document itself as valid
    /// (unexpired, unrevoked).
    pub document_valid: bool,
    /// Document expiry as reported by the source, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_expires_at: Option<DateTime<Utc>>,
    /// When this cached result expires, stamped from the jurisdiction's
    /// retention policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_expires_at: Option<DateTime<Utc>>,
    /// The audit entry recorded for this attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_entry_id: Option<AuditEntryId>,
    /// Warning annotations appended during fraud analysis. The only part
    /// of a response that changes after creation.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// When the attempt completed.
    pub completed_at: DateTime<Utc>,
}

impl VerificationResponse {
    /// Create a response, clamping confidence into [0, 1].
    pub fn new(
        request_id: RequestId,
        status: VerificationStatus,
        confidence: f64,
        source: SourceKind,
        source_jurisdiction: JurisdictionCode,
    ) -> Self {
        Self {
            request_id,
            status,
            confidence: confidence.clamp(0.0, 1.0),
            fields: Vec::new(),
            source,
            source_jurisdiction,
            document_valid: false,
            document_expires_at: None,
            result_expires_at: None,
            audit_entry_id: None,
            warnings: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    /// Builder: append a field result.
    pub fn with_field(mut self, field: FieldVerificationResult) -> Self {
        self.fields.push(field);
        self
    }

    /// Builder: mark the document itself as confirmed valid.
    pub fn with_document_valid(mut self, valid: bool) -> Self {
        self.document_valid = valid;
        self
    }

    /// Builder: set the document expiry reported by the source.
    pub fn with_document_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.document_expires_at = Some(expires_at);
        self
    }

    /// Number of checked fields whose claimed value was confirmed.
    pub fn matched_field_count(&self) -> usize {
        self.fields.iter().filter(|f| f.outcome.is_match()).count()
    }

    /// Number of checked fields whose claimed value was contradicted.
    pub fn mismatched_field_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| f.outcome == FieldMatch::NoMatch)
            .count()
    }

    /// Append a fraud-analysis warning annotation.
    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}
