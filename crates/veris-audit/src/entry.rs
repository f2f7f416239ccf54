//! # Audit Entries and Filters
//!
//! The entry model, the filter used by list/export, and the export
//! format selector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use veris_core::{
    AuditEntryId, ConsentId, DocumentType, JurisdictionCode, RequestId, RequesterId, SourceKind,
};

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// The kind of action an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A verification attempt reached a source adapter (successfully or
    /// not).
    VerificationAttempted,
    /// A consent was granted.
    ConsentGranted,
    /// A consent was revoked.
    ConsentRevoked,
}

impl AuditAction {
    /// Return the string value for serialization and export.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerificationAttempted => "verification_attempted",
            Self::ConsentGranted => "consent_granted",
            Self::ConsentRevoked => "consent_revoked",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditEntry
// ---------------------------------------------------------------------------

/// One immutable audit entry. Never mutated after write; purged only once
/// its retention expiry has passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry identifier.
    pub id: AuditEntryId,
    /// The verification request this entry belongs to, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    /// The recorded action kind.
    pub action: AuditAction,
    /// The requester involved.
    pub requester: RequesterId,
    /// Jurisdiction of the action, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<JurisdictionCode>,
    /// Document class involved, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,
    /// The source class that served the request, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKind>,
    /// Consent reference attached to the action, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_id: Option<ConsentId>,
    /// Outcome status string (verification status, or "granted"/"revoked"
    /// for consent actions).
    pub status: String,
    /// When the action occurred.
    pub timestamp: DateTime<Utc>,
    /// Wall-clock duration of the action in milliseconds.
    pub duration_ms: u64,
    /// When this entry's retention window ends.
    pub retention_expires_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Create an entry with a fresh id.
    pub fn new(
        action: AuditAction,
        requester: RequesterId,
        status: impl Into<String>,
        timestamp: DateTime<Utc>,
        retention_expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AuditEntryId::new(),
            request_id: None,
            action,
            requester,
            jurisdiction: None,
            document_type: None,
            source: None,
            consent_id: None,
            status: status.into(),
            timestamp,
            duration_ms: 0,
            retention_expires_at,
        }
    }

    /// Builder: attach the verification request id.
    pub fn with_request(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Builder: attach the jurisdiction.
    pub fn with_jurisdiction(mut self, jurisdiction: JurisdictionCode) -> Self {
        self.jurisdiction = Some(jurisdiction);
        self
    }

    /// Builder: attach the document class.
    pub fn with_document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = Some(document_type);
        self
    }

    /// Builder: attach the source class.
    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.source = Some(source);
        self
    }

    /// Builder: attach the consent reference.
    pub fn with_consent(mut self, consent_id: ConsentId) -> Self {
        self.consent_id = Some(consent_id);
        self
    }

    /// Builder: record the action duration.
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

// ---------------------------------------------------------------------------
// AuditFilter
// ---------------------------------------------------------------------------

/// Filter for list and export. Unset fields match everything; set fields
/// are conjunctive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    /// Match entries for this requester.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<RequesterId>,
    /// Match entries for this jurisdiction (exact code).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<JurisdictionCode>,
    /// Match entries with this action kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<AuditAction>,
    /// Match entries with this status string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Match entries at or after this time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    /// Match entries strictly before this time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    /// Entries to skip after filtering.
    #[serde(default)]
    pub offset: usize,
    /// Maximum entries to return after the offset. `None` means all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl AuditFilter {
    /// A filter matching every entry.
    pub fn any() -> Self {
        Self::default()
    }

    /// Builder: restrict to one requester.
    pub fn for_requester(mut self, requester: RequesterId) -> Self {
        self.requester = Some(requester);
        self
    }

    /// Builder: restrict to one jurisdiction.
    pub fn in_jurisdiction(mut self, jurisdiction: JurisdictionCode) -> Self {
        self.jurisdiction = Some(jurisdiction);
        self
    }

    /// Builder: restrict to one action kind.
    pub fn with_action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Builder: restrict to one status string.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Builder: restrict to a time range (`from` inclusive, `to`
    /// exclusive).
    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Builder: pagination.
    pub fn paginate(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    /// Whether an entry satisfies every set condition.
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(requester) = &self.requester {
            if entry.requester != *requester {
                return false;
            }
        }
        if let Some(jurisdiction) = &self.jurisdiction {
            if entry.jurisdiction.as_ref() != Some(jurisdiction) {
                return false;
            }
        }
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if entry.status != *status {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if entry.timestamp >= to {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// ExportFormat
// ---------------------------------------------------------------------------

/// Supported audit export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// A JSON array of entries.
    Json,
    /// Comma-separated values with a header row.
    Csv,
}

impl ExportFormat {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
