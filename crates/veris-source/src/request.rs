//! # Verification Request
//!
//! The normalized inbound request. The identifier, document type,
//! jurisdiction, and document number are enforced by the type system at
//! construction, so a well-typed request already satisfies the admission
//! invariant; [`VerificationRequest::validate`] covers the remaining
//! shape rules (non-empty claimed values, field scope referencing claimed
//! fields).

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use veris_core::{ConsentId, DocumentNumber, DocumentType, JurisdictionCode, RequestId, RequesterId};

/// Shape violations in an otherwise well-typed request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// A claimed field has an empty value.
    #[error("claimed field \"{field}\" has an empty value")]
    EmptyFieldValue {
        /// The offending field name.
        field: String,
    },

    /// The field scope names a field that was not claimed.
    #[error("field scope references unclaimed field \"{field}\"")]
    ScopeReferencesUnclaimedField {
        /// The offending field name.
        field: String,
    },
}

/// One verification request against a government source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Unique identifier for this request; also the result-store key.
    pub request_id: RequestId,
    /// The party requesting verification.
    pub requester: RequesterId,
    /// The document class to verify.
    pub document_type: DocumentType,
    /// The jurisdiction the document was issued in.
    pub jurisdiction: JurisdictionCode,
    /// The document number as claimed by the subject.
    pub document_number: DocumentNumber,
    /// Claimed field values (name, date of birth, address, ...), keyed by
    /// field name. BTreeMap keeps iteration deterministic.
    #[serde(default)]
    pub claimed_fields: BTreeMap<String, String>,
    /// Consent record authorizing this verification, when consent
    /// enforcement is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_id: Option<ConsentId>,
    /// Optional restriction of which claimed fields the source should
    /// check. `None` means all claimed fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_scope: Option<BTreeSet<String>>,
    /// When the request was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl VerificationRequest {
    /// Create a request with a fresh id, submitted now.
    pub fn new(
        requester: RequesterId,
        document_type: DocumentType,
        jurisdiction: JurisdictionCode,
        document_number: DocumentNumber,
    ) -> Self {
        Self {
            request_id: RequestId::new(),
            requester,
            document_type,
            jurisdiction,
            document_number,
            claimed_fields: BTreeMap::new(),
            consent_id: None,
            field_scope: None,
            submitted_at: Utc::now(),
        }
    }

    /// Builder: claim a field value.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.claimed_fields.insert(name.into(), value.into());
        self
    }

    /// Builder: attach a consent reference.
    pub fn with_consent(mut self, consent_id: ConsentId) -> Self {
        self.consent_id = Some(consent_id);
        self
    }

    /// Builder: restrict verification to the named claimed fields.
    pub fn with_field_scope<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_scope = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Validate request shape beyond what the types enforce.
    ///
    /// # Errors
    ///
    /// Returns the first [`RequestError`] encountered: an empty claimed
    /// value, or a field scope naming an unclaimed field.
    pub fn validate(&self) -> Result<(), RequestError> {
        for (field, value) in &self.claimed_fields {
            if value.trim().is_empty() {
                return Err(RequestError::EmptyFieldValue {
                    field: field.clone(),
                });
            }
        }
        if let Some(scope) = &self.field_scope {
            for field in scope {
                if !self.claimed_fields.contains_key(field) {
                    return Err(RequestError::ScopeReferencesUnclaimedField {
                        field: field.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The claimed fields the source should check: the scoped subset when
    /// a field scope is present, all claimed fields otherwise.
    pub fn fields_to_check(&self) -> Vec<(&str, &str)> {
        match &self.field_scope {
            Some(scope) => self
                .claimed_fields
                .iter()
                .filter(|(name, _)| scope.contains(*name))
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect(),
            None => self
                .claimed_fields
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect(),
        }
    }
}
