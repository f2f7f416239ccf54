//! # Consent Records
//!
//! A consent is a time-bounded, scope-limited authorization from a
//! requester to use their data for verification. The record is created on
//! grant and mutated only to revoke.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use veris_core::{ConsentId, DocumentType, JurisdictionCode, RequesterId};
use veris_source::VerificationRequest;

/// Consent validation failures. Every variant means "do not proceed".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsentError {
    /// No usable consent reference: the request carried none, or the
    /// referenced record does not exist.
    #[error("consent required")]
    Required,

    /// The consent has expired.
    #[error("consent {consent_id} expired at {expired_at}")]
    Expired {
        /// The expired consent.
        consent_id: ConsentId,
        /// When it expired.
        expired_at: DateTime<Utc>,
    },

    /// The consent was revoked.
    #[error("consent {consent_id} was revoked at {revoked_at}")]
    Revoked {
        /// The revoked consent.
        consent_id: ConsentId,
        /// When it was revoked.
        revoked_at: DateTime<Utc>,
    },

    /// The consent is marked inactive.
    #[error("consent {consent_id} is inactive")]
    Inactive {
        /// The inactive consent.
        consent_id: ConsentId,
    },

    /// The consent belongs to a different requester.
    #[error("consent {consent_id} was granted to a different requester")]
    RequesterMismatch {
        /// The consent that failed the check.
        consent_id: ConsentId,
    },

    /// The request's document type is outside the consented set.
    #[error("document type {document_type} is not covered by consent {consent_id}")]
    DocumentTypeNotConsented {
        /// The consent that failed the check.
        consent_id: ConsentId,
        /// The unconsented document type.
        document_type: DocumentType,
    },

    /// The request's jurisdiction is outside the consented set.
    #[error("jurisdiction {jurisdiction} is not covered by consent {consent_id}")]
    JurisdictionNotConsented {
        /// The consent that failed the check.
        consent_id: ConsentId,
        /// The unconsented jurisdiction.
        jurisdiction: JurisdictionCode,
    },

    /// A lifecycle operation referenced a consent that does not exist.
    #[error("consent {consent_id} not found")]
    NotFound {
        /// The missing consent.
        consent_id: ConsentId,
    },
}

/// A scoped, time-bounded consent record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consent {
    /// Unique consent identifier.
    pub id: ConsentId,
    /// The requester this consent was granted to.
    pub requester: RequesterId,
    /// Document classes the consent covers. Empty means unrestricted.
    #[serde(default)]
    pub document_types: BTreeSet<DocumentType>,
    /// Jurisdictions the consent covers, matched by exact code or
    /// 2-letter country prefix. Empty means unrestricted.
    #[serde(default)]
    pub jurisdictions: BTreeSet<JurisdictionCode>,
    /// Declared purpose of processing.
    pub purpose: String,
    /// When the consent was granted.
    pub granted_at: DateTime<Utc>,
    /// When the consent expires.
    pub expires_at: DateTime<Utc>,
    /// When the consent was revoked, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
    /// Whether the consent is active. Cleared on revocation.
    pub active: bool,
}

impl Consent {
    /// Whether the consent had ended (expired or revoked) as of `now`.
    pub fn ended(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_some() || now >= self.expires_at
    }

    /// The moment the consent ended, if it has: revocation time, or the
    /// expiry when `now` has passed it.
    pub fn ended_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if let Some(revoked_at) = self.revoked_at {
            return Some(revoked_at);
        }
        (now >= self.expires_at).then_some(self.expires_at)
    }

    /// Validate this consent against a request. Fails closed: the first
    /// unmet condition is returned.
    pub fn validate(
        &self,
        request: &VerificationRequest,
        now: DateTime<Utc>,
    ) -> Result<(), ConsentError> {
        if let Some(revoked_at) = self.revoked_at {
            return Err(ConsentError::Revoked {
                consent_id: self.id.clone(),
                revoked_at,
            });
        }
        if !self.active {
            return Err(ConsentError::Inactive {
                consent_id: self.id.clone(),
            });
        }
        if now >= self.expires_at {
            return Err(ConsentError::Expired {
                consent_id: self.id.clone(),
                expired_at: self.expires_at,
            });
        }
        if self.requester != request.requester {
            return Err(ConsentError::RequesterMismatch {
                consent_id: self.id.clone(),
            });
        }
        if !self.document_types.is_empty() && !self.document_types.contains(&request.document_type)
        {
            return Err(ConsentError::DocumentTypeNotConsented {
                consent_id: self.id.clone(),
                document_type: request.document_type,
            });
        }
        if !self.jurisdictions.is_empty()
            && !self
                .jurisdictions
                .iter()
                .any(|consented| request.jurisdiction.is_covered_by(consented))
        {
            return Err(ConsentError::JurisdictionNotConsented {
                consent_id: self.id.clone(),
                jurisdiction: request.jurisdiction.clone(),
            });
        }
        Ok(())
    }
}
