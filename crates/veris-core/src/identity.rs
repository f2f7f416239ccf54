//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the verification
//! core. Each identifier is a distinct type; you cannot pass a
//! [`RequesterId`] where a [`ConsentId`] is expected.
//!
//! ## Validation
//!
//! UUID-based identifiers ([`RequesterId`], [`RequestId`], [`ConsentId`],
//! [`AuditEntryId`], [`ScopeId`]) are always valid by construction and are
//! generated as random v4 UUIDs. [`DocumentNumber`] validates format at
//! construction time and stores a canonical form suitable for hashing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::digest::sha256_hex;
use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// UUID-based identifiers (always valid by construction)
// ---------------------------------------------------------------------------

/// A unique identifier for the party requesting verification. This is the
/// key for rate limiting, consent ownership, fraud velocity, and trust
/// aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequesterId(Uuid);

impl RequesterId {
    /// Create a new random requester identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a requester identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequesterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequesterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for one verification request. Doubles as the key
/// under which the completed outcome is cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Create a new random request identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a request identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a consent record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConsentId(Uuid);

impl ConsentId {
    /// Create a new random consent identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a consent identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ConsentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConsentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for an audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditEntryId(Uuid);

impl AuditEntryId {
    /// Create a new random audit entry identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an audit entry identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AuditEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AuditEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a trust scope created from one successful
/// verification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(Uuid);

impl ScopeId {
    /// Create a new random scope identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a scope identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// DocumentNumber (validated at construction)
// ---------------------------------------------------------------------------

/// A government document number (passport number, license number, national
/// id number, and so on).
///
/// Issuing formats vary by country and document class, so validation is
/// intentionally lenient: after stripping dashes and spaces the value must
/// be 4 to 32 ASCII alphanumeric characters. The canonical stored form is
/// uppercase with separators removed, which keeps digests stable across
/// the formatting variants a requester might submit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentNumber(String);

impl DocumentNumber {
    /// Create a document number, validating format.
    ///
    /// Accepts separators (`"D-1234567"`, `"D 1234567"`) and lowercase
    /// input; the stored form is `"D1234567"`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDocumentNumber`] if fewer than 4
    /// or more than 32 alphanumeric characters remain after stripping
    /// separators, or if any other character is present.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let canonical: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != ' ')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if canonical.len() < 4 || canonical.len() > 32 {
            return Err(ValidationError::InvalidDocumentNumber(raw));
        }
        if !canonical.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::InvalidDocumentNumber(raw));
        }

        Ok(Self(canonical))
    }

    /// Access the canonical document number (uppercase, no separators).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// SHA-256 digest of the canonical form, hex-encoded.
    ///
    /// Components that must remember a document number without retaining
    /// it (the fraud blacklist) key on this digest instead of the raw
    /// value.
    pub fn digest(&self) -> String {
        sha256_hex(self.0.as_bytes())
    }
}

impl std::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
