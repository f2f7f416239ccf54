//! # Trust Scopes
//!
//! A scope is the durable trace one successful verification leaves in
//! the trust graph: who was verified, against what source, with what
//! confidence, and the contribution it earned. Scopes expire on their
//! own or are revoked explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use veris_core::{DocumentType, JurisdictionCode, RequesterId, ScopeId, SourceKind};
use veris_source::VerificationStatus;

/// Lifecycle status of a trust scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeStatus {
    /// The scope counts toward multi-source scores until it expires.
    Active,
    /// The scope was revoked and no longer counts.
    Revoked,
}

impl ScopeStatus {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }
}

impl std::fmt::Display for ScopeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-source trust multiplier. Descending trust: passport authority,
/// national registry, licensing and tax authorities, vital records,
/// immigration.
pub fn source_multiplier(kind: SourceKind) -> f64 {
    match kind {
        SourceKind::PassportAuthority => 1.0,
        SourceKind::NationalRegistry => 0.95,
        SourceKind::Dmv => 0.85,
        SourceKind::TaxAuthority => 0.85,
        SourceKind::VitalRecords => 0.8,
        SourceKind::Immigration => 0.75,
    }
}

/// One verification's contribution to a requester's trust score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustScope {
    /// Unique scope identifier.
    pub id: ScopeId,
    /// The requester the scope belongs to.
    pub requester: RequesterId,
    /// The verified document class.
    pub document_type: DocumentType,
    /// The jurisdiction of the verification.
    pub jurisdiction: JurisdictionCode,
    /// The source class that verified.
    pub source: SourceKind,
    /// The verification outcome that created the scope.
    pub verification_status: VerificationStatus,
    /// Confidence of the underlying verification.
    pub confidence: f64,
    /// The contribution earned, already capped.
    pub contribution: f64,
    /// When the verification completed.
    pub verified_at: DateTime<Utc>,
    /// When the scope stops counting.
    pub expires_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: ScopeStatus,
}

impl TrustScope {
    /// Whether the scope counts toward scores at `now`: active and not
    /// yet expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == ScopeStatus::Active && now < self.expires_at
    }

    /// Age of the scope at `now`, in whole days (0 for future
    /// `verified_at`).
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.verified_at).num_days().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn scope(now: DateTime<Utc>) -> TrustScope {
        TrustScope {
            id: ScopeId::new(),
            requester: RequesterId::new(),
            document_type: DocumentType::Passport,
            jurisdiction: JurisdictionCode::new("US").unwrap(),
            source: SourceKind::PassportAuthority,
            verification_status: VerificationStatus::Verified,
            confidence: 0.95,
            contribution: 0.3,
            verified_at: now,
            expires_at: now + Duration::days(365),
            status: ScopeStatus::Active,
        }
    }

    #[test]
    fn multipliers_are_descending() {
        let order = [
            SourceKind::PassportAuthority,
            SourceKind::NationalRegistry,
            SourceKind::Dmv,
            SourceKind::TaxAuthority,
            SourceKind::VitalRecords,
            SourceKind::Immigration,
        ];
        for pair in order.windows(2) {
            assert!(source_multiplier(pair[0]) >= source_multiplier(pair[1]));
        }
        assert_eq!(source_multiplier(SourceKind::PassportAuthority), 1.0);
    }

    #[test]
    fn active_until_expiry() {
        let now = Utc::now();
        let s = scope(now);
        assert!(s.is_active(now));
        assert!(!s.is_active(now + Duration::days(366)));
    }

    #[test]
    fn revoked_scope_is_inactive() {
        let now = Utc::now();
        let mut s = scope(now);
        s.status = ScopeStatus::Revoked;
        assert!(!s.is_active(now));
    }

    #[test]
    fn age_is_clamped_at_zero() {
        let now = Utc::now();
        let s = scope(now + Duration::days(2));
        assert_eq!(s.age_days(now), 0);

        let s = scope(now - Duration::days(10));
        assert_eq!(s.age_days(now), 10);
    }

    #[test]
    fn serde_roundtrip() {
        let s = scope(Utc::now());
        let json = serde_json::to_string(&s).unwrap();
        let back: TrustScope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, s.id);
        assert_eq!(back.status, ScopeStatus::Active);
    }
}
