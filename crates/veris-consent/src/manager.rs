//! # Consent Manager
//!
//! Owns the consent store. All access goes through this interface; no
//! other component reaches into the underlying maps. Reads take a shared
//! lock, writes an exclusive one, and no lock is held while calling into
//! any other component.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use veris_core::{ConsentId, DocumentType, JurisdictionCode, RequesterId, RetentionSchedule};
use veris_source::VerificationRequest;

use crate::consent::{Consent, ConsentError};

#[derive(Debug, Default)]
struct ConsentStore {
    records: HashMap<ConsentId, Consent>,
    by_requester: HashMap<RequesterId, Vec<ConsentId>>,
}

/// Owner of all consent records, keyed by id with a secondary index by
/// requester.
#[derive(Debug, Default)]
pub struct ConsentManager {
    store: RwLock<ConsentStore>,
}

impl ConsentManager {
    /// Create an empty consent manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a consent to `requester` for the given scopes and duration.
    /// Empty scope sets mean unrestricted.
    pub fn grant(
        &self,
        requester: RequesterId,
        document_types: BTreeSet<DocumentType>,
        jurisdictions: BTreeSet<JurisdictionCode>,
        purpose: impl Into<String>,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Consent {
        let consent = Consent {
            id: ConsentId::new(),
            requester: requester.clone(),
            document_types,
            jurisdictions,
            purpose: purpose.into(),
            granted_at: now,
            expires_at: now + duration,
            revoked_at: None,
            active: true,
        };

        let mut store = self.store.write();
        store
            .by_requester
            .entry(requester)
            .or_default()
            .push(consent.id.clone());
        store.records.insert(consent.id.clone(), consent.clone());
        drop(store);

        tracing::info!(consent_id = %consent.id, requester = %consent.requester, "consent granted");
        consent
    }

    /// Revoke a consent. Idempotent for already-revoked records.
    ///
    /// # Errors
    ///
    /// Returns [`ConsentError::NotFound`] when the id is unknown.
    pub fn revoke(&self, consent_id: &ConsentId, now: DateTime<Utc>) -> Result<Consent, ConsentError> {
        let mut store = self.store.write();
        let consent = store
            .records
            .get_mut(consent_id)
            .ok_or_else(|| ConsentError::NotFound {
                consent_id: consent_id.clone(),
            })?;
        if consent.revoked_at.is_none() {
            consent.revoked_at = Some(now);
        }
        consent.active = false;
        let snapshot = consent.clone();
        drop(store);

        tracing::info!(consent_id = %consent_id, "consent revoked");
        Ok(snapshot)
    }

    /// Fetch a consent by id.
    pub fn get(&self, consent_id: &ConsentId) -> Option<Consent> {
        self.store.read().records.get(consent_id).cloned()
    }

    /// All consents ever granted to a requester, including ended ones
    /// still inside their retention window.
    pub fn list_for_requester(&self, requester: &RequesterId) -> Vec<Consent> {
        let store = self.store.read();
        store
            .by_requester
            .get(requester)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| store.records.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Validate the referenced consent against a request.
    ///
    /// Fails closed: `None` and unknown ids are both
    /// [`ConsentError::Required`].
    pub fn validate(
        &self,
        consent_id: Option<&ConsentId>,
        request: &VerificationRequest,
        now: DateTime<Utc>,
    ) -> Result<(), ConsentError> {
        let consent_id = consent_id.ok_or(ConsentError::Required)?;
        let consent = self.get(consent_id).ok_or(ConsentError::Required)?;
        consent.validate(request, now)
    }

    /// Number of stored consent records.
    pub fn len(&self) -> usize {
        self.store.read().records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.store.read().records.is_empty()
    }

    /// Purge ended consents whose retention window has elapsed.
    ///
    /// A record is removed only when every consented jurisdiction allows
    /// auto-purge and the longest applicable consent-retention window has
    /// passed since the consent ended. Unrestricted consents use the
    /// schedule's default policy. Returns the number purged.
    pub fn purge_expired(&self, schedule: &RetentionSchedule, now: DateTime<Utc>) -> usize {
        let mut store = self.store.write();
        let mut purged: Vec<ConsentId> = Vec::new();

        store.records.retain(|id, consent| {
            let Some(ended_at) = consent.ended_at(now) else {
                return true;
            };
            let policies: Vec<_> = if consent.jurisdictions.is_empty() {
                vec![schedule.default_policy()]
            } else {
                consent
                    .jurisdictions
                    .iter()
                    .map(|j| schedule.policy_for(j))
                    .collect()
            };
            if policies.iter().any(|p| !p.auto_purge) {
                return true;
            }
            let keep_until = policies
                .iter()
                .map(|p| p.consent_purge_after(ended_at))
                .max()
                .unwrap_or(ended_at);
            if now >= keep_until {
                purged.push(id.clone());
                false
            } else {
                true
            }
        });

        for id in &purged {
            for ids in store.by_requester.values_mut() {
                ids.retain(|candidate| candidate != id);
            }
        }
        store.by_requester.retain(|_, ids| !ids.is_empty());
        let count = purged.len();
        drop(store);

        if count > 0 {
            tracing::info!(purged = count, "consent retention purge completed");
        }
        count
    }
}
