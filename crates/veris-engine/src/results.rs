//! # Verification Result Store
//!
//! Keyed cache of completed verification outcomes, with a secondary
//! index by requester and expiry-based purge. The only post-insert
//! mutation is appending fraud-analysis warnings.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use veris_core::{RequestId, RequesterId};
use veris_source::VerificationResponse;

#[derive(Debug, Default)]
struct ResultState {
    by_request: HashMap<RequestId, VerificationResponse>,
    by_requester: HashMap<RequesterId, Vec<RequestId>>,
}

/// Owner of completed verification outcomes.
#[derive(Debug, Default)]
pub struct ResultStore {
    state: RwLock<ResultState>,
}

impl ResultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a completed outcome for a requester.
    pub fn insert(&self, requester: RequesterId, response: VerificationResponse) {
        let mut state = self.state.write();
        state
            .by_requester
            .entry(requester)
            .or_default()
            .push(response.request_id.clone());
        state
            .by_request
            .insert(response.request_id.clone(), response);
    }

    /// Fetch an outcome by request id.
    pub fn get(&self, request_id: &RequestId) -> Option<VerificationResponse> {
        self.state.read().by_request.get(request_id).cloned()
    }

    /// All cached outcomes for a requester, oldest first.
    pub fn list_for_requester(&self, requester: &RequesterId) -> Vec<VerificationResponse> {
        let state = self.state.read();
        state
            .by_requester
            .get(requester)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.by_request.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Append fraud-analysis warnings to a stored outcome. Returns
    /// `false` when the request id is unknown.
    pub fn annotate(&self, request_id: &RequestId, warnings: &[String]) -> bool {
        let mut state = self.state.write();
        match state.by_request.get_mut(request_id) {
            Some(response) => {
                response.warnings.extend(warnings.iter().cloned());
                true
            }
            None => false,
        }
    }

    /// Remove outcomes whose result expiry has passed. Returns the
    /// number removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut state = self.state.write();
        let initial = state.by_request.len();
        state
            .by_request
            .retain(|_, r| r.result_expires_at.map_or(true, |expiry| expiry > now));
        let removed = initial - state.by_request.len();

        if removed > 0 {
            let live: Vec<RequestId> = state.by_request.keys().cloned().collect();
            for ids in state.by_requester.values_mut() {
                ids.retain(|id| live.contains(id));
            }
            state.by_requester.retain(|_, ids| !ids.is_empty());
            tracing::info!(removed, "verification result purge completed");
        }
        removed
    }

    /// Number of cached outcomes.
    pub fn len(&self) -> usize {
        self.state.read().by_request.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.state.read().by_request.is_empty()
    }
}
