//! # Mock Source Adapter
//!
//! A configurable in-memory adapter for tests and development. Returns a
//! successful verification for any request by default; tests reconfigure
//! the canned outcome, toggle availability, or inject failures through
//! `&self` setters so a shared `Arc` stays reconfigurable.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use veris_core::{DocumentType, JurisdictionCode, SourceKind};

use crate::adapter::{AdapterStatus, SourceAdapter, SourceError};
use crate::request::VerificationRequest;
use crate::response::{
    FieldMatch, FieldVerificationResult, VerificationResponse, VerificationStatus,
};

/// The failure a mock adapter injects on the next `verify` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Report the source as unreachable.
    Unavailable,
    /// Report the attempt as failed.
    RequestFailed,
    /// Report a timeout.
    Timeout,
}

impl MockFailure {
    fn to_error(self) -> SourceError {
        match self {
            Self::Unavailable => SourceError::Unavailable {
                reason: "mock outage".to_string(),
            },
            Self::RequestFailed => SourceError::RequestFailed {
                reason: "mock failure".to_string(),
            },
            Self::Timeout => SourceError::Timeout { elapsed_ms: 1 },
        }
    }
}

#[derive(Debug, Clone)]
struct MockBehavior {
    status: VerificationStatus,
    confidence: f64,
    document_valid: bool,
    document_expires_at: Option<DateTime<Utc>>,
    failure: Option<MockFailure>,
}

#[derive(Debug, Default, Clone)]
struct CallStats {
    total: u64,
    succeeded: u64,
    failed: u64,
    last_success: Option<DateTime<Utc>>,
    last_failure: Option<DateTime<Utc>>,
}

/// Configurable mock adapter.
#[derive(Debug)]
pub struct MockSourceAdapter {
    name: String,
    kind: SourceKind,
    jurisdiction: JurisdictionCode,
    supported: BTreeSet<DocumentType>,
    available: AtomicBool,
    behavior: Mutex<MockBehavior>,
    stats: Mutex<CallStats>,
}

impl MockSourceAdapter {
    /// Create a mock adapter that verifies every request with confidence
    /// 0.95 and a valid document.
    pub fn new(
        name: impl Into<String>,
        kind: SourceKind,
        jurisdiction: JurisdictionCode,
        supported: impl IntoIterator<Item = DocumentType>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            jurisdiction,
            supported: supported.into_iter().collect(),
            available: AtomicBool::new(true),
            behavior: Mutex::new(MockBehavior {
                status: VerificationStatus::Verified,
                confidence: 0.95,
                document_valid: true,
                document_expires_at: None,
                failure: None,
            }),
            stats: Mutex::new(CallStats::default()),
        }
    }

    /// Builder: set the canned outcome.
    pub fn with_response(self, status: VerificationStatus, confidence: f64) -> Self {
        {
            let mut behavior = self.behavior.lock();
            behavior.status = status;
            behavior.confidence = confidence;
        }
        self
    }

    /// Builder: set whether the canned response confirms document
    /// validity.
    pub fn with_document_validity(self, valid: bool) -> Self {
        self.behavior.lock().document_valid = valid;
        self
    }

    /// Builder: set the document expiry reported by the canned response.
    pub fn with_document_expiry(self, expires_at: DateTime<Utc>) -> Self {
        self.behavior.lock().document_expires_at = Some(expires_at);
        self
    }

    /// Reconfigure the canned outcome on a shared adapter.
    pub fn set_response(&self, status: VerificationStatus, confidence: f64) {
        let mut behavior = self.behavior.lock();
        behavior.status = status;
        behavior.confidence = confidence;
    }

    /// Toggle availability.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Inject (or with `None`, clear) a failure for subsequent calls.
    pub fn set_failure(&self, failure: Option<MockFailure>) {
        self.behavior.lock().failure = failure;
    }
}

#[async_trait]
impl SourceAdapter for MockSourceAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn jurisdiction(&self) -> &JurisdictionCode {
        &self.jurisdiction
    }

    fn supports_document(&self, document_type: DocumentType) -> bool {
        self.supported.contains(&document_type)
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SourceError::Unavailable {
                reason: "mock marked unavailable".to_string(),
            })
        }
    }

    async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResponse, SourceError> {
        let behavior = self.behavior.lock().clone();
        let now = Utc::now();

        if let Some(failure) = behavior.failure {
            let mut stats = self.stats.lock();
            stats.total += 1;
            stats.failed += 1;
            stats.last_failure = Some(now);
            return Err(failure.to_error());
        }

        let mut response = VerificationResponse::new(
            request.request_id.clone(),
            behavior.status,
            behavior.confidence,
            self.kind,
            self.jurisdiction.clone(),
        )
        .with_document_valid(behavior.document_valid);
        if let Some(expiry) = behavior.document_expires_at {
            response = response.with_document_expiry(expiry);
        }

        for (field, _) in request.fields_to_check() {
            response = response.with_field(FieldVerificationResult::new(
                field,
                FieldMatch::Exact,
                behavior.confidence,
            ));
        }

        let mut stats = self.stats.lock();
        stats.total += 1;
        stats.succeeded += 1;
        stats.last_success = Some(now);

        Ok(response)
    }

    fn status(&self) -> AdapterStatus {
        let stats = self.stats.lock().clone();
        AdapterStatus {
            name: self.name.clone(),
            kind: self.kind,
            jurisdiction: self.jurisdiction.clone(),
            total_calls: stats.total,
            successful_calls: stats.succeeded,
            failed_calls: stats.failed,
            last_success: stats.last_success,
            last_failure: stats.last_failure,
            available: self.available.load(Ordering::SeqCst),
        }
    }
}
