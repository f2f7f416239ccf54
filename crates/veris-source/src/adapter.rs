//! # Source Adapter Contract
//!
//! The capability trait implemented by provider-specific government
//! clients. Production deployments implement it against live APIs; tests
//! use [`crate::MockSourceAdapter`]. The trait is object-safe so adapters
//! are selected at runtime and shared across tasks behind an `Arc`.
//!
//! Cancellation is the caller's: dropping the future returned by
//! [`SourceAdapter::verify`] abandons the attempt. Retries against the
//! remote service are the adapter's concern; the orchestrator treats any
//! returned error as final for that attempt.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use veris_core::{DocumentType, JurisdictionCode, SourceKind};

use crate::request::VerificationRequest;
use crate::response::VerificationResponse;

/// Errors surfaced by an adapter. Opaque to the orchestrator beyond the
/// variant: provider detail stays inside `reason`.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source is unreachable or reported itself down.
    #[error("source unavailable: {reason}")]
    Unavailable {
        /// Human-readable description of the outage.
        reason: String,
    },

    /// The source accepted the request but the attempt failed.
    #[error("verification request failed: {reason}")]
    RequestFailed {
        /// Description of the failure.
        reason: String,
    },

    /// The request to the source timed out.
    #[error("source request timed out after {elapsed_ms}ms")]
    Timeout {
        /// Elapsed time in milliseconds before the timeout triggered.
        elapsed_ms: u64,
    },
}

/// Point-in-time operational statistics for one adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterStatus {
    /// Adapter name (unique within a registry).
    pub name: String,
    /// The class of source behind the adapter.
    pub kind: SourceKind,
    /// The jurisdiction the adapter serves.
    pub jurisdiction: JurisdictionCode,
    /// Total verification calls attempted.
    pub total_calls: u64,
    /// Calls that returned a normalized response.
    pub successful_calls: u64,
    /// Calls that returned a [`SourceError`].
    pub failed_calls: u64,
    /// Most recent successful call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_success: Option<DateTime<Utc>>,
    /// Most recent failed call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<DateTime<Utc>>,
    /// Whether the adapter currently reports itself available.
    pub available: bool,
}

/// Capability contract for a provider-specific government-source client.
///
/// Implementations must be `Send + Sync`; the registry hands out
/// `Arc<dyn SourceAdapter>` across concurrent requests.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Adapter name, unique within a registry (used for cost models and
    /// the health snapshot).
    fn name(&self) -> &str;

    /// The class of government source this adapter fronts.
    fn kind(&self) -> SourceKind;

    /// The jurisdiction this adapter serves.
    fn jurisdiction(&self) -> &JurisdictionCode;

    /// Whether this adapter can verify the given document class.
    fn supports_document(&self, document_type: DocumentType) -> bool;

    /// Whether the adapter currently considers itself able to serve
    /// traffic. A cheap, possibly cached check.
    async fn is_available(&self) -> bool;

    /// Active probe against the source.
    async fn health_check(&self) -> Result<(), SourceError>;

    /// Verify the request against source records. The only operation on
    /// this trait expected to block for a non-trivial duration.
    async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResponse, SourceError>;

    /// Current operational statistics.
    fn status(&self) -> AdapterStatus;
}

impl std::fmt::Debug for dyn SourceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceAdapter")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("jurisdiction", &self.jurisdiction())
            .finish()
    }
}

impl PartialEq for dyn SourceAdapter {
    /// Adapters are identified by their name, which is unique within a
    /// registry.
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}
