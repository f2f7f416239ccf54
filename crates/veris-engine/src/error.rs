//! # Request-Level Error Taxonomy
//!
//! Admission, routing, adapter, budget, and integration failures, each
//! wrapping its component's error type. Every variant maps to the
//! verification status a caller-facing layer would report for it.

use thiserror::Error;

use veris_consent::ConsentError;
use veris_cost::CostError;
use veris_source::{RequestError, RouteError, SourceError, VerificationStatus};
use veris_trust::TrustError;

/// Failures of one verification call.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The service is disabled by configuration.
    #[error("verification service is disabled")]
    Disabled,

    /// The request failed shape validation.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// The requester exceeded an admission ceiling.
    #[error("rate limit exceeded")]
    RateLimited,

    /// The consent gate rejected the request.
    #[error(transparent)]
    Consent(#[from] ConsentError),

    /// No adapter serves the requested pairing.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// The routed adapter failed. Opaque beyond the variant.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Spend for the routed adapter is over budget.
    #[error(transparent)]
    Budget(#[from] CostError),

    /// Trust integration failed.
    #[error(transparent)]
    Trust(#[from] TrustError),
}

impl VerifyError {
    /// The verification status a caller-facing layer reports for this
    /// failure.
    pub fn status(&self) -> VerificationStatus {
        match self {
            Self::RateLimited => VerificationStatus::RateLimited,
            Self::Consent(_) => VerificationStatus::ConsentRequired,
            Self::Source(SourceError::Unavailable { .. })
            | Self::Source(SourceError::Timeout { .. }) => VerificationStatus::SourceUnavailable,
            Self::Source(SourceError::RequestFailed { .. }) => VerificationStatus::Failed,
            Self::Disabled
            | Self::InvalidRequest(_)
            | Self::Route(_)
            | Self::Budget(_)
            | Self::Trust(_) => VerificationStatus::Error,
        }
    }

    /// Whether this failure was rejected at admission or routing, before
    /// any adapter call.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Disabled
                | Self::InvalidRequest(_)
                | Self::RateLimited
                | Self::Consent(_)
                | Self::Route(_)
                | Self::Budget(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            VerifyError::RateLimited.status(),
            VerificationStatus::RateLimited
        );
        assert_eq!(
            VerifyError::Consent(ConsentError::Required).status(),
            VerificationStatus::ConsentRequired
        );
        assert_eq!(
            VerifyError::Source(SourceError::Timeout { elapsed_ms: 10 }).status(),
            VerificationStatus::SourceUnavailable
        );
        assert_eq!(
            VerifyError::Source(SourceError::RequestFailed {
                reason: "x".to_string()
            })
            .status(),
            VerificationStatus::Failed
        );
        assert_eq!(VerifyError::Disabled.status(), VerificationStatus::Error);
    }

    #[test]
    fn rejections_precede_the_adapter_call() {
        assert!(VerifyError::RateLimited.is_rejection());
        assert!(VerifyError::Consent(ConsentError::Required).is_rejection());
        assert!(VerifyError::Disabled.is_rejection());
        assert!(!VerifyError::Source(SourceError::Timeout { elapsed_ms: 1 }).is_rejection());
    }

    #[test]
    fn display_passes_through_component_errors() {
        let err = VerifyError::Consent(ConsentError::Required);
        assert_eq!(format!("{err}"), "consent required");
    }
}
