//! # veris-source: Verification Model and Adapter Routing
//!
//! Defines the normalized verification request/response model, the
//! [`SourceAdapter`] contract implemented by provider-specific government
//! clients, and the [`SourceRegistry`] that routes a (jurisdiction,
//! document type) pairing to a registered adapter.
//!
//! ## Architecture
//!
//! The orchestrator never inspects provider-specific data. An adapter owns
//! its wire format, authentication, and retries; what crosses this
//! boundary is the normalized [`VerificationResponse`] and nothing else.
//! Each government source is one implementation behind the single
//! capability trait, so adding a provider touches no orchestration code.
//!
//! ## Jurisdiction Fallback
//!
//! Routing tries an exact jurisdiction match first. When the requested
//! code carries a subdivision suffix (`"US-CA"`) and no adapter matches
//! exactly, the lookup retries with the 2-letter country prefix (`"US"`).
//! No other matching is performed.

pub mod adapter;
pub mod mock;
pub mod registry;
pub mod request;
pub mod response;

pub use adapter::{AdapterStatus, SourceAdapter, SourceError};
pub use mock::{MockFailure, MockSourceAdapter};
pub use registry::{RouteError, SourceRegistry};
pub use request::{RequestError, VerificationRequest};
pub use response::{
    FieldMatch, FieldVerificationResult, VerificationResponse, VerificationStatus,
};
