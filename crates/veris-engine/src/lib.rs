//! # veris-engine: Verification Orchestrator
//!
//! Composes admission (rate limiting + consent), routing, the adapter
//! call, normalization, audit, result caching, fraud analysis, trust
//! integration, and cost governance into one request lifecycle.
//!
//! ## Concurrency Model
//!
//! The orchestrator is invoked concurrently by many independent callers.
//! Component stores are guarded by reader/writer locks scoped to the
//! owning component; no lock is held across the adapter `.await` or any
//! cross-component call. Cancellation belongs to the caller: dropping
//! the `verify` future abandons the in-flight adapter call, and the
//! orchestrator imposes no default timeout of its own.
//!
//! ## Failure Posture
//!
//! Admission and routing rejections return before any adapter call, with
//! no cost recorded and no verification audit entry beyond a rejection
//! log event. Adapter errors are recorded as a failed verification and
//! still produce an audit entry. An audit write failure is a
//! service-level warning surfaced on the health snapshot; it never fails
//! the originating call.

pub mod config;
pub mod error;
pub mod health;
pub mod orchestrator;
pub mod ratelimit;
pub mod results;

pub use config::{ConfigError, RateLimitConfig, ServiceConfig};
pub use error::VerifyError;
pub use health::{HousekeepingReport, ServiceHealth};
pub use orchestrator::Verifier;
pub use ratelimit::RateLimiter;
pub use results::ResultStore;
