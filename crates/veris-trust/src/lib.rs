//! # veris-trust: Trust-Score Integration
//!
//! Converts verification outcomes into decaying, multi-source trust
//! contributions. One successful, sufficiently confident verification
//! creates one scope; a requester's aggregate score sums their active
//! scopes after freshness decay, with bonuses for source and
//! jurisdiction diversity.
//!
//! ## Caps
//!
//! A single verification contributes at most 0.5, so no single source
//! can dominate a multi-source score. The aggregate is capped at 1.0.
//! Freshness decay never discounts a scope below half its original
//! contribution: an old verification keeps saying something, just less.

pub mod config;
pub mod integrator;
pub mod scope;

pub use config::TrustConfig;
pub use integrator::{TrustError, TrustIntegrator};
pub use scope::{source_multiplier, ScopeStatus, TrustScope};
