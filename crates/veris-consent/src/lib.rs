//! # veris-consent: Consent Lifecycle and Validation
//!
//! Grants, revokes, and validates scoped user consent. Validation fails
//! closed: a missing consent reference, an unknown record, or any scope
//! mismatch is treated as consent-required, never as implicitly granted.
//!
//! Revoked and expired records are not deleted immediately. They survive
//! for the jurisdiction's consent-retention window so that later
//! compliance audits can still answer "was there consent at the time".

pub mod consent;
pub mod manager;

pub use consent::{Consent, ConsentError};
pub use manager::ConsentManager;
