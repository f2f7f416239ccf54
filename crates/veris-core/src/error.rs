//! # Error Hierarchy
//!
//! Validation errors for the foundational domain primitives, built with
//! `thiserror`. Component-level errors (consent, routing, budget, fraud)
//! live in their owning crates; this module only covers construction-time
//! validation of the primitives themselves.
//!
//! Each variant carries the offending input so operators can diagnose
//! misconfiguration without guesswork.

use thiserror::Error;

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Document number fails basic format validation.
    #[error("invalid document number: \"{0}\" (expected 4-32 alphanumeric characters, dashes and spaces allowed)")]
    InvalidDocumentNumber(String),

    /// Jurisdiction code is not an ISO-style country code with an optional
    /// subdivision suffix.
    #[error("invalid jurisdiction code: \"{0}\" (expected e.g. \"US\" or \"US-CA\")")]
    InvalidJurisdictionCode(String),

    /// A confidence value fell outside the [0, 1] interval.
    #[error("invalid confidence {0}: must be within [0.0, 1.0]")]
    InvalidConfidence(f64),

    /// A retention window of zero days was configured for a record class
    /// that must be retained.
    #[error("invalid retention window for {record_class}: must be at least 1 day")]
    InvalidRetentionWindow {
        /// The record class the window applies to (result, audit, consent).
        record_class: String,
    },
}
