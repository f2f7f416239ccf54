#![deny(missing_docs)]

//! # veris-core: Foundational Types for the Veris Verification Core
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies, only `serde`, `serde_json`,
//! `thiserror`, `chrono`, `uuid`, and `sha2` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** Every identifier is a
//!    distinct type. You cannot pass a [`ConsentId`] where a [`RequesterId`]
//!    is expected.
//!
//! 2. **Validation at construction.** String-based primitives
//!    ([`DocumentNumber`], [`JurisdictionCode`]) reject malformed input in
//!    their constructors and are valid for their entire lifetime.
//!
//! 3. **Closed taxonomies.** [`DocumentType`] and [`SourceKind`] are single
//!    enum definitions with exhaustive `match` everywhere. No stringly-typed
//!    document or source lists that can drift.
//!
//! 4. **[`ValidationError`] hierarchy.** Structured errors with `thiserror`.
//!    No `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod digest;
pub mod document;
pub mod error;
pub mod identity;
pub mod jurisdiction;
pub mod retention;
pub mod source;

// Re-export primary types at crate root for ergonomic imports.
pub use digest::sha256_hex;
pub use document::DocumentType;
pub use error::ValidationError;
pub use identity::{AuditEntryId, ConsentId, DocumentNumber, RequestId, RequesterId, ScopeId};
pub use jurisdiction::JurisdictionCode;
pub use retention::{RetentionPolicy, RetentionSchedule};
pub use source::SourceKind;
