//! # veris-audit: Append-Only Audit Trail
//!
//! Records every orchestrator-visible action (verification attempt,
//! consent grant, consent revocation) as one immutable entry, written
//! synchronously before the originating call returns. Entries carry their
//! retention-expiry stamp at write time so the purge pass only compares
//! timestamps.
//!
//! The log is append-only. When a capacity bound is configured and
//! reached, new writes are rejected rather than old entries trimmed:
//! silently dropping the oldest entries would breach their retention
//! windows. Callers treat a rejected write as a service-level warning,
//! never as a failure of the originating call.

pub mod entry;
pub mod log;

pub use entry::{AuditAction, AuditEntry, AuditFilter, ExportFormat};
pub use log::{AuditError, AuditLog};
