//! # Audit Log Store
//!
//! Owner of the append-only entry store. Reads (get/list/export) take a
//! shared lock; append and purge take an exclusive one. Entries are
//! immutable once appended.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use thiserror::Error;

use veris_core::AuditEntryId;

use crate::entry::{AuditEntry, AuditFilter, ExportFormat};

/// Audit storage failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// The configured capacity bound is reached. The write is rejected
    /// rather than an old entry trimmed, because trimming would breach
    /// the trimmed entry's retention window.
    #[error("audit log capacity of {capacity} entries exhausted")]
    CapacityExhausted {
        /// The configured capacity.
        capacity: usize,
    },

    /// Export serialization failed.
    #[error("audit export failed: {reason}")]
    ExportFailed {
        /// Description of the failure.
        reason: String,
    },
}

/// The append-only audit log.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: RwLock<Vec<AuditEntry>>,
    capacity: Option<usize>,
}

impl AuditLog {
    /// Create an unbounded audit log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an audit log that rejects writes beyond `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            capacity: Some(capacity),
        }
    }

    /// Append an entry, returning its id.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::CapacityExhausted`] when a capacity bound is
    /// configured and reached.
    pub fn log(&self, entry: AuditEntry) -> Result<AuditEntryId, AuditError> {
        let mut entries = self.entries.write();
        if let Some(capacity) = self.capacity {
            if entries.len() >= capacity {
                return Err(AuditError::CapacityExhausted { capacity });
            }
        }
        let id = entry.id.clone();
        entries.push(entry);
        Ok(id)
    }

    /// Fetch an entry by id.
    pub fn get(&self, id: &AuditEntryId) -> Option<AuditEntry> {
        self.entries.read().iter().find(|e| e.id == *id).cloned()
    }

    /// List entries matching the filter, oldest first, honoring the
    /// filter's offset and limit.
    pub fn list(&self, filter: &AuditFilter) -> Vec<AuditEntry> {
        let entries = self.entries.read();
        let matched = entries.iter().filter(|e| filter.matches(e));
        match filter.limit {
            Some(limit) => matched.skip(filter.offset).take(limit).cloned().collect(),
            None => matched.skip(filter.offset).cloned().collect(),
        }
    }

    /// Export entries matching the filter in the requested format.
    pub fn export(&self, filter: &AuditFilter, format: ExportFormat) -> Result<String, AuditError> {
        let entries = self.list(filter);
        match format {
            ExportFormat::Json => {
                serde_json::to_string_pretty(&entries).map_err(|e| AuditError::ExportFailed {
                    reason: e.to_string(),
                })
            }
            ExportFormat::Csv => Ok(to_csv(&entries)),
        }
    }

    /// Remove entries whose retention expiry or own timestamp precedes
    /// `before`, whichever fires first. Returns the number removed.
    pub fn purge(&self, before: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write();
        let initial = entries.len();
        entries.retain(|e| e.retention_expires_at >= before && e.timestamp >= before);
        let removed = initial - entries.len();
        drop(entries);

        if removed > 0 {
            tracing::info!(removed, cutoff = %before, "audit retention purge completed");
        }
        removed
    }

    /// Remove entries whose retention window has ended as of `now`. The
    /// housekeeping variant of [`AuditLog::purge`]: entry timestamps are
    /// not compared, only retention stamps. Returns the number removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write();
        let initial = entries.len();
        entries.retain(|e| e.retention_expires_at > now);
        let removed = initial - entries.len();
        drop(entries);

        if removed > 0 {
            tracing::info!(removed, "audit housekeeping purge completed");
        }
        removed
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

const CSV_HEADER: &str = "id,request_id,action,requester,jurisdiction,document_type,source,consent_id,status,timestamp,duration_ms,retention_expires_at";

fn to_csv(entries: &[AuditEntry]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for e in entries {
        let row = [
            e.id.to_string(),
            e.request_id.as_ref().map(ToString::to_string).unwrap_or_default(),
            e.action.to_string(),
            e.requester.to_string(),
            e.jurisdiction.as_ref().map(ToString::to_string).unwrap_or_default(),
            e.document_type.map(|d| d.to_string()).unwrap_or_default(),
            e.source.map(|s| s.to_string()).unwrap_or_default(),
            e.consent_id.as_ref().map(ToString::to_string).unwrap_or_default(),
            csv_escape(&e.status),
            e.timestamp.to_rfc3339(),
            e.duration_ms.to_string(),
            e.retention_expires_at.to_rfc3339(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Quote a field containing a comma, quote, or newline.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AuditAction;
    use chrono::Duration;
    use veris_core::RequesterId;

    fn entry_at(timestamp: DateTime<Utc>, retention_days: i64) -> AuditEntry {
        AuditEntry::new(
            AuditAction::VerificationAttempted,
            RequesterId::new(),
            "verified",
            timestamp,
            timestamp + Duration::days(retention_days),
        )
    }

    #[test]
    fn log_and_get() {
        let log = AuditLog::new();
        let entry = entry_at(Utc::now(), 30);
        let id = log.log(entry).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(&id).unwrap().id, id);
        assert!(log.get(&AuditEntryId::new()).is_none());
    }

    #[test]
    fn capacity_bound_rejects_instead_of_trimming() {
        let log = AuditLog::with_capacity(2);
        let now = Utc::now();
        let first = log.log(entry_at(now, 30)).unwrap();
        log.log(entry_at(now, 30)).unwrap();

        let err = log.log(entry_at(now, 30)).unwrap_err();
        assert_eq!(err, AuditError::CapacityExhausted { capacity: 2 });
        // The earliest entry is untouched.
        assert_eq!(log.len(), 2);
        assert!(log.get(&first).is_some());
    }

    #[test]
    fn list_with_pagination() {
        let log = AuditLog::new();
        let now = Utc::now();
        for _ in 0..5 {
            log.log(entry_at(now, 30)).unwrap();
        }

        let page = log.list(&AuditFilter::any().paginate(1, 2));
        assert_eq!(page.len(), 2);

        let tail = log.list(&AuditFilter::any().paginate(4, 10));
        assert_eq!(tail.len(), 1);

        let all = log.list(&AuditFilter::any());
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn list_applies_filter_before_pagination() {
        let log = AuditLog::new();
        let now = Utc::now();
        let requester = RequesterId::new();
        for i in 0..4 {
            let mut e = entry_at(now + Duration::seconds(i), 30);
            if i % 2 == 0 {
                e.requester = requester.clone();
            }
            log.log(e).unwrap();
        }

        let mine = log.list(&AuditFilter::any().for_requester(requester).paginate(0, 10));
        assert_eq!(mine.len(), 2);
    }

    #[test]
    fn purge_by_retention_expiry() {
        let log = AuditLog::new();
        let now = Utc::now();
        // Retention stamp already behind the cutoff (a policy tightened
        // after the entry was written), entry itself newer than the
        // cutoff: the retention signal fires first.
        let mut short_lived = entry_at(now, 30);
        short_lived.retention_expires_at = now - Duration::days(1);
        log.log(short_lived).unwrap();
        // Retention still running.
        log.log(entry_at(now, 50)).unwrap();

        let removed = log.purge(now - Duration::hours(1));
        assert_eq!(removed, 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn purge_by_timestamp_cutoff() {
        let log = AuditLog::new();
        let now = Utc::now();
        // Long retention but the entry itself predates the cutoff.
        log.log(entry_at(now - Duration::days(10), 3650)).unwrap();
        log.log(entry_at(now, 3650)).unwrap();

        let removed = log.purge(now - Duration::days(1));
        assert_eq!(removed, 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn purge_keeps_entries_newer_than_cutoff() {
        let log = AuditLog::new();
        let now = Utc::now();
        log.log(entry_at(now, 30)).unwrap();
        assert_eq!(log.purge(now - Duration::days(1)), 0);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn purge_expired_ignores_entry_timestamps() {
        let log = AuditLog::new();
        let now = Utc::now();
        // Old entry, retention still running: survives housekeeping.
        log.log(entry_at(now - Duration::days(100), 3650)).unwrap();
        // Retention over: removed.
        log.log(entry_at(now - Duration::days(100), 10)).unwrap();

        assert_eq!(log.purge_expired(now), 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn export_json() {
        let log = AuditLog::new();
        log.log(entry_at(Utc::now(), 30)).unwrap();
        let json = log.export(&AuditFilter::any(), ExportFormat::Json).unwrap();
        let parsed: Vec<AuditEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn export_csv_has_header_and_rows() {
        let log = AuditLog::new();
        log.log(entry_at(Utc::now(), 30)).unwrap();
        let csv = log.export(&AuditFilter::any(), ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,request_id,action"));
        assert!(lines[1].contains("verification_attempted"));
        assert!(lines[1].contains("verified"));
    }

    #[test]
    fn csv_escaping() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
