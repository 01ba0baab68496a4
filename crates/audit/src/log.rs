//! Audit log contract and the in-memory implementation.

use std::sync::{Mutex, PoisonError};

use crate::entry::AuditEntry;

/// Append-only audit trail.
///
/// `record` must not fail under normal operation: an append that cannot be
/// stored is a process-level defect, not a domain error, so implementations
/// absorb it rather than surfacing a `Result` to every call site.
pub trait AuditLog: Send + Sync {
    fn record(&self, entry: AuditEntry);

    /// Stable, insertion-ordered copy of every entry recorded so far.
    fn read_all(&self) -> Vec<AuditEntry>;
}

/// In-memory audit log.
///
/// A single mutex over a `Vec` gives one global insertion order. A poisoned
/// lock is recovered rather than propagated: the entries already appended
/// stay intact and appends keep working.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for InMemoryAuditLog {
    fn record(&self, entry: AuditEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    fn read_all(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;

    use crate::entry::AuditAction;

    #[test]
    fn entries_come_back_in_insertion_order() {
        let log = InMemoryAuditLog::new();
        let now = Utc::now();

        for i in 0..10 {
            log.record(AuditEntry::anonymous(
                format!("{i:05}"),
                AuditAction::Invalid,
                now,
            ));
        }

        let all = log.read_all();
        assert_eq!(all.len(), 10);
        for (i, entry) in all.iter().enumerate() {
            assert_eq!(entry.code, format!("{i:05}"));
        }
    }

    #[test]
    fn read_all_returns_a_copy() {
        let log = InMemoryAuditLog::new();
        let now = Utc::now();

        log.record(AuditEntry::anonymous("12345", AuditAction::Invalid, now));
        let snapshot = log.read_all();

        log.record(AuditEntry::anonymous("54321", AuditAction::Invalid, now));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.read_all().len(), 2);
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        use std::sync::Arc;

        let log = Arc::new(InMemoryAuditLog::new());
        let now = Utc::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        log.record(AuditEntry::anonymous("00000", AuditAction::Invalid, now));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(log.len(), 800);
    }
}
