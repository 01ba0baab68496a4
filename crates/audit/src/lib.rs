//! `relaykey-audit` — append-only audit trail of code-lifecycle events.
//!
//! Every authorization decision made by the core ends up here. The log is
//! deliberately minimal: insertion order is the only ordering guarantee, and
//! there is no dedup, compaction, or pagination at this layer.

pub mod entry;
pub mod log;

pub use entry::{AuditAction, AuditEntry, PLACEHOLDER};
pub use log::{AuditLog, InMemoryAuditLog};
