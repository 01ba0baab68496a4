//! Audit entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use relaykey_core::AccessCode;

/// Placeholder recorded when no owner or code applies to an event
/// (e.g. a verification attempt with an unknown code).
pub const PLACEHOLDER: &str = "-";

/// Lifecycle event kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// A code was issued.
    Created,
    /// A presented code was inside its window.
    Verified,
    /// A presented code was unknown to the store.
    Invalid,
    /// A presented code exists but its window has not opened yet.
    TooEarly,
    /// A code passed `valid_until` and was removed (lazily or by the sweep).
    Expired,
    /// A command was published to an actuation target.
    ActivatedRelay { target: String },
    /// A code was explicitly revoked by an administrator.
    Deleted,
}

/// Immutable record of one lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub owner: String,
    pub code: String,
    #[serde(flatten)]
    pub action: AuditAction,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        owner: &str,
        code: &AccessCode,
        action: AuditAction,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            owner: owner.to_string(),
            code: code.to_string(),
            action,
            timestamp,
        }
    }

    /// Entry for an event with no known owner and a code that may not parse
    /// (or no code at all, e.g. admin direct actuation).
    pub fn anonymous(code: impl Into<String>, action: AuditAction, timestamp: DateTime<Utc>) -> Self {
        Self {
            owner: PLACEHOLDER.to_string(),
            code: code.into(),
            action,
            timestamp,
        }
    }
}
