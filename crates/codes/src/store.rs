//! Single source of truth for live access codes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

use relaykey_audit::{AuditAction, AuditEntry, AuditLog};
use relaykey_core::{AccessCode, DomainError, ValidityWindow};

/// Default bound on collision retries during issuance.
///
/// The code space holds 90,000 values, so hitting this bound means the store
/// is nearly full and the deployment is misconfigured for its load.
const DEFAULT_MAX_ISSUE_ATTEMPTS: u32 = 32;

/// A live code's stored attributes. The code itself is the map key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub owner: String,
    pub window: ValidityWindow,
}

/// Result of a successful issuance: the generated code plus its resolved window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCode {
    pub code: AccessCode,
    pub owner: String,
    pub window: ValidityWindow,
}

/// One row of the administrative listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCode {
    pub code: AccessCode,
    pub owner: String,
    pub window: ValidityWindow,
    pub remaining_seconds: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IssueError {
    #[error(transparent)]
    InvalidWindow(DomainError),

    /// Every generated candidate collided with a live code.
    #[error("access code pool exhausted after {0} attempts")]
    PoolExhausted(u32),
}

/// Owns the set of live access codes.
///
/// All mutations are serialized through one mutex over the code-keyed map,
/// held only for the check-and-mutate step. Nothing here performs I/O; in
/// particular the transport publish never runs under this lock.
pub struct CodeStore {
    codes: Mutex<HashMap<AccessCode, CodeEntry>>,
    audit: Arc<dyn AuditLog>,
    max_issue_attempts: u32,
}

impl CodeStore {
    pub fn new(audit: Arc<dyn AuditLog>) -> Self {
        Self {
            codes: Mutex::new(HashMap::new()),
            audit,
            max_issue_attempts: DEFAULT_MAX_ISSUE_ATTEMPTS,
        }
    }

    pub fn with_max_issue_attempts(mut self, max: u32) -> Self {
        self.max_issue_attempts = max;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<AccessCode, CodeEntry>> {
        // A panic while holding the lock leaves the map structurally intact,
        // so a poisoned lock is recovered rather than propagated.
        self.codes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a new code for `owner`, valid over `[valid_from, valid_until)`.
    ///
    /// `valid_from` defaults to `now` when unspecified. The generated code is
    /// guaranteed unique among live codes; generation retries on collision up
    /// to a bounded attempt count. Emits `CREATED` on success; an invalid
    /// window produces no store mutation and no audit entry.
    pub fn issue(
        &self,
        owner: impl Into<String>,
        valid_from: Option<DateTime<Utc>>,
        valid_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<IssuedCode, IssueError> {
        self.issue_with_rng(&mut rand::thread_rng(), owner, valid_from, valid_until, now)
    }

    /// As [`issue`](Self::issue), with an explicit RNG for deterministic tests.
    pub fn issue_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        owner: impl Into<String>,
        valid_from: Option<DateTime<Utc>>,
        valid_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<IssuedCode, IssueError> {
        let owner = owner.into();
        let window = ValidityWindow::new(valid_from.unwrap_or(now), valid_until)
            .map_err(IssueError::InvalidWindow)?;

        let code = {
            let mut codes = self.lock();

            let mut attempts = 0;
            let code = loop {
                if attempts == self.max_issue_attempts {
                    return Err(IssueError::PoolExhausted(attempts));
                }
                attempts += 1;

                let candidate = AccessCode::random(rng);
                if !codes.contains_key(&candidate) {
                    break candidate;
                }
            };

            codes.insert(
                code.clone(),
                CodeEntry {
                    owner: owner.clone(),
                    window,
                },
            );
            code
        };

        self.audit
            .record(AuditEntry::new(&owner, &code, AuditAction::Created, now));

        Ok(IssuedCode { code, owner, window })
    }

    /// Pure read: no mutation, no audit emission. Outcome logging is the
    /// caller's responsibility (the same lookup result maps to different
    /// audit actions depending on context).
    pub fn lookup(&self, code: &AccessCode) -> Option<CodeEntry> {
        self.lock().get(code).cloned()
    }

    /// Explicit administrative removal. Emits `DELETED` with the prior owner;
    /// revoking an absent code returns `None` and emits nothing.
    pub fn revoke(&self, code: &AccessCode, now: DateTime<Utc>) -> Option<CodeEntry> {
        let removed = self.lock().remove(code);

        if let Some(entry) = &removed {
            self.audit.record(AuditEntry::new(
                &entry.owner,
                code,
                AuditAction::Deleted,
                now,
            ));
        }
        removed
    }

    /// Atomically remove `code` if it exists and is expired at `now`.
    ///
    /// This is the serialization point between lazy expiry (request-triggered)
    /// and the reaper: whichever caller wins the removal gets the entry back
    /// and owns the single `EXPIRED` audit emission.
    pub fn remove_expired(&self, code: &AccessCode, now: DateTime<Utc>) -> Option<CodeEntry> {
        let mut codes = self.lock();
        if codes.get(code).is_some_and(|e| e.window.is_expired(now)) {
            codes.remove(code)
        } else {
            None
        }
    }

    /// Remove every entry whose window has closed at `now`, in one locked
    /// pass. Returns the removals for the caller to audit.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<(AccessCode, CodeEntry)> {
        let mut codes = self.lock();
        let expired: Vec<AccessCode> = codes
            .iter()
            .filter(|(_, e)| e.window.is_expired(now))
            .map(|(c, _)| c.clone())
            .collect();

        expired
            .into_iter()
            .filter_map(|c| codes.remove(&c).map(|e| (c, e)))
            .collect()
    }

    /// Read-only listing for administrative inspection, ordered by code.
    ///
    /// Every stored entry is live by construction, so nothing is filtered
    /// out; `remaining_seconds` is derived against the supplied `now`.
    pub fn snapshot_active(&self, now: DateTime<Utc>) -> Vec<ActiveCode> {
        let mut active: Vec<ActiveCode> = self
            .lock()
            .iter()
            .map(|(code, entry)| ActiveCode {
                code: code.clone(),
                owner: entry.owner.clone(),
                window: entry.window,
                remaining_seconds: entry.window.remaining_seconds(now),
            })
            .collect();

        active.sort_by(|a, b| a.code.as_str().cmp(b.code.as_str()));
        active
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
