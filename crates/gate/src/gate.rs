//! Verification and dispatch over the live-code store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use relaykey_audit::{AuditAction, AuditEntry, AuditLog, PLACEHOLDER};
use relaykey_codes::CodeStore;
use relaykey_core::{AccessCode, WindowStatus};
use relaykey_transport::{CommandTransport, TargetRegistry, TransportError};

/// Result of one verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The code is inside its window; it stays valid for repeated use until
    /// the window closes or an admin revokes it.
    Authorized { owner: String },
    /// The code is unknown to the store: never issued, revoked, or already
    /// reaped. Callers cannot tell these apart.
    Invalid,
    /// The code exists but its window has not opened yet. The entry is kept.
    TooEarly { owner: String },
    /// The code is past its window. The entry is removed (lazy expiry).
    Expired { owner: String },
}

/// Successful dispatch: the command was handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub owner: String,
    pub target: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The presented code failed verification; carries the verify outcome.
    #[error("access code rejected")]
    Rejected(VerifyOutcome),

    /// The requested target is not in the registry.
    #[error("unknown actuation target '{0}'")]
    UnknownTarget(String),

    /// Publish failed. The authorization already recorded stays intact and
    /// the code remains valid, so the caller may simply retry.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Gate between presented codes and physical actuation.
///
/// Holds no state of its own: code state lives in [`CodeStore`], decisions
/// land in the audit log, commands go out through the transport. The store
/// lock is never held across a publish.
pub struct CommandGate {
    store: Arc<CodeStore>,
    audit: Arc<dyn AuditLog>,
    transport: Arc<dyn CommandTransport>,
    targets: TargetRegistry,
}

impl CommandGate {
    pub fn new(
        store: Arc<CodeStore>,
        audit: Arc<dyn AuditLog>,
        transport: Arc<dyn CommandTransport>,
        targets: TargetRegistry,
    ) -> Self {
        Self {
            store,
            audit,
            transport,
            targets,
        }
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    /// Evaluate `code` at `now`.
    ///
    /// State transitions per call:
    /// - unknown code → [`VerifyOutcome::Invalid`], logged with a placeholder
    ///   owner;
    /// - `now < valid_from` → [`VerifyOutcome::TooEarly`], entry kept;
    /// - `now >= valid_until` → [`VerifyOutcome::Expired`], entry removed;
    /// - otherwise → [`VerifyOutcome::Authorized`], entry kept.
    pub fn verify(&self, code: &AccessCode, now: DateTime<Utc>) -> VerifyOutcome {
        let Some(entry) = self.store.lookup(code) else {
            self.audit.record(AuditEntry::anonymous(
                code.to_string(),
                AuditAction::Invalid,
                now,
            ));
            return VerifyOutcome::Invalid;
        };

        match entry.window.status(now) {
            WindowStatus::Pending => {
                self.audit.record(AuditEntry::new(
                    &entry.owner,
                    code,
                    AuditAction::TooEarly,
                    now,
                ));
                VerifyOutcome::TooEarly { owner: entry.owner }
            }
            WindowStatus::Expired => {
                // The atomic removal decides who logs: if the reaper (or a
                // concurrent request) got there first, the entry is gone and
                // the EXPIRED event has already been recorded once.
                if let Some(removed) = self.store.remove_expired(code, now) {
                    self.audit.record(AuditEntry::new(
                        &removed.owner,
                        code,
                        AuditAction::Expired,
                        now,
                    ));
                }
                VerifyOutcome::Expired { owner: entry.owner }
            }
            WindowStatus::Active => {
                self.audit.record(AuditEntry::new(
                    &entry.owner,
                    code,
                    AuditAction::Verified,
                    now,
                ));
                VerifyOutcome::Authorized { owner: entry.owner }
            }
        }
    }

    /// Verify `code` and, if authorized, publish `payload` to `target`.
    ///
    /// The verification step records its audit entries regardless of what
    /// happens afterwards. A publish failure returns
    /// [`DispatchError::Transport`] and mutates nothing further: the
    /// authorization is not consumed and retrying is safe.
    pub fn dispatch(
        &self,
        code: &AccessCode,
        target: &str,
        payload: &str,
        now: DateTime<Utc>,
    ) -> Result<Dispatched, DispatchError> {
        let outcome = self.verify(code, now);
        let VerifyOutcome::Authorized { owner } = outcome else {
            return Err(DispatchError::Rejected(outcome));
        };

        let command = self
            .targets
            .resolve(target, payload)
            .ok_or_else(|| DispatchError::UnknownTarget(target.to_string()))?;

        if let Err(e) = self.transport.publish(&command.topic, &command.payload) {
            warn!(target = %command.target, error = %e, "dispatch publish failed");
            return Err(e.into());
        }

        self.audit.record(AuditEntry::new(
            &owner,
            code,
            AuditAction::ActivatedRelay {
                target: command.target.clone(),
            },
            now,
        ));

        Ok(Dispatched {
            owner,
            target: command.target,
        })
    }

    /// Administrative direct actuation: publish without a code check.
    ///
    /// The HTTP layer has already authenticated the admin; `owner` is the
    /// authenticated subject, recorded against a placeholder code.
    pub fn actuate(
        &self,
        owner: &str,
        target: &str,
        payload: &str,
        now: DateTime<Utc>,
    ) -> Result<Dispatched, DispatchError> {
        let command = self
            .targets
            .resolve(target, payload)
            .ok_or_else(|| DispatchError::UnknownTarget(target.to_string()))?;

        if let Err(e) = self.transport.publish(&command.topic, &command.payload) {
            warn!(target = %command.target, error = %e, "admin actuation publish failed");
            return Err(e.into());
        }

        self.audit.record(AuditEntry {
            owner: owner.to_string(),
            code: PLACEHOLDER.to_string(),
            action: AuditAction::ActivatedRelay {
                target: command.target.clone(),
            },
            timestamp: now,
        });

        Ok(Dispatched {
            owner: owner.to_string(),
            target: command.target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use relaykey_audit::InMemoryAuditLog;
    use relaykey_codes::ExpiryReaper;
    use relaykey_transport::InMemoryTransport;

    struct Fixture {
        audit: Arc<InMemoryAuditLog>,
        store: Arc<CodeStore>,
        transport: Arc<InMemoryTransport>,
        gate: CommandGate,
    }

    fn fixture() -> Fixture {
        let audit = Arc::new(InMemoryAuditLog::new());
        let store = Arc::new(CodeStore::new(audit.clone()));
        let transport = Arc::new(InMemoryTransport::new());
        let gate = CommandGate::new(
            store.clone(),
            audit.clone(),
            transport.clone(),
            TargetRegistry::default(),
        );
        Fixture {
            audit,
            store,
            transport,
            gate,
        }
    }

    fn actions_for(audit: &InMemoryAuditLog, code: &str) -> Vec<AuditAction> {
        audit
            .read_all()
            .into_iter()
            .filter(|e| e.code == code)
            .map(|e| e.action)
            .collect()
    }

    #[test]
    fn unknown_code_is_invalid_and_logged_with_placeholder() {
        let f = fixture();
        let now = Utc::now();
        let code: AccessCode = "12345".parse().unwrap();

        assert_eq!(f.gate.verify(&code, now), VerifyOutcome::Invalid);

        let entries = f.audit.read_all();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Invalid);
        assert_eq!(entries[0].owner, PLACEHOLDER);
        assert_eq!(entries[0].code, "12345");
    }

    #[test]
    fn code_before_window_is_too_early_and_kept() {
        let f = fixture();
        let now = Utc::now();

        let issued = f
            .store
            .issue(
                "Marco",
                Some(now + Duration::seconds(30)),
                now + Duration::seconds(90),
                now,
            )
            .unwrap();

        assert_eq!(
            f.gate.verify(&issued.code, now),
            VerifyOutcome::TooEarly {
                owner: "Marco".to_string()
            }
        );
        assert!(f.store.lookup(&issued.code).is_some());
        assert_eq!(
            actions_for(&f.audit, issued.code.as_str()),
            vec![AuditAction::Created, AuditAction::TooEarly]
        );
    }

    #[test]
    fn code_in_window_is_authorized_and_reusable() {
        let f = fixture();
        let now = Utc::now();

        let issued = f
            .store
            .issue("Marco", None, now + Duration::seconds(60), now)
            .unwrap();

        for _ in 0..3 {
            assert_eq!(
                f.gate.verify(&issued.code, now),
                VerifyOutcome::Authorized {
                    owner: "Marco".to_string()
                }
            );
        }
        assert!(f.store.lookup(&issued.code).is_some());
        assert_eq!(
            actions_for(&f.audit, issued.code.as_str()),
            vec![
                AuditAction::Created,
                AuditAction::Verified,
                AuditAction::Verified,
                AuditAction::Verified,
            ]
        );
    }

    #[test]
    fn window_bounds_are_inclusive_exclusive() {
        let f = fixture();
        let now = Utc::now();

        let issued = f
            .store
            .issue("Marco", Some(now), now + Duration::seconds(60), now)
            .unwrap();

        // Exactly at valid_from: authorized.
        assert!(matches!(
            f.gate.verify(&issued.code, now),
            VerifyOutcome::Authorized { .. }
        ));

        // Exactly at valid_until: expired.
        assert!(matches!(
            f.gate.verify(&issued.code, now + Duration::seconds(60)),
            VerifyOutcome::Expired { .. }
        ));
    }

    #[test]
    fn expired_verify_removes_the_code_once() {
        let f = fixture();
        let now = Utc::now();

        let issued = f
            .store
            .issue("Marco", None, now + Duration::seconds(60), now)
            .unwrap();
        let later = now + Duration::seconds(61);

        assert_eq!(
            f.gate.verify(&issued.code, later),
            VerifyOutcome::Expired {
                owner: "Marco".to_string()
            }
        );
        assert!(f.store.lookup(&issued.code).is_none());

        // A second attempt sees an absent code: Invalid, not Expired again.
        assert_eq!(f.gate.verify(&issued.code, later), VerifyOutcome::Invalid);

        let expired: Vec<_> = actions_for(&f.audit, issued.code.as_str())
            .into_iter()
            .filter(|a| *a == AuditAction::Expired)
            .collect();
        assert_eq!(expired.len(), 1);
    }

    #[test]
    fn lazy_expiry_and_reaper_log_expired_exactly_once() {
        let f = fixture();
        let reaper = ExpiryReaper::new(f.store.clone(), f.audit.clone());
        let now = Utc::now();

        let issued = f
            .store
            .issue("Marco", None, now + Duration::seconds(30), now)
            .unwrap();
        let later = now + Duration::seconds(30);

        // Request-triggered expiry wins; the sweep afterwards finds nothing.
        assert!(matches!(
            f.gate.verify(&issued.code, later),
            VerifyOutcome::Expired { .. }
        ));
        assert_eq!(reaper.sweep(later), 0);

        let expired: Vec<_> = actions_for(&f.audit, issued.code.as_str())
            .into_iter()
            .filter(|a| *a == AuditAction::Expired)
            .collect();
        assert_eq!(expired.len(), 1);
    }

    #[test]
    fn dispatch_publishes_and_logs_activation() {
        let f = fixture();
        let now = Utc::now();

        let issued = f
            .store
            .issue("Marco", None, now + Duration::seconds(60), now)
            .unwrap();

        let dispatched = f.gate.dispatch(&issued.code, "relay_1", "ON", now).unwrap();
        assert_eq!(dispatched.owner, "Marco");
        assert_eq!(dispatched.target, "relay_1");

        let published = f.transport.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "relay_1");
        assert_eq!(published[0].payload, "ON");

        assert_eq!(
            actions_for(&f.audit, issued.code.as_str()),
            vec![
                AuditAction::Created,
                AuditAction::Verified,
                AuditAction::ActivatedRelay {
                    target: "relay_1".to_string()
                },
            ]
        );
    }

    #[test]
    fn dispatch_encodes_payload_per_target() {
        let f = fixture();
        let now = Utc::now();

        let issued = f
            .store
            .issue("Marco", None, now + Duration::seconds(60), now)
            .unwrap();

        f.gate.dispatch(&issued.code, "light", "ON", now).unwrap();

        let published = f.transport.published();
        let doc: serde_json::Value = serde_json::from_str(&published[0].payload).unwrap();
        assert_eq!(doc["state"], "ON");
    }

    #[test]
    fn dispatch_with_rejected_code_never_publishes() {
        let f = fixture();
        let now = Utc::now();
        let code: AccessCode = "12345".parse().unwrap();

        let err = f.gate.dispatch(&code, "relay_1", "ON", now).unwrap_err();
        assert_eq!(err, DispatchError::Rejected(VerifyOutcome::Invalid));
        assert!(f.transport.published().is_empty());
    }

    #[test]
    fn dispatch_to_unknown_target_fails_without_publish() {
        let f = fixture();
        let now = Utc::now();

        let issued = f
            .store
            .issue("Marco", None, now + Duration::seconds(60), now)
            .unwrap();

        let err = f
            .gate
            .dispatch(&issued.code, "garage_door", "OPEN", now)
            .unwrap_err();
        assert_eq!(err, DispatchError::UnknownTarget("garage_door".to_string()));
        assert!(f.transport.published().is_empty());
    }

    #[test]
    fn transport_failure_leaves_the_code_valid() {
        let f = fixture();
        let now = Utc::now();

        let issued = f
            .store
            .issue("Marco", None, now + Duration::seconds(60), now)
            .unwrap();

        f.transport.fail_next("broker down");
        let err = f
            .gate
            .dispatch(&issued.code, "relay_1", "ON", now)
            .unwrap_err();
        assert!(matches!(err, DispatchError::Transport(_)));

        // The VERIFIED step stands, nothing more was logged for the attempt.
        assert_eq!(
            actions_for(&f.audit, issued.code.as_str()),
            vec![AuditAction::Created, AuditAction::Verified]
        );

        // The code was not consumed: verify and retry both succeed.
        assert!(matches!(
            f.gate.verify(&issued.code, now),
            VerifyOutcome::Authorized { .. }
        ));
        let retried = f.gate.dispatch(&issued.code, "relay_1", "ON", now).unwrap();
        assert_eq!(retried.owner, "Marco");
        assert_eq!(f.transport.published().len(), 1);
    }

    #[test]
    fn admin_actuation_publishes_without_a_code() {
        let f = fixture();
        let now = Utc::now();

        let dispatched = f.gate.actuate("admin", "relay_2", "OFF", now).unwrap();
        assert_eq!(dispatched.target, "relay_2");

        let published = f.transport.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "relay_2");

        let entries = f.audit.read_all();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].owner, "admin");
        assert_eq!(entries[0].code, PLACEHOLDER);
        assert_eq!(
            entries[0].action,
            AuditAction::ActivatedRelay {
                target: "relay_2".to_string()
            }
        );
    }

    #[test]
    fn full_lifecycle_marco_scenario() {
        let f = fixture();
        let now = Utc::now();

        let issued = f
            .store
            .issue("Marco", None, now + Duration::seconds(60), now)
            .unwrap();

        assert_eq!(
            f.gate.verify(&issued.code, now),
            VerifyOutcome::Authorized {
                owner: "Marco".to_string()
            }
        );

        let dispatched = f.gate.dispatch(&issued.code, "relay_1", "ON", now).unwrap();
        assert_eq!(dispatched.owner, "Marco");

        let later = now + Duration::seconds(61);
        assert!(matches!(
            f.gate.verify(&issued.code, later),
            VerifyOutcome::Expired { .. }
        ));
        assert!(f.store.snapshot_active(later).is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any instant inside `[valid_from, valid_until)` authorizes
        /// with the issuing owner; any instant outside never does.
        #[test]
        fn verify_matches_the_window(
            len in 1i64..86_400,
            offset in -172_800i64..172_800,
            seed in any::<u64>(),
        ) {
            let f = fixture();
            let now = Utc::now();
            let mut rng = StdRng::seed_from_u64(seed);

            let issued = f
                .store
                .issue_with_rng(&mut rng, "Marco", Some(now), now + Duration::seconds(len), now)
                .unwrap();

            let probe = now + Duration::seconds(offset);
            let outcome = f.gate.verify(&issued.code, probe);

            if offset >= 0 && offset < len {
                prop_assert_eq!(outcome, VerifyOutcome::Authorized { owner: "Marco".to_string() });
            } else {
                prop_assert_ne!(
                    outcome,
                    VerifyOutcome::Authorized { owner: "Marco".to_string() }
                );
            }
        }
    }
}
