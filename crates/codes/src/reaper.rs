//! Background expiry sweep.

use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use relaykey_audit::{AuditAction, AuditEntry, AuditLog};

use crate::store::CodeStore;

/// Reaper configuration.
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    /// How often to sweep for expired codes.
    pub interval: Duration,
    /// Name for logging.
    pub name: String,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            name: "expiry-reaper".to_string(),
        }
    }
}

impl ReaperConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Handle to a running reaper thread.
#[derive(Debug)]
pub struct ReaperHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl ReaperHandle {
    /// Request graceful shutdown and wait for the thread to finish.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Periodic housekeeping over [`CodeStore`].
///
/// Each run obtains the current time once, removes every entry whose window
/// has closed, and emits one `EXPIRED` audit entry per removal: the same
/// effect as the lazy-expiry branch of verification, just triggered by time
/// instead of a request. One thread, synchronous sweeps, so ticks cannot
/// overlap each other.
pub struct ExpiryReaper {
    store: Arc<CodeStore>,
    audit: Arc<dyn AuditLog>,
}

impl ExpiryReaper {
    pub fn new(store: Arc<CodeStore>, audit: Arc<dyn AuditLog>) -> Self {
        Self { store, audit }
    }

    /// One sweep pass at `now`. Returns how many codes were removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let removed = self.store.sweep_expired(now);

        for (code, entry) in &removed {
            self.audit.record(AuditEntry::new(
                &entry.owner,
                code,
                AuditAction::Expired,
                now,
            ));
            info!(code = %code, owner = %entry.owner, "expired code removed");
        }

        removed.len()
    }

    /// Spawn the reaper in a background thread.
    pub fn spawn(self, config: ReaperConfig) -> ReaperHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let name = config.name.clone();
        let join = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                info!(reaper = %config.name, interval_secs = config.interval.as_secs(), "expiry reaper started");

                loop {
                    match shutdown_rx.recv_timeout(config.interval) {
                        // Shutdown requested, or every handle dropped.
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                        Err(mpsc::RecvTimeoutError::Timeout) => {
                            let removed = self.sweep(Utc::now());
                            if removed > 0 {
                                debug!(reaper = %config.name, removed, "sweep tick");
                            }
                        }
                    }
                }

                info!(reaper = %config.name, "expiry reaper stopped");
            })
            .expect("failed to spawn expiry reaper thread");

        ReaperHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }
}
