//! `relaykey-codes` — the live-code store and its background expiry sweep.
//!
//! [`CodeStore`] is the single source of truth for currently-live access
//! codes. [`ExpiryReaper`] is the periodic housekeeping task that removes
//! codes past their window independently of any request.

pub mod reaper;
pub mod store;

pub use reaper::{ExpiryReaper, ReaperConfig, ReaperHandle};
pub use store::{ActiveCode, CodeEntry, CodeStore, IssueError, IssuedCode};
