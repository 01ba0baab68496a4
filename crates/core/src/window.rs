//! Validity window value object and its time-window state machine.
//!
//! The window is half-open: `valid_from` is inclusive, `valid_until` is
//! exclusive. A code presented exactly at `valid_until` is expired; exactly
//! at `valid_from` it is active.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Position of an instant relative to a [`ValidityWindow`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WindowStatus {
    /// `now < valid_from`: the window has not opened yet.
    Pending,
    /// `valid_from <= now < valid_until`.
    Active,
    /// `now >= valid_until`.
    Expired,
}

/// Half-open time window `[valid_from, valid_until)`.
///
/// Construction enforces `valid_until > valid_from`; an empty or inverted
/// window never reaches the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
}

impl ValidityWindow {
    pub fn new(
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if valid_until <= valid_from {
            return Err(DomainError::invalid_window(format!(
                "valid_until ({valid_until}) must be after valid_from ({valid_from})"
            )));
        }
        Ok(Self {
            valid_from,
            valid_until,
        })
    }

    pub fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }

    pub fn valid_until(&self) -> DateTime<Utc> {
        self.valid_until
    }

    pub fn status(&self, now: DateTime<Utc>) -> WindowStatus {
        if now < self.valid_from {
            WindowStatus::Pending
        } else if now >= self.valid_until {
            WindowStatus::Expired
        } else {
            WindowStatus::Active
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == WindowStatus::Expired
    }

    /// Whole seconds until `valid_until`, floored at zero for display.
    ///
    /// Derived on demand; remaining time is never stored.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.valid_until - now).num_seconds().max(0)
    }
}
