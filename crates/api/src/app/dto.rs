use chrono::{DateTime, Utc};
use serde::Deserialize;

use relaykey_codes::{ActiveCode, IssuedCode};
use relaykey_gate::VerifyOutcome;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub code: String,
    pub target: String,
    pub payload: String,
}

#[derive(Debug, Deserialize)]
pub struct IssueCodeRequest {
    pub owner: String,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ActuateRequest {
    pub target: String,
    pub payload: String,
}

// -------------------------
// JSON mapping helpers
// -------------------------

/// Stable reason labels for rejected verifications.
pub fn rejection_reason(outcome: &VerifyOutcome) -> &'static str {
    match outcome {
        VerifyOutcome::Invalid => "invalid",
        VerifyOutcome::TooEarly { .. } => "too_early",
        VerifyOutcome::Expired { .. } => "expired",
        VerifyOutcome::Authorized { .. } => "authorized",
    }
}

pub fn issued_to_json(issued: IssuedCode) -> serde_json::Value {
    serde_json::json!({
        "code": issued.code.to_string(),
        "owner": issued.owner,
        "valid_from": issued.window.valid_from().to_rfc3339(),
        "valid_until": issued.window.valid_until().to_rfc3339(),
    })
}

pub fn active_code_to_json(active: ActiveCode) -> serde_json::Value {
    serde_json::json!({
        "code": active.code.to_string(),
        "owner": active.owner,
        "valid_from": active.window.valid_from().to_rfc3339(),
        "valid_until": active.window.valid_until().to_rfc3339(),
        "remaining_seconds": active.remaining_seconds,
    })
}
