//! Code-holder endpoints: verify a code, dispatch a command with it.
//!
//! Rejections are regular outcomes, not HTTP errors: the frontend shows the
//! reason to the person at the door, so they come back as 200 with
//! `authorized`/`dispatched` set to false.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use relaykey_core::AccessCode;
use relaykey_gate::{DispatchError, VerifyOutcome};

use crate::app::routes::parse_code;
use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/verify", post(verify))
        .route("/dispatch", post(dispatch))
}

/// POST /verify - evaluate a presented code.
pub async fn verify(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::VerifyRequest>,
) -> axum::response::Response {
    let code: AccessCode = match parse_code(&body.code) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match services.gate.verify(&code, Utc::now()) {
        VerifyOutcome::Authorized { owner } => (
            StatusCode::OK,
            Json(serde_json::json!({
                "authorized": true,
                "owner": owner,
            })),
        )
            .into_response(),
        outcome => (
            StatusCode::OK,
            Json(serde_json::json!({
                "authorized": false,
                "reason": dto::rejection_reason(&outcome),
            })),
        )
            .into_response(),
    }
}

/// POST /dispatch - verify a code and publish a command through the gate.
pub async fn dispatch(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::DispatchRequest>,
) -> axum::response::Response {
    let code: AccessCode = match parse_code(&body.code) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match services
        .gate
        .dispatch(&code, &body.target, &body.payload, Utc::now())
    {
        Ok(dispatched) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "dispatched": true,
                "owner": dispatched.owner,
                "target": dispatched.target,
            })),
        )
            .into_response(),
        Err(DispatchError::Rejected(outcome)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "dispatched": false,
                "reason": dto::rejection_reason(&outcome),
            })),
        )
            .into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}
