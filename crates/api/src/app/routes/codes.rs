//! Admin routes for the code lifecycle: issue, list, revoke.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use relaykey_core::AccessCode;

use crate::app::routes::parse_code;
use crate::app::{dto, errors, services::AppServices};
use crate::context::AdminContext;

pub fn router() -> Router {
    Router::new()
        .route("/codes", post(issue_code).get(list_codes))
        .route("/codes/:code", axum::routing::delete(revoke_code))
}

/// POST /admin/codes - issue a new access code.
pub async fn issue_code(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(admin): Extension<AdminContext>,
    Json(body): Json<dto::IssueCodeRequest>,
) -> axum::response::Response {
    let now = Utc::now();

    let issued = match services
        .store
        .issue(&body.owner, body.valid_from, body.valid_until, now)
    {
        Ok(issued) => issued,
        Err(e) => return errors::issue_error_to_response(e),
    };

    tracing::info!(
        admin = %admin.name(),
        owner = %issued.owner,
        code = %issued.code,
        "access code issued"
    );

    (StatusCode::CREATED, Json(dto::issued_to_json(issued))).into_response()
}

/// GET /admin/codes - list live codes with derived remaining time.
pub async fn list_codes(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let active = services.store.snapshot_active(Utc::now());

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "active": active
                .into_iter()
                .map(dto::active_code_to_json)
                .collect::<Vec<_>>(),
        })),
    )
        .into_response()
}

/// DELETE /admin/codes/:code - revoke a live code.
pub async fn revoke_code(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(admin): Extension<AdminContext>,
    Path(code): Path<String>,
) -> axum::response::Response {
    let code: AccessCode = match parse_code(&code) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match services.store.revoke(&code, Utc::now()) {
        Some(entry) => {
            tracing::info!(admin = %admin.name(), code = %code, owner = %entry.owner, "access code revoked");
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "revoked": true,
                    "owner": entry.owner,
                })),
            )
                .into_response()
        }
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "no such code"),
    }
}
