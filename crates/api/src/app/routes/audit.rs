//! Admin read access to the audit trail.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/audit", get(read_audit))
}

/// GET /admin/audit - the full trail, insertion-ordered.
pub async fn read_audit(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let entries = services.audit.read_all();

    (
        StatusCode::OK,
        Json(serde_json::json!({ "entries": entries })),
    )
        .into_response()
}
