//! Admin direct actuation (no code involved).

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use crate::app::{dto, errors, services::AppServices};
use crate::context::AdminContext;

pub fn router() -> Router {
    Router::new().route("/actuate", post(actuate))
}

/// POST /admin/actuate - publish a command as the authenticated admin.
pub async fn actuate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(admin): Extension<AdminContext>,
    Json(body): Json<dto::ActuateRequest>,
) -> axum::response::Response {
    match services
        .gate
        .actuate(admin.name(), &body.target, &body.payload, Utc::now())
    {
        Ok(dispatched) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "dispatched": true,
                "target": dispatched.target,
            })),
        )
            .into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}
