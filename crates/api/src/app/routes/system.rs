use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::AdminContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(admin): Extension<AdminContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "principal_id": admin.principal_id().to_string(),
        "name": admin.name(),
        "roles": admin.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
    }))
}
