use axum::{http::StatusCode, routing::get, Router};

use relaykey_core::{AccessCode, DomainError};

use crate::app::errors;

pub mod access;
pub mod actuation;
pub mod audit;
pub mod codes;
pub mod system;

/// Router for the unauthenticated code-holder endpoints.
pub fn public_router() -> Router {
    access::router()
}

/// Router for all admin (token-gated) endpoints, nested under `/admin`.
pub fn admin_router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(codes::router())
        .merge(audit::router())
        .merge(actuation::router())
}

/// Parse a presented code string, mapping failure to a 400 response.
pub fn parse_code(raw: &str) -> Result<AccessCode, axum::response::Response> {
    raw.parse().map_err(|e: DomainError| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_code", e.to_string())
    })
}
