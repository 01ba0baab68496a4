use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use relaykey_codes::IssueError;
use relaykey_gate::DispatchError;

pub fn issue_error_to_response(err: IssueError) -> axum::response::Response {
    match err {
        IssueError::InvalidWindow(e) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_window", e.to_string())
        }
        IssueError::PoolExhausted(attempts) => {
            tracing::error!(attempts, "access code pool exhausted");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "code_pool_exhausted",
                "could not generate a unique access code",
            )
        }
    }
}

/// Mapping for dispatch failures *other than* code rejection; a rejected
/// code is a regular outcome (`dispatched: false`), handled at the route.
pub fn dispatch_error_to_response(err: DispatchError) -> axum::response::Response {
    match err {
        DispatchError::Rejected(_) => unreachable!("rejections are handled by the route"),
        DispatchError::UnknownTarget(target) => json_error(
            StatusCode::BAD_REQUEST,
            "unknown_target",
            format!("no such actuation target: {target}"),
        ),
        DispatchError::Transport(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "transport_failure",
            e.to_string(),
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
