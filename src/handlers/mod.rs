mod commands;
mod components;

pub use commands::handle_slash_command;
pub use components::handle_component;

use crate::rooms::RoomError;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

pub async fn health_check() -> &'static str {
    "OK"
}

/// Render an operation result for the UI layer. User errors go back verbatim;
/// platform and store failures are logged with context and rendered
/// generically.
fn render(result: Result<String, RoomError>, operation: &str, channel_id: &str) -> Response {
    match result {
        Ok(text) => Json(json!({ "text": text })).into_response(),
        Err(e) if e.is_user_error() => Json(json!({ "text": e.to_string() })).into_response(),
        Err(e) => {
            tracing::error!(operation, channel_id, "operation failed: {}", e);
            Json(json!({ "text": "Something went wrong. Please try again later." })).into_response()
        }
    }
}
