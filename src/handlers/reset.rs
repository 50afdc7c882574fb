use axum::{Json, body::Bytes, extract::State};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;
use crate::error::GatewayError;
use crate::models::ResetRequest;
use crate::state::AppState;

// Clears one conversation when a session_id is given, otherwise all of them.
// An empty body is fine.
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let req: ResetRequest = if body.is_empty() {
        ResetRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| GatewayError::BadRequest(format!("Invalid JSON: {}", e)))?
    };

    let session = req.session_id.as_deref().filter(|s| !s.is_empty());
    let cleared = state.conversations.reset(session);
    info!(session = ?session, cleared, "conversation reset");

    Ok(Json(json!({
        "message": "Conversation reset successfully",
        "status": "success",
        "cleared_sessions": cleared,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
