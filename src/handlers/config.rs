use axum::{Json, extract::State};
use serde_json::{Value, json};
use std::sync::Arc;
use crate::state::AppState;

// Public, secret-free view of the running configuration
pub async fn config_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "app_name": "Saathi Legal Assistant",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.backend.model(),
        "provider": state.backend.provider(),
        "api_configured": state.backend.is_configured(),
        "max_tokens": state.backend.max_tokens(),
        "rate_limit": {
            "limit": state.limiter.limit(),
            "window_seconds": state.limiter.window().as_secs(),
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
