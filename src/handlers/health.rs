use axum::{Json, extract::State};
use serde_json::{Value, json};
use std::sync::Arc;
use crate::metrics::{RATE_LIMITED_TOTAL, SERVER_ERRORS};
use crate::state::AppState;

// health handler
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let uptime = state.started_at.elapsed().as_secs();

    Json(json!({
        "status": "healthy",
        "app": "Saathi Legal Assistant",
        "version": env!("CARGO_PKG_VERSION"),
        "api_configured": state.backend.is_configured(),
        "model": state.backend.model(),
        "provider": state.backend.provider(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime": {
            "seconds": uptime,
            "start_time": state.started_at_utc.to_rfc3339(),
        },
        "rate_limit": {
            "limit": state.limiter.limit(),
            "window_seconds": state.limiter.window().as_secs(),
            "tracked_clients": state.limiter.tracked_clients(),
        },
        "metrics": {
            "error_429": RATE_LIMITED_TOTAL.get() as u64,
            "error_500": SERVER_ERRORS.get() as u64,
        }
    }))
}
