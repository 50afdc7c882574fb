//! Saathi gateway: a rate limited chat front door for a Gemini-backed
//! Indian legal assistant.
//!
//! Every chat request is keyed by client (see [`client_id`]) and checked
//! against a per-client sliding window ([`rate_limit`]) before any upstream
//! work is queued.

pub mod backend;
pub mod client_id;
pub mod config;
pub mod conversation;
pub mod error;
pub mod handlers;
pub mod intent;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod worker;

use axum::{Router, routing::{get, post}};
use std::sync::Arc;

use crate::handlers::{chat_handler, config_handler, health_handler, metrics_handler, reset_handler};
use crate::state::AppState;

// creating the router with routes
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config", get(config_handler))
        .route("/metrics", get(metrics_handler))
        .route("/chat", post(chat_handler))
        .route("/api/chat", post(chat_handler)) // alias kept for older clients
        .route("/reset", post(reset_handler))
        .with_state(state)
}
