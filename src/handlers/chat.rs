use axum::extract::{ConnectInfo, State};
use axum::http::{Extensions, HeaderMap};
use axum::Json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{info, warn};
use crate::client_id::resolve_client_id;
use crate::error::GatewayError;
use crate::intent::detect_intent;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{BatchedRequest, ChatRequest, ChatResponse, RateLimitInfo};
use crate::state::AppState;

pub const MAX_MESSAGE_CHARS: usize = 1000;

/// `POST /chat` and `POST /api/chat`.
///
/// The limiter is consulted before anything is queued for the backend, so a
/// rejected request never costs an upstream call. `remaining` in the success
/// body comes from the count observed at admission time; it is not re-read
/// after the reply arrives.
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    extensions: Extensions,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, GatewayError> {
    REQUEST_TOTAL.inc();

    if !state.backend.is_configured() {
        return Err(GatewayError::NotConfigured);
    }

    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_id = resolve_client_id(&headers, peer);

    let limit = state.limiter.limit();
    let window_secs = state.limiter.window().as_secs();

    let decision = state.limiter.check_and_record(&client_id, Instant::now());
    if !decision.admitted {
        warn!(client_id = %client_id, current = decision.current_count, "rate limit exceeded");
        return Err(GatewayError::RateLimited {
            client_id,
            limit,
            window_secs,
            reset_in: decision.reset_in_seconds,
            current_requests: decision.current_count,
        });
    }

    let message = payload.message.trim();
    if message.is_empty() {
        return Err(GatewayError::BadRequest("No message provided".to_string()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(GatewayError::BadRequest(format!(
            "Query too long. Please keep it under {} characters.",
            MAX_MESSAGE_CHARS
        )));
    }

    // anonymous callers share a conversation per client key
    let session = if payload.session_id.is_empty() {
        client_id.as_str()
    } else {
        payload.session_id.as_str()
    };
    let history = state.conversations.push_user(session, message);

    info!(
        client_id = %client_id,
        language = %payload.language,
        turns = history.len(),
        "processing query"
    );

    let start_time = Instant::now();

    let (response_tx, response_rx) = oneshot::channel();

    let batched = BatchedRequest {
        history,
        language: payload.language.clone(),
        response_tx,
    };

    state.batch_tx.send(batched).await
        .map_err(|_| GatewayError::Queue("Failed to queue request".to_string()))?;

    let reply = response_rx.await
        .map_err(|_| GatewayError::Queue("Worker failed to respond".to_string()))??;

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    state.conversations.push_assistant(session, &reply);

    Ok(Json(ChatResponse {
        reply,
        language: payload.language.clone(),
        intent: detect_intent(message).to_string(),
        status: "success".to_string(),
        user_name: payload.user_name.clone(),
        session_id: payload.session_id.clone(),
        message_count: payload.message_count,
        provider: state.backend.provider().to_string(),
        model: state.backend.model().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        rate_limit: RateLimitInfo {
            limit,
            remaining: limit.saturating_sub(decision.current_count),
            reset_in: window_secs,
            current_requests: None,
        },
    }))
}
