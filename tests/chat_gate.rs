use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use saathi_gateway::app;
use saathi_gateway::backend::ChatBackend;
use saathi_gateway::error::GatewayError;
use saathi_gateway::models::Message;
use saathi_gateway::rate_limit::{RateLimiter, RequestLimiter};
use saathi_gateway::state::AppState;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::ServiceExt;

// Backend stand-in that counts calls instead of hitting the network
struct MockBackend {
    configured: bool,
    fail: bool,
    calls: AtomicUsize,
}

impl MockBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self { configured: true, fail: false, calls: AtomicUsize::new(0) })
    }

    fn unconfigured() -> Arc<Self> {
        Arc::new(Self { configured: false, fail: false, calls: AtomicUsize::new(0) })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { configured: true, fail: true, calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn provider(&self) -> &str {
        "Mock"
    }

    fn model(&self) -> &str {
        "mock-1"
    }

    fn max_tokens(&self) -> u32 {
        500
    }

    async fn complete(&self, history: &[Message], _language: &str) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GatewayError::Upstream("mock failure".to_string()));
        }
        let last = history.last().map(|m| m.content.as_str()).unwrap_or_default();
        Ok(format!("echo({}): {}", history.len(), last))
    }
}

fn gateway(backend: Arc<MockBackend>) -> (Arc<AppState>, Arc<RateLimiter>) {
    let limiter = Arc::new(RateLimiter::new(3, Duration::from_secs(60)));
    let state = AppState::new(limiter.clone(), backend, 16, 20);
    (state, limiter)
}

fn chat_request(path: &str, client: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(state: &Arc<AppState>, req: Request<Body>) -> (StatusCode, Value) {
    let res = app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_fourth_request_is_rejected_without_upstream_call() {
    let backend = MockBackend::new();
    let (state, _) = gateway(backend.clone());

    for expected_remaining in [2, 1, 0] {
        let (status, body) = send(&state, chat_request("/chat", "10.0.0.1", json!({"message": "rent deposit"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["rate_limit"]["limit"], 3);
        assert_eq!(body["rate_limit"]["remaining"], expected_remaining);
        assert_eq!(body["rate_limit"]["reset_in"], 60);
        assert!(body["rate_limit"].get("current_requests").is_none());
    }

    let (status, body) = send(&state, chat_request("/chat", "10.0.0.1", json!({"message": "one more"}))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(body["intent"], "rate_limit");
    assert_eq!(body["rate_limit"]["limit"], 3);
    assert_eq!(body["rate_limit"]["remaining"], 0);
    assert_eq!(body["rate_limit"]["current_requests"], 3);
    let reset_in = body["rate_limit"]["reset_in"].as_u64().unwrap();
    assert!((58..=60).contains(&reset_in), "reset_in was {reset_in}");

    assert_eq!(backend.calls(), 3);
}

#[tokio::test]
async fn test_clients_do_not_share_quota() {
    let backend = MockBackend::new();
    let (state, _) = gateway(backend.clone());

    for _ in 0..3 {
        send(&state, chat_request("/chat", "10.0.0.1", json!({"message": "hi"}))).await;
    }
    let (status, _) = send(&state, chat_request("/chat", "10.0.0.1", json!({"message": "hi"}))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // only the first forwarded-for hop is the key
    let (status, body) = send(&state, chat_request("/chat", "10.0.0.2, 10.0.0.1", json!({"message": "hi"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rate_limit"]["remaining"], 2);
}

#[tokio::test]
async fn test_alias_route_shares_the_limiter() {
    let backend = MockBackend::new();
    let (state, limiter) = gateway(backend.clone());

    send(&state, chat_request("/chat", "10.0.0.9", json!({"message": "a"}))).await;
    let (status, body) = send(&state, chat_request("/api/chat", "10.0.0.9", json!({"message": "b"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rate_limit"]["remaining"], 1);
    assert_eq!(limiter.stored_count("10.0.0.9"), 2);
}

#[tokio::test]
async fn test_unconfigured_backend_refuses_before_limiting() {
    let backend = MockBackend::unconfigured();
    let (state, limiter) = gateway(backend.clone());

    let (status, body) = send(&state, chat_request("/chat", "10.0.0.1", json!({"message": "hi"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "API_NOT_CONFIGURED");
    assert_eq!(limiter.tracked_clients(), 0);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_invalid_message_still_consumes_a_slot() {
    let backend = MockBackend::new();
    let (state, _) = gateway(backend.clone());

    let (status, body) = send(&state, chat_request("/chat", "10.0.0.3", json!({"message": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No message provided");

    let too_long = "a".repeat(1001);
    let (status, _) = send(&state, chat_request("/chat", "10.0.0.3", json!({"message": too_long}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&state, chat_request("/chat", "10.0.0.3", json!({"message": "ok"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rate_limit"]["remaining"], 0);
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_upstream_failure_maps_to_gemini_error() {
    let backend = MockBackend::failing();
    let (state, _) = gateway(backend.clone());

    let (status, body) = send(&state, chat_request("/chat", "10.0.0.4", json!({"message": "hi"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "GEMINI_API_ERROR");
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_success_body_and_session_history() {
    let backend = MockBackend::new();
    let (state, _) = gateway(backend.clone());

    let first = json!({"message": "My landlord kept my deposit", "session_id": "s-1", "user_name": "Asha", "message_count": 1});
    let (status, body) = send(&state, chat_request("/chat", "10.0.0.5", first)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "echo(1): My landlord kept my deposit");
    assert_eq!(body["intent"], "property_law");
    assert_eq!(body["language"], "english");
    assert_eq!(body["user_name"], "Asha");
    assert_eq!(body["session_id"], "s-1");
    assert_eq!(body["message_count"], 1);
    assert_eq!(body["provider"], "Mock");
    assert_eq!(body["model"], "mock-1");

    // user + assistant from the first turn, plus the new user turn
    let second = json!({"message": "What next?", "session_id": "s-1"});
    let (_, body) = send(&state, chat_request("/chat", "10.0.0.5", second)).await;
    assert_eq!(body["reply"], "echo(3): What next?");
    assert_eq!(state.conversations.history("s-1").len(), 4);
}

#[tokio::test]
async fn test_reset_clears_session() {
    let backend = MockBackend::new();
    let (state, _) = gateway(backend.clone());

    send(&state, chat_request("/chat", "10.0.0.6", json!({"message": "hi", "session_id": "s-2"}))).await;
    assert_eq!(state.conversations.history("s-2").len(), 2);

    let req = Request::builder()
        .method("POST")
        .uri("/reset")
        .header("content-type", "application/json")
        .body(Body::from(json!({"session_id": "s-2"}).to_string()))
        .unwrap();
    let (status, body) = send(&state, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared_sessions"], 1);
    assert!(state.conversations.history("s-2").is_empty());
}

#[tokio::test]
async fn test_peer_address_used_without_proxy_headers() {
    let backend = MockBackend::new();
    let (state, limiter) = gateway(backend.clone());

    let addr: SocketAddr = "172.16.0.8:40000".parse().unwrap();
    let mut req = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(json!({"message": "hi"}).to_string()))
        .unwrap();
    req.extensions_mut().insert(ConnectInfo(addr));

    let (status, _) = send(&state, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(limiter.stored_count("172.16.0.8"), 1);
}

#[tokio::test]
async fn test_health_and_config_report_limits() {
    let backend = MockBackend::new();
    let (state, _) = gateway(backend);

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&state, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["api_configured"], true);
    assert_eq!(body["rate_limit"]["limit"], 3);
    assert_eq!(body["rate_limit"]["window_seconds"], 60);

    let req = Request::builder().uri("/config").body(Body::empty()).unwrap();
    let (status, body) = send(&state, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["max_tokens"], 500);
    assert_eq!(body["model"], "mock-1");
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_counters() {
    let backend = MockBackend::new();
    let (state, _) = gateway(backend);

    send(&state, chat_request("/chat", "10.0.0.7", json!({"message": "hi"}))).await;

    let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let res = app(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"), "content-type was {content_type}");
    let text = String::from_utf8(to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
    assert!(text.contains("saathi_chat_requests_total"));
}
