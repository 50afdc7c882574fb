use clap::Parser; // for cli
use saathi_gateway::app;
use saathi_gateway::backend::{ChatBackend, GeminiBackend};
use saathi_gateway::config::Args;
use saathi_gateway::rate_limit::{RateLimiter, RequestLimiter, sweeper};
use saathi_gateway::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

// this is main async function with tokio
#[tokio::main]
async fn main() -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // parse cli arguments
    let args = Args::parse();

    let limiter: Arc<dyn RequestLimiter> = Arc::new(RateLimiter::new(
        args.rate_limit,
        Duration::from_secs(args.rate_window),
    ));

    let backend = Arc::new(GeminiBackend::new(
        reqwest::Client::new(),
        &args.gemini_base_url,
        args.gemini_api_key.clone(),
        &args.gemini_model,
        args.max_tokens,
        args.temperature,
    ));
    if !backend.is_configured() {
        warn!("GEMINI_API_KEY not set - chat requests will be refused");
    }

    // creating shared state, this also spawns the chat worker
    let state = AppState::new(
        Arc::clone(&limiter),
        backend,
        args.queue_size,
        args.history_limit,
    );

    // evict idle clients in the background
    tokio::spawn(sweeper(limiter, Duration::from_secs(args.sweep_interval.max(1))));

    let app = app(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "gateway running");
    info!(model = %args.gemini_model, "forwarding chat to Gemini");
    info!(
        "Rate limit: {} requests per {} seconds per client",
        args.rate_limit, args.rate_window
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await
}
