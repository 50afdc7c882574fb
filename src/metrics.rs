use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("saathi_chat_requests_total", "Total number of chat requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter =
        register_counter!("saathi_chat_rate_limited_total", "Chat requests rejected by the rate limiter").unwrap();
    pub static ref SERVER_ERRORS: Counter =
        register_counter!("saathi_server_errors_total", "Responses that ended in a 5xx").unwrap();
    pub static ref UPSTREAM_ERRORS: Counter =
        register_counter!("saathi_upstream_errors_total", "Failed calls to the LLM backend").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "saathi_upstream_latency_seconds",
        "Time spent waiting on the LLM backend in seconds"
    )
    .unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("saathi_rate_limit_clients", "Clients with a live rate limit window").unwrap();
}
