use axum::http::HeaderMap;
use std::net::SocketAddr;

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";

/// Pick the key the rate limiter partitions on.
///
/// First hit wins: the first `X-Forwarded-For` entry, then `X-Real-IP`,
/// then the peer's IP, then `"unknown"`. Nothing is validated; the result
/// is only ever used as a map key. Proxy headers are trusted as-is, so a
/// caller that reaches the gateway directly can pick its own key.
pub fn resolve_client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = header_str(headers, FORWARDED_FOR) {
        let first = forwarded.split(',').next().unwrap_or_default();
        return first.trim().to_string();
    }

    if let Some(real_ip) = header_str(headers, REAL_IP) {
        return real_ip.to_string();
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}

// header value as str, treating empty / non-ascii values as missing
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}
