use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::metrics::{RATE_LIMITED_TOTAL, SERVER_ERRORS};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("rate limit exceeded for client {client_id}")]
    RateLimited {
        client_id: String,
        limit: u32,
        window_secs: u64,
        reset_in: u64,
        current_requests: u32,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("chat backend is not configured")]
    NotConfigured,

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("request queue error: {0}")]
    Queue(String),
}

impl GatewayError {
    // stable code clients switch on
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            GatewayError::BadRequest(_) => "BAD_REQUEST",
            GatewayError::NotConfigured => "API_NOT_CONFIGURED",
            GatewayError::Upstream(_) => "GEMINI_API_ERROR",
            GatewayError::Queue(_) => "UNEXPECTED_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotConfigured | GatewayError::Upstream(_) | GatewayError::Queue(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match &self {
            GatewayError::RateLimited {
                limit,
                window_secs,
                reset_in,
                current_requests,
                ..
            } => {
                RATE_LIMITED_TOTAL.inc();
                json!({
                    "reply": format!(
                        "Rate limit exceeded. You can make {} requests per {} seconds. Please wait {} seconds before trying again.",
                        limit, window_secs, reset_in
                    ),
                    "intent": "rate_limit",
                    "error": code,
                    "status": "error",
                    "rate_limit": {
                        "limit": limit,
                        "remaining": 0,
                        "reset_in": reset_in,
                        "current_requests": current_requests,
                    }
                })
            }
            GatewayError::BadRequest(message) => json!({
                "error": message,
                "status": "error",
            }),
            GatewayError::NotConfigured => {
                SERVER_ERRORS.inc();
                json!({
                    "reply": "Sorry, the chatbot is not properly configured. Please contact the administrator.",
                    "intent": null,
                    "error": code,
                    "status": "error",
                })
            }
            GatewayError::Upstream(_) => {
                SERVER_ERRORS.inc();
                json!({
                    "reply": "I'm having trouble connecting to my knowledge base. Please try again later.",
                    "intent": null,
                    "error": code,
                    "status": "error",
                })
            }
            GatewayError::Queue(_) => {
                SERVER_ERRORS.inc();
                json!({
                    "reply": "I encountered an unexpected error. Please try again later.",
                    "intent": null,
                    "error": code,
                    "status": "error",
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_statuses() {
        let limited = GatewayError::RateLimited {
            client_id: "a".into(),
            limit: 3,
            window_secs: 60,
            reset_in: 57,
            current_requests: 3,
        };
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(limited.code(), "RATE_LIMIT_EXCEEDED");

        assert_eq!(GatewayError::NotConfigured.code(), "API_NOT_CONFIGURED");
        assert_eq!(
            GatewayError::Upstream("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::BadRequest("nope".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
