use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::GatewayError;

// One turn of a conversation
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

// Chat request body - every field optional, identity comes from headers
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct ChatRequest {
    pub message: String,
    pub user_name: String,
    pub language: String,
    pub session_id: String,
    pub message_count: u64,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            message: String::new(),
            user_name: "User".to_string(),
            language: "english".to_string(),
            session_id: String::new(),
            message_count: 0,
        }
    }
}

// Quota block attached to chat responses
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
    pub reset_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_requests: Option<u32>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ChatResponse {
    pub reply: String,
    pub language: String,
    pub intent: String,
    pub status: String,
    pub user_name: String,
    pub session_id: String,
    pub message_count: u64,
    pub provider: String,
    pub model: String,
    pub timestamp: String,
    pub rate_limit: RateLimitInfo,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ResetRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

// Queued upstream call - conversation so far + channel for the reply
pub struct BatchedRequest {
    pub history: Vec<Message>,
    pub language: String,
    pub response_tx: oneshot::Sender<Result<String, GatewayError>>,
}
