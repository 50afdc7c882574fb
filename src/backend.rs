use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::error::GatewayError;
use crate::models::Message;

const PLACEHOLDER_KEY: &str = "your-gemini-api-key-here";
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

pub const SYSTEM_PROMPT: &str = "You are Saathi, a helpful legal assistant that provides general legal information for Indian law and common legal situations.

Important guidelines:
1. Provide accurate, helpful legal information based on Indian laws
2. Always remind users that this is general information only
3. Advise users to consult with a qualified attorney for specific legal advice
4. Be empathetic and understanding in your responses
5. Provide practical next steps when possible
6. Focus on Indian legal system, laws, and procedures
7. If you're not sure about something, say so clearly
8. Use simple language that common people can understand
9. Provide relevant Indian law references when possible
10. Be culturally sensitive to Indian legal context

Remember: You provide information, not legal advice. Always encourage users to seek professional legal counsel for their specific situations.";

// (language key, display name, native label)
const LANGUAGES: &[(&str, &str, &str)] = &[
    ("hindi", "Hindi", "Hindi"),
    ("marathi", "Marathi", "मराठी"),
    ("tamil", "Tamil", "தமிழ்"),
    ("telugu", "Telugu", "తెలుగు"),
    ("gujarati", "Gujarati", "ગુજરાતી"),
    ("bengali", "Bengali", "বাংলা"),
    ("kannada", "Kannada", "ಕನ್ನಡ"),
    ("punjabi", "Punjabi", "ਪੰਜਾਬੀ"),
];

/// The expensive downstream call the chat gate protects.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn is_configured(&self) -> bool;
    fn provider(&self) -> &str;
    fn model(&self) -> &str;
    fn max_tokens(&self) -> u32;
    async fn complete(&self, history: &[Message], language: &str) -> Result<String, GatewayError>;
}

// Instruction appended to the system prompt; unknown languages get english
pub fn language_instruction(language: &str) -> String {
    match LANGUAGES.iter().find(|(key, _, _)| *key == language) {
        Some((_, name, native)) => format!(
            "Provide your response in both {name} and English. Format: **{native}:** [response in {name}] **English:** [response in English]"
        ),
        None => "Respond in English only.".to_string(),
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct Part {
    text: String,
}

#[derive(Serialize, Deserialize, Debug)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

// Google Gemini generateContent client
pub struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl GeminiBackend {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            max_tokens,
            temperature,
        }
    }

    fn build_request(&self, history: &[Message], language: &str) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(history.len() + 2);
        parts.push(Part {
            text: format!(
                "{}\n\nIMPORTANT LANGUAGE INSTRUCTION: {}\n\nConversation:\n",
                SYSTEM_PROMPT,
                language_instruction(language)
            ),
        });
        for msg in history {
            parts.push(Part {
                text: format!("{}: {}\n", title_case(&msg.role), msg.content),
            });
        }
        parts.push(Part { text: "Assistant: ".to_string() });

        GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        }
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty() && k != PLACEHOLDER_KEY)
    }

    fn provider(&self) -> &str {
        "Google Gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    async fn complete(&self, history: &[Message], language: &str) -> Result<String, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or(GatewayError::NotConfigured)?;
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);

        debug!(model = %self.model, turns = history.len(), "calling gemini");

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&self.build_request(history, language))
            .timeout(UPSTREAM_TIMEOUT)
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(format!("Request failed: {}", e)))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!(%status, body = %body, "gemini api error");
            return Err(GatewayError::Upstream(format!("Gemini returned {}", status)));
        }

        let body = res
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| GatewayError::Upstream(format!("Parse Error: {}", e)))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text.trim().to_string())
            .ok_or_else(|| {
                error!("no candidates in gemini response");
                GatewayError::Upstream("No candidates in response".to_string())
            })
    }
}

fn title_case(role: &str) -> String {
    let mut chars = role.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(key: Option<&str>) -> GeminiBackend {
        GeminiBackend::new(
            reqwest::Client::new(),
            "https://example.test/",
            key.map(str::to_string),
            "gemini-1.5-flash",
            500,
            0.7,
        )
    }

    #[test]
    fn configured_only_with_real_key() {
        assert!(!backend(None).is_configured());
        assert!(!backend(Some("   ")).is_configured());
        assert!(!backend(Some(PLACEHOLDER_KEY)).is_configured());
        assert!(backend(Some("abc123")).is_configured());
    }

    #[test]
    fn language_instruction_falls_back_to_english() {
        assert_eq!(language_instruction("english"), "Respond in English only.");
        assert_eq!(language_instruction("klingon"), "Respond in English only.");
        assert!(language_instruction("tamil").contains("**தமிழ்:**"));
    }

    #[test]
    fn request_wraps_history_in_prompt() {
        let history = vec![Message::user("Is a verbal lease valid?")];
        let req = backend(Some("k")).build_request(&history, "english");
        let json = serde_json::to_value(&req).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert!(parts[0]["text"].as_str().unwrap().starts_with("You are Saathi"));
        assert_eq!(parts[1]["text"], "User: Is a verbal lease valid?\n");
        assert_eq!(parts[2]["text"], "Assistant: ");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 500);
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        assert_eq!(backend(None).base_url, "https://example.test");
    }
}
