//! Google Gemini client.
//!
//! Every request is a single non-streaming `generateContent` call. Chat
//! context is rebuilt from the stored history on each turn, so clearing
//! the history also resets what the model sees.

use super::prompts::{
    content_prompt, CHAT_FALLBACK, CONTENT_FALLBACK, HEALTH_PROMPT, VISION_FALLBACK, VISION_PROMPT,
};
use super::{AiGateway, GatewayError, GatewayHealth, GenerationRequest};
use crate::models::{ChatMessage, ChatRole};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            timeout_seconds: 60,
        }
    }
}

/// `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    /// Anything else the API may send back (function calls, etc.)
    Other(serde_json::Value),
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

const CHAT_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.7,
    max_output_tokens: 1000,
};
const VISION_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.4,
    max_output_tokens: 1000,
};
const CONTENT_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.8,
    max_output_tokens: 2000,
};
const HEALTH_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.1,
    max_output_tokens: 10,
};

/// `generateContent` response body.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Gateway backed by the Gemini REST API.
pub struct GeminiGateway {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiGateway {
    /// Create a client with the configured timeout.
    pub fn new(config: GeminiConfig) -> Result<Self, GatewayError> {
        info!(
            "Initializing Gemini gateway with model {} at {}",
            config.model, config.base_url
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Translate a request into the API body plus the text to use when
    /// the model returns nothing.
    fn build_request(request: GenerationRequest) -> (GenerateContentRequest, &'static str) {
        match request {
            GenerationRequest::Chat { history, message } => {
                let mut contents = history_contents(&history);
                contents.push(Content::user(vec![Part::text(message)]));
                (
                    GenerateContentRequest {
                        contents,
                        generation_config: CHAT_CONFIG,
                    },
                    CHAT_FALLBACK,
                )
            }
            GenerationRequest::Vision { data, mime_type } => (
                GenerateContentRequest {
                    contents: vec![Content::user(vec![
                        Part::InlineData {
                            inline_data: InlineData { mime_type, data },
                        },
                        Part::text(VISION_PROMPT),
                    ])],
                    generation_config: VISION_CONFIG,
                },
                VISION_FALLBACK,
            ),
            GenerationRequest::Content(content) => (
                GenerateContentRequest {
                    contents: vec![Content::user(vec![Part::text(content_prompt(&content))])],
                    generation_config: CONTENT_CONFIG,
                },
                CONTENT_FALLBACK,
            ),
        }
    }

    /// Send a `generateContent` call and return the concatenated reply text.
    async fn send(&self, body: &GenerateContentRequest) -> Result<String, GatewayError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GatewayError::MissingApiKey)?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        debug!("Sending generateContent request with {} turns", body.contents.len());

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    GatewayError::Connect(self.config.base_url.clone())
                } else {
                    GatewayError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(extract_text(&parsed))
    }
}

/// Earlier turns in Gemini's role vocabulary.
fn history_contents(history: &[ChatMessage]) -> Vec<Content> {
    history
        .iter()
        .map(|message| Content {
            role: Some(
                match message.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "model",
                }
                .to_string(),
            ),
            parts: vec![Part::text(message.content.clone())],
        })
        .collect()
}

/// Text of the first candidate, all text parts joined.
fn extract_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| match part {
                    Part::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[async_trait]
impl AiGateway for GeminiGateway {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GatewayError> {
        let (body, fallback) = Self::build_request(request);
        let text = self.send(&body).await?;

        if text.trim().is_empty() {
            debug!("Empty reply from model, using fallback text");
            Ok(fallback.to_string())
        } else {
            Ok(text)
        }
    }

    async fn health_check(&self) -> Result<GatewayHealth, GatewayError> {
        let body = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(HEALTH_PROMPT)])],
            generation_config: HEALTH_CONFIG,
        };
        let text = self.send(&body).await?;

        Ok(GatewayHealth {
            status: if text.trim().is_empty() {
                "error"
            } else {
                "connected"
            }
            .to_string(),
            model: self.config.model.clone(),
        })
    }
}
