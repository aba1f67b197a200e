//! Generative-AI gateway.
//!
//! Handlers talk to the model provider only through [`AiGateway`]; the
//! Gemini REST client in [`gemini`] is the production implementation.

pub mod gemini;
pub mod prompts;

pub use gemini::{GeminiConfig, GeminiGateway};

use crate::models::{ChatMessage, Feature, ProjectType};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Errors from the model provider.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("no Gemini API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to Gemini at {0}")]
    Connect(String),

    #[error("Gemini API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid response from Gemini: {0}")]
    InvalidResponse(String),

    #[error("failed to send request: {0}")]
    Request(String),
}

impl GatewayError {
    /// Whether the provider could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            GatewayError::MissingApiKey | GatewayError::Timeout(_) | GatewayError::Connect(_)
        )
    }
}

/// Requested length of generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ContentLength {
    /// Target word range for the prompt.
    pub fn word_range(&self) -> &'static str {
        match self {
            ContentLength::Short => "100-300",
            ContentLength::Medium => "300-600",
            ContentLength::Long => "600-1000",
        }
    }
}

impl From<&str> for ContentLength {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "short" => ContentLength::Short,
            "long" => ContentLength::Long,
            _ => ContentLength::Medium,
        }
    }
}

/// Parameters for content generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRequest {
    pub topic: String,
    pub tone: String,
    pub length: ContentLength,
    pub content_type: ProjectType,
    pub instructions: Option<String>,
}

/// One unit of work for the model.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    /// Continue a conversation. `history` holds the earlier turns.
    Chat {
        history: Vec<ChatMessage>,
        message: String,
    },
    /// Describe an image. `data` is base64.
    Vision { data: String, mime_type: String },
    Content(ContentRequest),
}

impl GenerationRequest {
    /// Analytics feature this request counts towards.
    pub fn feature(&self) -> Feature {
        match self {
            GenerationRequest::Chat { .. } => Feature::Chat,
            GenerationRequest::Vision { .. } => Feature::Vision,
            GenerationRequest::Content(_) => Feature::Content,
        }
    }
}

/// Result of a connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayHealth {
    pub status: String,
    pub model: String,
}

/// Text-in/text-out and image-in/text-out access to a generative model.
#[async_trait]
pub trait AiGateway: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GatewayError>;

    async fn health_check(&self) -> Result<GatewayHealth, GatewayError>;
}

pub type SharedGateway = Arc<dyn AiGateway>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_length_from_str() {
        assert_eq!(ContentLength::from("short"), ContentLength::Short);
        assert_eq!(ContentLength::from("LONG"), ContentLength::Long);
        assert_eq!(ContentLength::from("whatever"), ContentLength::Medium);
        assert_eq!(ContentLength::Medium.word_range(), "300-600");
    }

    #[test]
    fn test_request_feature() {
        let chat = GenerationRequest::Chat {
            history: vec![],
            message: "hi".to_string(),
        };
        let vision = GenerationRequest::Vision {
            data: String::new(),
            mime_type: "image/png".to_string(),
        };

        assert_eq!(chat.feature(), Feature::Chat);
        assert_eq!(vision.feature(), Feature::Vision);
    }

    #[test]
    fn test_unavailable_errors() {
        assert!(GatewayError::MissingApiKey.is_unavailable());
        assert!(GatewayError::Timeout(5).is_unavailable());
        assert!(!GatewayError::Api {
            status: 400,
            message: "bad".to_string()
        }
        .is_unavailable());
    }
}
