//! Chat completion request payloads.

use serde::{Deserialize, Serialize};

use crate::config::ChatConfig;

/// One message of a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// A user-role message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of `POST /v1/chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub repetition_penalty: f64,
    pub stop: Vec<String>,
    pub stream: bool,
}

/// Per-call overrides of the configured completion parameters.
///
/// Unset fields take the value from [`ChatConfig`]; `stream` defaults to true.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub repetition_penalty: Option<f64>,
    #[serde(default)]
    pub stop: Option<Vec<String>>,
    #[serde(default)]
    pub stream: Option<bool>,
}

impl ChatRequest {
    /// Build a single-user-message request from configuration and overrides.
    #[must_use]
    pub fn new(user_input: &str, config: &ChatConfig, options: CompletionOptions) -> Self {
        Self {
            messages: vec![ChatMessage::user(user_input)],
            model: options.model.unwrap_or_else(|| config.model.clone()),
            max_tokens: options.max_tokens.unwrap_or(config.max_tokens),
            temperature: options.temperature.unwrap_or(config.temperature),
            repetition_penalty: options
                .repetition_penalty
                .unwrap_or(config.repetition_penalty),
            stop: options.stop.unwrap_or_else(|| config.stop.clone()),
            stream: options.stream.unwrap_or(true),
        }
    }
}
