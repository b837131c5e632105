//! Chat completions client.

use std::io;
use std::time::Duration;

use futures_util::TryStreamExt;
use reqwest::Client;
use serde_json::Value;
use tokio_util::io::StreamReader;

use crate::config::ChatConfig;
use crate::error::ToolError;
use crate::http::{build_http_client, endpoint, ensure_success, read_json};

use super::stream::collect_fragments;
use super::types::{ChatRequest, CompletionOptions};

/// Path of the chat completions endpoint below the base URL.
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Client for an OpenAI-style chat completions API.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    url: String,
    config: ChatConfig,
}

impl ChatClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::UpstreamRequest` if the HTTP client cannot be built.
    pub fn new(config: ChatConfig) -> Result<Self, ToolError> {
        let client = build_http_client(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self {
            client,
            url: endpoint(&config.base_url, CHAT_COMPLETIONS_PATH),
            config,
        })
    }

    /// The configured defaults.
    #[must_use]
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Send `user_input` as a single user message and return the completion text.
    ///
    /// Streaming (the default) concatenates every delta in arrival order.
    /// Non-streaming returns `choices[0].message.content`, or the whole
    /// response pretty-printed when it has no choices.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Validation` for empty input, `ToolError::UpstreamHttp`
    /// for a non-2xx status and `ToolError::UpstreamRequest` for transport
    /// failures, including a streamed body that exceeds the request timeout.
    /// No partial text is returned on error. A stream the server closes early
    /// yields the text received up to that point.
    pub async fn complete(
        &self,
        user_input: &str,
        options: CompletionOptions,
    ) -> Result<String, ToolError> {
        if user_input.is_empty() {
            return Err(ToolError::validation("user_input cannot be empty"));
        }

        let request = ChatRequest::new(user_input, &self.config, options);
        tracing::debug!(
            url = %self.url,
            model = %request.model,
            stream = request.stream,
            "Sending chat completion request"
        );

        if request.stream {
            self.complete_streaming(&request).await
        } else {
            self.complete_once(&request).await
        }
    }

    async fn complete_streaming(&self, request: &ChatRequest) -> Result<String, ToolError> {
        let response = self.client.post(&self.url).json(request).send().await?;
        let response = ensure_success(response).await?;

        let body = response.bytes_stream().map_err(|e| {
            let kind = if e.is_timeout() {
                io::ErrorKind::TimedOut
            } else {
                io::ErrorKind::Other
            };
            io::Error::new(kind, e)
        });
        let text = collect_fragments(StreamReader::new(Box::pin(body)))
            .await
            .map_err(stream_read_error)?;

        tracing::debug!(chars = text.len(), "Streamed completion finished");
        Ok(text)
    }

    async fn complete_once(&self, request: &ChatRequest) -> Result<String, ToolError> {
        let response = self.client.post(&self.url).json(request).send().await?;
        let response = ensure_success(response).await?;
        let body = read_json(response).await?;
        Ok(extract_message_content(&body))
    }
}

/// Recover the transport error wrapped by the body reader.
fn stream_read_error(err: io::Error) -> ToolError {
    let message = err.to_string();
    match err
        .into_inner()
        .and_then(|inner| inner.downcast::<reqwest::Error>().ok())
    {
        Some(source) => ToolError::UpstreamRequest(*source),
        None => ToolError::InvalidResponse(format!("Event stream read failed: {message}")),
    }
}

/// `choices[0].message.content` of a non-streaming response.
///
/// A first choice without string content yields an empty string. A body
/// without any choices is returned pretty-printed so the caller still gets
/// something to inspect.
#[must_use]
pub fn extract_message_content(body: &Value) -> String {
    match body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
    {
        Some(choice) => choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        None => serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string()),
    }
}
