//! Reference document lookup.
//!
//! Forwards a retrieval request and returns the backend's JSON unchanged.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ReferenceConfig;
use crate::error::ToolError;
use crate::http::{build_http_client, endpoint, ensure_success, read_json};

/// Path of the reference endpoint below the base URL.
pub const REFERENCE_PATH: &str = "/reference";

/// A lookup request; unset tuning parameters take configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceQuery {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub num_chunks_post_rrf: Option<u32>,
    #[serde(default)]
    pub num_docs_reranker: Option<u32>,
    #[serde(default)]
    pub use_reranker: Option<bool>,
}

/// Body of `POST /reference`. Every key is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceRequest {
    pub prompt: String,
    pub num_chunks_post_rrf: u32,
    pub num_docs_reranker: u32,
    pub use_reranker: bool,
}

impl ReferenceRequest {
    /// Fill unset query parameters from configuration.
    #[must_use]
    pub fn new(query: ReferenceQuery, config: &ReferenceConfig) -> Self {
        Self {
            prompt: query.prompt,
            num_chunks_post_rrf: query
                .num_chunks_post_rrf
                .unwrap_or(config.num_chunks_post_rrf),
            num_docs_reranker: query.num_docs_reranker.unwrap_or(config.num_docs_reranker),
            use_reranker: query.use_reranker.unwrap_or(config.use_reranker),
        }
    }
}

/// Client for the reference documents API.
#[derive(Debug, Clone)]
pub struct ReferenceClient {
    client: Client,
    url: String,
    config: ReferenceConfig,
}

impl ReferenceClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::UpstreamRequest` if the HTTP client cannot be built.
    pub fn new(config: ReferenceConfig) -> Result<Self, ToolError> {
        let client = build_http_client(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self {
            client,
            url: endpoint(&config.base_url, REFERENCE_PATH),
            config,
        })
    }

    /// Look up reference documents for a prompt.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Validation` for an empty prompt,
    /// `ToolError::UpstreamHttp` for a non-2xx status,
    /// `ToolError::UpstreamRequest` for transport failures and
    /// `ToolError::InvalidResponse` when the body is not JSON.
    pub async fn lookup(&self, query: ReferenceQuery) -> Result<Value, ToolError> {
        if query.prompt.is_empty() {
            return Err(ToolError::validation("prompt cannot be empty"));
        }

        let request = ReferenceRequest::new(query, &self.config);
        tracing::debug!(
            url = %self.url,
            num_chunks_post_rrf = request.num_chunks_post_rrf,
            num_docs_reranker = request.num_docs_reranker,
            use_reranker = request.use_reranker,
            "Sending reference lookup"
        );

        let response = self.client.post(&self.url).json(&request).send().await?;
        let response = ensure_success(response).await?;
        read_json(response).await
    }
}
