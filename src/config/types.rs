//! Configuration types.

use serde::{Deserialize, Serialize};

use crate::cli::DEFAULT_BINARY;

/// Stop sequences sent when the caller does not supply any.
pub const DEFAULT_STOP_SEQUENCES: [&str; 6] = [
    "Context:",
    "Question:",
    "\nContext:",
    "\nAnswer:",
    "\nQuestion:",
    "Answer:",
];

/// Settings for the ai-services CLI tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiServicesConfig {
    /// Path to the ai-services binary.
    #[serde(default = "default_binary_path")]
    pub binary_path: String,
}

fn default_binary_path() -> String {
    DEFAULT_BINARY.to_string()
}

impl Default for AiServicesConfig {
    fn default() -> Self {
        Self {
            binary_path: default_binary_path(),
        }
    }
}

/// Settings for the chat completions tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatConfig {
    /// Base URL of the chat completions API.
    #[serde(default = "default_api_url")]
    pub base_url: String,
    /// Model requested when the caller does not name one.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f64,
    #[serde(default = "default_stop")]
    pub stop: Vec<String>,
    /// Overall request timeout, covering the whole streamed response.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_model() -> String {
    "ibm-granite/granite-3.3-8b-instruct".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_repetition_penalty() -> f64 {
    1.1
}

fn default_stop() -> Vec<String> {
    DEFAULT_STOP_SEQUENCES.iter().map(|s| (*s).to_string()).collect()
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            repetition_penalty: default_repetition_penalty(),
            stop: default_stop(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Settings for the reference document tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceConfig {
    /// Base URL of the reference API.
    #[serde(default = "default_api_url")]
    pub base_url: String,
    #[serde(default = "default_num_chunks_post_rrf")]
    pub num_chunks_post_rrf: u32,
    #[serde(default = "default_num_docs_reranker")]
    pub num_docs_reranker: u32,
    #[serde(default = "default_use_reranker")]
    pub use_reranker: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_num_chunks_post_rrf() -> u32 {
    10
}

fn default_num_docs_reranker() -> u32 {
    3
}

fn default_use_reranker() -> bool {
    true
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            num_chunks_post_rrf: default_num_chunks_post_rrf(),
            num_docs_reranker: default_num_docs_reranker(),
            use_reranker: default_use_reranker(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Settings for the HTTP transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// Port override; each server kind has its own default.
    #[serde(default)]
    pub port: Option<u16>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub ai_services: AiServicesConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub server: ServerConfig,
}
