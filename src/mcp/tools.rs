//! Tools exposed over MCP.
//!
//! Each tool deserializes its JSON arguments, calls one client and returns
//! the result as JSON. Argument problems are `ToolError::Validation`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::chat::{ChatClient, CompletionOptions};
use crate::cli::AiServicesCli;
use crate::config::AppConfig;
use crate::error::ToolError;
use crate::reference::{ReferenceClient, ReferenceQuery};

/// A remotely callable operation.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// JSON schema of the arguments object.
    fn schema(&self) -> Value;
    async fn call(&self, args: Value) -> Result<Value, ToolError>;
}

/// Deserialize tool arguments; a missing arguments object counts as `{}`.
fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| ToolError::validation(format!("Invalid arguments: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::InvalidResponse(e.to_string()))
}

#[derive(Debug, Default, Deserialize)]
struct BinaryArgs {
    #[serde(default)]
    binary_path: Option<String>,
}

/// Tools backed by the ai-services CLI share the configured binary.
#[derive(Debug, Clone)]
struct CliTarget {
    default_binary: String,
}

impl CliTarget {
    /// The binary to run: an explicit non-empty override, else the configured one.
    fn cli(&self, binary_path: Option<String>) -> AiServicesCli {
        let binary = binary_path
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| self.default_binary.clone());
        AiServicesCli::new(binary)
    }
}

fn binary_path_schema() -> Value {
    json!({
        "type": "string",
        "description": "Explicit path to the ai-services binary. Defaults to AI_SERVICES_CLI_PATH or 'ai-services' on PATH."
    })
}

// ==================== ai_services_version ====================

/// Version information from the ai-services CLI.
pub struct VersionTool {
    target: CliTarget,
}

impl VersionTool {
    #[must_use]
    pub fn new(default_binary: impl Into<String>) -> Self {
        Self {
            target: CliTarget {
                default_binary: default_binary.into(),
            },
        }
    }
}

#[async_trait]
impl Tool for VersionTool {
    fn name(&self) -> &'static str {
        "ai_services_version"
    }

    fn description(&self) -> &'static str {
        "Get version information (version, git commit, build date) from the ai-services CLI."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "binary_path": binary_path_schema() }
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let args: BinaryArgs = parse_args(args)?;
        let info = self.target.cli(args.binary_path).version().await?;
        to_json(&info)
    }
}

// ==================== ai_services_templates_info ====================

/// Application templates known to the ai-services CLI.
pub struct TemplatesInfoTool {
    target: CliTarget,
}

impl TemplatesInfoTool {
    #[must_use]
    pub fn new(default_binary: impl Into<String>) -> Self {
        Self {
            target: CliTarget {
                default_binary: default_binary.into(),
            },
        }
    }
}

#[async_trait]
impl Tool for TemplatesInfoTool {
    fn name(&self) -> &'static str {
        "ai_services_templates_info"
    }

    fn description(&self) -> &'static str {
        "List the application templates available in the ai-services CLI."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "binary_path": binary_path_schema() }
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let args: BinaryArgs = parse_args(args)?;
        let list = self.target.cli(args.binary_path).templates().await?;
        to_json(&list)
    }
}

// ==================== ai_services_template_images ====================

/// Container images used by one application template.
pub struct TemplateImagesTool {
    target: CliTarget,
}

impl TemplateImagesTool {
    #[must_use]
    pub fn new(default_binary: impl Into<String>) -> Self {
        Self {
            target: CliTarget {
                default_binary: default_binary.into(),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TemplateImagesArgs {
    #[serde(default)]
    template_name: String,
    #[serde(default)]
    binary_path: Option<String>,
}

#[async_trait]
impl Tool for TemplateImagesTool {
    fn name(&self) -> &'static str {
        "ai_services_template_images"
    }

    fn description(&self) -> &'static str {
        "List the container images used by an ai-services application template."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "template_name": {"type": "string", "description": "Name of the application template"},
                "binary_path": binary_path_schema()
            },
            "required": ["template_name"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let args: TemplateImagesArgs = parse_args(args)?;
        let list = self
            .target
            .cli(args.binary_path)
            .template_images(&args.template_name)
            .await?;
        to_json(&list)
    }
}

// ==================== chat_completions ====================

/// Single-turn chat completion against the configured model server.
pub struct ChatCompletionsTool {
    client: ChatClient,
}

impl ChatCompletionsTool {
    #[must_use]
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ChatArgs {
    #[serde(default)]
    user_input: String,
    #[serde(flatten)]
    options: CompletionOptions,
}

#[async_trait]
impl Tool for ChatCompletionsTool {
    fn name(&self) -> &'static str {
        "chat_completions"
    }

    fn description(&self) -> &'static str {
        "Send a chat completion request to the AI model and return the completion text. Streams by default."
    }

    fn schema(&self) -> Value {
        let config = self.client.config();
        json!({
            "type": "object",
            "properties": {
                "user_input": {"type": "string", "description": "Text sent as the user message"},
                "model": {"type": "string", "default": config.model},
                "max_tokens": {"type": "integer", "default": config.max_tokens},
                "temperature": {"type": "number", "default": config.temperature},
                "repetition_penalty": {"type": "number", "default": config.repetition_penalty},
                "stop": {"type": "array", "items": {"type": "string"}, "default": config.stop},
                "stream": {"type": "boolean", "default": true}
            },
            "required": ["user_input"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let args: ChatArgs = parse_args(args)?;
        let text = self.client.complete(&args.user_input, args.options).await?;
        Ok(Value::String(text))
    }
}

// ==================== reference_documents ====================

/// Retrieval of reference document chunks for a prompt.
pub struct ReferenceDocumentsTool {
    client: ReferenceClient,
}

impl ReferenceDocumentsTool {
    #[must_use]
    pub fn new(client: ReferenceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ReferenceDocumentsTool {
    fn name(&self) -> &'static str {
        "reference_documents"
    }

    fn description(&self) -> &'static str {
        "Retrieve reference document chunks relevant to a prompt from the knowledge base."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt": {"type": "string", "description": "Question to find relevant documents for"},
                "num_chunks_post_rrf": {"type": "integer", "description": "Chunks kept after Reciprocal Rank Fusion"},
                "num_docs_reranker": {"type": "integer", "description": "Documents returned after reranking"},
                "use_reranker": {"type": "boolean", "description": "Rerank results for relevance"}
            },
            "required": ["prompt"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let query: ReferenceQuery = parse_args(args)?;
        self.client.lookup(query).await
    }
}

// ==================== toolsets ====================

/// Which group of tools a server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerKind {
    AiServices,
    Chat,
    Reference,
    All,
}

impl ServerKind {
    /// Name reported in `initialize`.
    #[must_use]
    pub fn server_name(self) -> &'static str {
        match self {
            Self::AiServices => "ai-services-cli-server",
            Self::Chat => "chat-completions-server",
            Self::Reference => "reference-server",
            Self::All => "ai-services-mcp",
        }
    }

    /// Default HTTP port.
    #[must_use]
    pub fn default_port(self) -> u16 {
        match self {
            Self::Chat => 8000,
            Self::AiServices | Self::All => 8001,
            Self::Reference => 8003,
        }
    }
}

/// The tools served by one server instance.
pub struct Toolset {
    kind: ServerKind,
    tools: Vec<Box<dyn Tool>>,
}

impl Toolset {
    /// Build the tools for `kind` from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::UpstreamRequest` if an HTTP client cannot be built.
    pub fn build(kind: ServerKind, config: &AppConfig) -> Result<Self, ToolError> {
        let mut tools: Vec<Box<dyn Tool>> = Vec::new();

        if matches!(kind, ServerKind::AiServices | ServerKind::All) {
            let binary = &config.ai_services.binary_path;
            tools.push(Box::new(VersionTool::new(binary.clone())));
            tools.push(Box::new(TemplatesInfoTool::new(binary.clone())));
            tools.push(Box::new(TemplateImagesTool::new(binary.clone())));
        }
        if matches!(kind, ServerKind::Chat | ServerKind::All) {
            let client = ChatClient::new(config.chat.clone())?;
            tools.push(Box::new(ChatCompletionsTool::new(client)));
        }
        if matches!(kind, ServerKind::Reference | ServerKind::All) {
            let client = ReferenceClient::new(config.reference.clone())?;
            tools.push(Box::new(ReferenceDocumentsTool::new(client)));
        }

        Ok(Self::from_tools(kind, tools))
    }

    /// Assemble a toolset from ready-made tools.
    #[must_use]
    pub fn from_tools(kind: ServerKind, tools: Vec<Box<dyn Tool>>) -> Self {
        Self { kind, tools }
    }

    #[must_use]
    pub fn kind(&self) -> ServerKind {
        self.kind
    }

    #[must_use]
    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    /// Find tool by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|tool| &**tool)
    }
}
