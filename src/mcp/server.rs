//! MCP transports: newline-delimited stdio and HTTP `POST /mcp`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use super::protocol::{
    handle_message, handle_request, JsonRpcRequest, JsonRpcResponse, PARSE_ERROR,
};
use super::tools::Toolset;

/// Serve newline-delimited JSON-RPC until the reader reaches end of input.
///
/// Blank lines are ignored. A line that is not valid UTF-8 gets a parse error
/// response. Each response is written as one line and flushed.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub async fn serve_lines<R, W>(toolset: &Toolset, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.split(b'\n');
    while let Some(bytes) = lines.next_segment().await? {
        let response = match std::str::from_utf8(&bytes) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_message(toolset, line.trim()).await,
            Err(e) => {
                tracing::warn!(error = %e, "Received message that is not UTF-8");
                Some(JsonRpcResponse::error(
                    serde_json::Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                ))
            }
        };
        let Some(response) = response else {
            continue;
        };

        let mut json = serde_json::to_string(&response)?;
        json.push('\n');
        writer.write_all(json.as_bytes()).await?;
        writer.flush().await?;
    }

    tracing::debug!("Input closed, stopping line transport");
    Ok(())
}

/// Serve over the process's stdin and stdout.
///
/// # Errors
///
/// Returns an error if stdio fails.
pub async fn serve_stdio(toolset: Arc<Toolset>) -> std::io::Result<()> {
    tracing::info!(
        server = toolset.kind().server_name(),
        tools = toolset.tools().len(),
        "Serving MCP over stdio"
    );
    let stdin = BufReader::new(tokio::io::stdin());
    serve_lines(&toolset, stdin, tokio::io::stdout()).await
}

/// HTTP server exposing the toolset at `POST /mcp`.
pub struct McpHttpServer {
    toolset: Arc<Toolset>,
    host: String,
    port: u16,
}

impl McpHttpServer {
    #[must_use]
    pub fn new(toolset: Arc<Toolset>, host: impl Into<String>, port: u16) -> Self {
        Self {
            toolset,
            host: host.into(),
            port,
        }
    }

    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the axum router.
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/mcp", post(post_mcp))
            .with_state(Arc::clone(&self.toolset))
            .layer(TraceLayer::new_for_http())
    }

    /// Run until `cancel` fires, then shut down gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or serve.
    pub async fn run(self, cancel: CancellationToken) -> std::io::Result<()> {
        let addr = self.address();
        let app = self.build_router();

        tracing::info!(
            address = %addr,
            server = self.toolset.kind().server_name(),
            "Serving MCP over HTTP"
        );

        let listener = TcpListener::bind(&addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("MCP server shutting down gracefully");
            })
            .await
    }
}

/// One JSON-RPC message per request body. Notifications get 202 with no body.
async fn post_mcp(State(toolset): State<Arc<Toolset>>, body: String) -> Response {
    let request = match serde_json::from_str::<JsonRpcRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Received unparseable HTTP message");
            let response = JsonRpcResponse::error(
                serde_json::Value::Null,
                PARSE_ERROR,
                format!("Parse error: {e}"),
            );
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    match handle_request(&toolset, request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
