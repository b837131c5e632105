//! Shared HTTP client plumbing for the remote API tools.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::ToolError;

/// Connection timeout for HTTP requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build an HTTP client with the given overall request timeout.
///
/// The timeout covers reading the whole body, so for streamed completions it
/// has to allow for slow model inference.
///
/// # Errors
///
/// Returns `ToolError::UpstreamRequest` if the TLS backend cannot be initialised.
pub fn build_http_client(request_timeout: Duration) -> Result<Client, ToolError> {
    Ok(Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(request_timeout)
        .build()?)
}

/// Join an API path onto a configured base URL.
#[must_use]
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// Pass 2xx responses through; turn anything else into `ToolError::UpstreamHttp`.
///
/// # Errors
///
/// Returns `ToolError::UpstreamHttp` with the status and response body.
pub async fn ensure_success(response: Response) -> Result<Response, ToolError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read error response body");
            String::new()
        }
    };
    tracing::warn!(status = status.as_u16(), "Upstream API returned an error status");
    Err(ToolError::UpstreamHttp {
        status: status.as_u16(),
        body,
    })
}

/// Read a JSON body, reporting undecodable bodies as `ToolError::InvalidResponse`.
///
/// # Errors
///
/// Returns `ToolError::UpstreamRequest` if the body cannot be read and
/// `ToolError::InvalidResponse` if it is not JSON.
pub async fn read_json(response: Response) -> Result<serde_json::Value, ToolError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ToolError::InvalidResponse(e.to_string()))
}
