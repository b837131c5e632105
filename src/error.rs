//! Error taxonomy shared by every tool.
//!
//! Structural and transport failures are errors. Surprises in the shape of
//! CLI text or streamed JSON are not: the parsers degrade to defaults instead.

use crate::cli::SpawnError;

/// Errors surfaced to the caller of a tool.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// The external program could not be started.
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: SpawnError,
    },

    /// The external program ran but exited with a non-zero code.
    #[error(
        "{command} exited with code {code}. stdout: {}; stderr: {}",
        or_empty(.stdout),
        or_empty(.stderr)
    )]
    NonZeroExit {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    /// The remote API answered with a non-2xx status.
    #[error("HTTP error {status}: {body}")]
    UpstreamHttp { status: u16, body: String },

    /// Connection, timeout or other transport failure talking to the remote API.
    #[error("Request error: {0}")]
    UpstreamRequest(#[from] reqwest::Error),

    /// A 2xx response whose body could not be decoded.
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// A required argument was empty, absent or malformed.
    #[error("{0}")]
    Validation(String),
}

impl ToolError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

fn or_empty(s: &str) -> &str {
    if s.is_empty() {
        "<empty>"
    } else {
        s
    }
}
