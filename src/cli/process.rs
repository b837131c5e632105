//! External process execution.
//!
//! Runs a program with arguments, no stdin, and captures both output streams
//! as text. Parsing is left to the callers.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::ToolError;

/// Error type for process spawning operations.
#[derive(thiserror::Error, Debug)]
pub enum SpawnError {
    /// The binary was not found.
    #[error("binary not found")]
    NotFound,
    /// Permission denied when spawning.
    #[error("permission denied")]
    PermissionDenied,
    /// Other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpawnError {
    /// Create a `SpawnError` from an I/O error, classifying common cases.
    fn from_io(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io(err),
        }
    }
}

/// Captured output of one finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, or `-1` when the process was terminated by a signal.
    pub exit_code: i32,
}

impl CommandResult {
    /// Whether the process exited with code zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Trimmed stdout and stderr joined by a newline, empty streams dropped.
    #[must_use]
    pub fn combined_output(&self) -> String {
        [self.stdout.trim(), self.stderr.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Something that can run a program to completion.
///
/// A non-zero exit code is not an error at this level; it is reported in
/// the returned [`CommandResult`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and wait for it to exit.
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, ToolError>;
}

/// Runs programs as child processes of this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, ToolError> {
        tracing::debug!(program = %program, args = ?args, "Running command");

        // kill_on_drop reaps the child if the awaiting future is cancelled.
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ToolError::Launch {
                program: program.to_string(),
                source: SpawnError::from_io(e),
            })?;

        let result = CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        };

        tracing::debug!(program = %program, exit_code = result.exit_code, "Command finished");
        Ok(result)
    }
}
