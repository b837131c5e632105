//! Typed access to the ai-services CLI.

use crate::error::ToolError;

use super::parse::{parse_images, parse_templates, parse_version, ImageList, TemplateList, VersionInfo};
use super::process::{CommandRunner, ProcessRunner};

/// Default binary name, resolved through `PATH`.
pub const DEFAULT_BINARY: &str = "ai-services";

/// Client for the ai-services CLI.
///
/// Each call spawns one process through the runner, checks the exit code and
/// hands the combined output to exactly one parser.
#[derive(Debug, Clone)]
pub struct AiServicesCli<R = ProcessRunner> {
    binary: String,
    runner: R,
}

impl AiServicesCli<ProcessRunner> {
    /// Create a client for the given binary path.
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self::with_runner(binary, ProcessRunner)
    }
}

impl<R: CommandRunner> AiServicesCli<R> {
    /// Create a client that executes commands through `runner`.
    #[must_use]
    pub fn with_runner(binary: impl Into<String>, runner: R) -> Self {
        Self {
            binary: binary.into(),
            runner,
        }
    }

    /// The configured binary path.
    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Run `version` and parse its output.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Validation` if no binary is configured,
    /// `ToolError::Launch` if it cannot be started and
    /// `ToolError::NonZeroExit` if it fails.
    pub async fn version(&self) -> Result<VersionInfo, ToolError> {
        let output = self.run_checked(&["version"]).await?;
        Ok(parse_version(&output))
    }

    /// Run `application templates` and parse the template names.
    ///
    /// # Errors
    ///
    /// Same as [`AiServicesCli::version`].
    pub async fn templates(&self) -> Result<TemplateList, ToolError> {
        let output = self.run_checked(&["application", "templates"]).await?;
        Ok(parse_templates(&output))
    }

    /// Run `application image list --template <template>` and parse the images.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Validation` for an empty template name before any
    /// process is spawned; otherwise the same as [`AiServicesCli::version`].
    pub async fn template_images(&self, template: &str) -> Result<ImageList, ToolError> {
        if template.is_empty() {
            return Err(ToolError::validation(
                "template_name is required and cannot be empty",
            ));
        }
        let output = self
            .run_checked(&["application", "image", "list", "--template", template])
            .await?;
        Ok(parse_images(template, &output))
    }

    /// Run a subcommand and return its combined output if it exited cleanly.
    async fn run_checked(&self, args: &[&str]) -> Result<String, ToolError> {
        if self.binary.is_empty() {
            return Err(ToolError::validation(
                "No ai-services binary specified. \
                 Set AI_SERVICES_CLI_PATH or pass binary_path explicitly.",
            ));
        }

        let result = self.runner.run(&self.binary, args).await?;
        if !result.success() {
            tracing::warn!(
                binary = %self.binary,
                args = ?args,
                exit_code = result.exit_code,
                "ai-services command failed"
            );
            return Err(ToolError::NonZeroExit {
                command: format!("{} {}", self.binary, args.join(" ")),
                code: result.exit_code,
                stdout: result.stdout.trim().to_string(),
                stderr: result.stderr.trim().to_string(),
            });
        }

        Ok(result.combined_output())
    }
}
