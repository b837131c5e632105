//! Configuration file loader and environment overrides.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::AppConfig;

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".ai-services-mcp.toml";

/// Configuration loader that searches multiple locations.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Search paths in order of priority.
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default search paths.
    #[must_use]
    pub fn new() -> Self {
        let mut search_paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];

        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("ai-services-mcp").join("config.toml"));
        }

        Self { search_paths }
    }

    /// Create a config loader with a specific config file path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            search_paths: vec![path],
        }
    }

    /// Load configuration from the first available file, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        match self.find_config_file() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                Self::load_from_path(&path)
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(AppConfig::default())
            }
        }
    }

    /// Load the file configuration, then apply process environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is invalid, an environment variable holds
    /// an unparseable value, or a base URL is malformed.
    pub fn load_with_env(&self) -> Result<AppConfig, ConfigError> {
        let mut config = self.load()?;
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the search paths for debugging.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find the first config file that exists.
    #[must_use]
    pub fn find_config_file(&self) -> Option<PathBuf> {
        self.search_paths.iter().find(|p| p.exists()).cloned()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    /// Override settings from environment variables.
    ///
    /// `lookup` returns the value of a variable, if set. Unset variables
    /// leave the current value untouched.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnv` when a numeric variable does not parse.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("AI_SERVICES_CLI_PATH") {
            self.ai_services.binary_path = v;
        }

        if let Some(v) = lookup("CHAT_API_URL") {
            self.chat.base_url = v;
        }
        if let Some(v) = lookup("DEFAULT_MODEL") {
            self.chat.model = v;
        }
        if let Some(v) = parse_env(&lookup, "DEFAULT_MAX_TOKENS")? {
            self.chat.max_tokens = v;
        }
        if let Some(v) = parse_env(&lookup, "DEFAULT_TEMPERATURE")? {
            self.chat.temperature = v;
        }
        if let Some(v) = parse_env(&lookup, "DEFAULT_REPETITION_PENALTY")? {
            self.chat.repetition_penalty = v;
        }

        if let Some(v) = lookup("REFERENCE_API_URL") {
            self.reference.base_url = v;
        }
        if let Some(v) = parse_env(&lookup, "DEFAULT_NUM_CHUNKS_POST_RRF")? {
            self.reference.num_chunks_post_rrf = v;
        }
        if let Some(v) = parse_env(&lookup, "DEFAULT_NUM_DOCS_RERANKER")? {
            self.reference.num_docs_reranker = v;
        }
        if let Some(v) = lookup("DEFAULT_USE_RERANKER") {
            self.reference.use_reranker = v.trim().eq_ignore_ascii_case("true");
        }

        if let Some(v) = parse_env(&lookup, "SERVER_PORT")? {
            self.server.port = Some(v);
        }

        Ok(())
    }

    /// Check that the API base URLs are absolute URLs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` naming the offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("chat.base_url", &self.chat.base_url),
            ("reference.base_url", &self.reference.base_url),
        ] {
            url::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
                key,
                value: value.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}

fn parse_env<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name)
        .map(|raw| {
            raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name,
                value: raw.clone(),
            })
        })
        .transpose()
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Invalid URL for {key}: {value:?} ({source})")]
    InvalidUrl {
        key: &'static str,
        value: String,
        source: url::ParseError,
    },
}
