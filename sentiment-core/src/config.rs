//! Bootstrap configuration loading
//!
//! Configuration is read once at startup and cannot change while running.
//!
//! # Sources, highest priority first
//!
//! 1. Command-line arguments (applied through [`ConfigOverrides`])
//! 2. Environment variables (bound to the same arguments by the binary)
//! 3. TOML configuration file
//! 4. Built-in defaults
//!
//! The TOML file is located via [`resolve_config_path`]: explicit path, then
//! the `SENTIMENT_CONFIG` environment variable, then the platform config
//! directory. A missing file is not an error; defaults are used instead.

use crate::text::Language;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "SENTIMENT_CONFIG";

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "review-sentiment";

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    pub analysis: AnalysisConfig,
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; `"*"` allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_origins: vec![
                "http://localhost:5000".to_string(),
                "http://127.0.0.1:5000".to_string(),
            ],
        }
    }
}

/// Artifact file locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub vectorizer_path: PathBuf,
    pub model_path: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            vectorizer_path: PathBuf::from("data/models/vectorizer.json"),
            model_path: PathBuf::from("data/models/sentiment_model.json"),
        }
    }
}

/// Pipeline behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Stopword language (only "english" is supported)
    pub language: String,
    /// Process batch items on the rayon pool instead of sequentially
    pub parallel_batch: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            language: Language::default().as_str().to_string(),
            parallel_batch: true,
        }
    }
}

impl AnalysisConfig {
    pub fn language(&self) -> Result<Language> {
        self.language.parse()
    }
}

/// Request size limits enforced by the API layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum characters per text
    pub max_text_length: usize,
    /// Maximum texts per batch request
    pub max_batch_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_text_length: 5000,
            max_batch_size: 100,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Values supplied on the command line or through bound environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub vectorizer_path: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl ServiceConfig {
    /// Parse a TOML config file.
    ///
    /// Relative artifact paths are resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut config: ServiceConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        if let Some(base) = path.parent() {
            config.artifacts.vectorizer_path = rebase(base, &config.artifacts.vectorizer_path);
            config.artifacts.model_path = rebase(base, &config.artifacts.model_path);
        }

        Ok(config)
    }

    /// Load configuration from the resolved file, or defaults if none exists.
    ///
    /// An explicitly named file (argument or environment variable) must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit.is_some() || std::env::var_os(CONFIG_ENV_VAR).is_some();

        match resolve_config_path(explicit) {
            Some(path) if path.is_file() => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            Some(path) if named => Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            ))),
            _ => {
                warn!("No configuration file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply command-line / environment overrides on top of file values
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(path) = overrides.vectorizer_path {
            self.artifacts.vectorizer_path = path;
        }
        if let Some(path) = overrides.model_path {
            self.artifacts.model_path = path;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<()> {
        self.analysis.language()?;

        if self.limits.max_text_length == 0 {
            return Err(Error::Config("limits.max_text_length must be positive".to_string()));
        }
        if self.limits.max_batch_size == 0 {
            return Err(Error::Config("limits.max_batch_size must be positive".to_string()));
        }
        if self.server.host.trim().is_empty() {
            return Err(Error::Config("server.host must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Locate the config file: explicit path, then `SENTIMENT_CONFIG`, then the
/// first existing platform default.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    default_config_candidates().into_iter().find(|p| p.is_file())
}

/// Platform config file locations, in search order
pub fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join(CONFIG_DIR_NAME).join("config.toml"));
    }

    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc").join(CONFIG_DIR_NAME).join("config.toml"));
    }

    candidates
}

fn rebase(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}
