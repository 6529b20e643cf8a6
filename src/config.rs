//! Configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation and type safety

use crate::file_discovery::FileDiscovery;
use crate::parser::DEFAULT_MAX_LINE_BYTES;
use crate::pricing::PricingRate;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const LOG_FORMATS: &[&str] = &["pretty", "json"];
const LOG_OUTPUTS: &[&str] = &["console", "file", "both"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Log ingestion configuration
    pub ingest: IngestConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Paths configuration
    pub paths: PathsConfig,

    /// Per-model rates layered over the built-in pricing table
    pub pricing: HashMap<String, PricingRate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub file_extension: String,
    pub max_line_bytes: usize,
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json_pretty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Log root; `~/.claude/projects` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects_dir: Option<PathBuf>,
    pub log_directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            file_extension: "jsonl".to_string(),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            parallel: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { json_pretty: true }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            projects_dir: None,
            log_directory: PathBuf::from("logs"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            ingest: IngestConfig::default(),
            output: OutputConfig::default(),
            paths: PathsConfig::default(),
            pricing: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, the first config file found, and environment
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        let config_paths = [
            PathBuf::from("usage-ledger.toml"),
            PathBuf::from(".usage-ledger.toml"),
            dirs::config_dir()
                .map(|d| d.join("usage-ledger").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // Ingest overrides
        if let Ok(val) = env::var("USAGE_LEDGER_MAX_LINE_BYTES") {
            self.ingest.max_line_bytes = val
                .parse()
                .context("Invalid USAGE_LEDGER_MAX_LINE_BYTES")?;
        }
        if let Ok(val) = env::var("USAGE_LEDGER_PARALLEL") {
            self.ingest.parallel = val.parse().context("Invalid USAGE_LEDGER_PARALLEL")?;
        }

        // Output overrides
        if let Ok(val) = env::var("USAGE_LEDGER_JSON_PRETTY") {
            self.output.json_pretty = val.parse().context("Invalid USAGE_LEDGER_JSON_PRETTY")?;
        }

        // Path overrides
        if let Ok(val) = env::var("CLAUDE_PROJECTS_DIR") {
            self.paths.projects_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = env::var("USAGE_LEDGER_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.ingest.max_line_bytes < DEFAULT_MAX_LINE_BYTES {
            return Err(anyhow::anyhow!(
                "Maximum line length must be at least {} bytes, got {}",
                DEFAULT_MAX_LINE_BYTES,
                self.ingest.max_line_bytes
            ));
        }

        if self.ingest.file_extension.trim_start_matches('.').is_empty() {
            return Err(anyhow::anyhow!("Log file extension cannot be empty"));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown log format '{}', expected one of {:?}",
                self.logging.format,
                LOG_FORMATS
            ));
        }

        if !LOG_OUTPUTS.contains(&self.logging.output.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown log output '{}', expected one of {:?}",
                self.logging.output,
                LOG_OUTPUTS
            ));
        }

        for (model, rate) in &self.pricing {
            if !rate.is_valid() {
                return Err(anyhow::anyhow!(
                    "Pricing for '{}' must use finite, non-negative rates",
                    model
                ));
            }
        }

        Ok(())
    }

    /// Resolved log root: the configured directory or `~/.claude/projects`.
    pub fn projects_dir(&self) -> Result<PathBuf> {
        match &self.paths.projects_dir {
            Some(dir) => Ok(dir.clone()),
            None => FileDiscovery::default_projects_dir(),
        }
    }

    /// Settings that are valid but will not take effect in this build.
    /// Reported by the caller once logging is up.
    pub fn notices(&self) -> Vec<String> {
        let mut notices = Vec::new();
        if self.ingest.parallel && !cfg!(feature = "parallel") {
            notices.push(
                "Parallel ingestion requested but the `parallel` feature is not enabled".to_string(),
            );
        }
        notices
    }

    /// Save current configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}
