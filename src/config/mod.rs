//! Configuration for the mutator
//!
//! Loaded from a YAML (`.yml`/`.yaml`) or TOML (`.toml`) file, then
//! overridden by `RGMUT_*` environment variables.

pub mod resolver;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, RulerError};
use crate::model::RulerSource;

pub use resolver::{SourceResolver, StaticSourceResolver};

/// Valid log levels for configuration validation.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Get the default configuration file path
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "rgmut", "rgmut").map(|dirs| dirs.config_dir().join("config.yml"))
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutatorConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub ruler: RulerHttpConfig,

    /// Known rule sources. The Grafana-managed source is always available.
    #[serde(default)]
    pub sources: Vec<RulerSource>,
}

/// HTTP settings for reaching the ruler API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulerHttpConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Per-request timeout
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for RulerHttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            timeout: default_timeout(),
        }
    }
}

impl Default for MutatorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            ruler: RulerHttpConfig::default(),
            sources: Vec::new(),
        }
    }
}

impl MutatorConfig {
    /// Parse a configuration file; the format follows the file extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RulerError::configuration(format!("failed to read {}: {}", path.display(), e))
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            toml::from_str(&content).map_err(|e| {
                RulerError::configuration(format!("invalid TOML in {}: {}", path.display(), e))
            })
        } else {
            serde_yaml::from_str(&content).map_err(|e| {
                RulerError::configuration(format!("invalid YAML in {}: {}", path.display(), e))
            })
        }
    }

    /// Load configuration: explicit path, else the default path if present,
    /// else built-in defaults. Environment overrides and validation always apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(default_path) => {
                    debug!("Loading configuration from {}", default_path.display());
                    Self::from_file(&default_path)?
                }
                None => Self::default(),
            },
        };

        config.merge_env_vars();
        config.validate()?;
        Ok(config)
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_with(|key| std::env::var(key).ok());
    }

    /// Apply `RGMUT_*` overrides using the given variable lookup
    pub fn merge_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("RGMUT_BASE_URL") {
            self.ruler.base_url = base_url;
        }

        if let Some(token) = lookup("RGMUT_API_TOKEN") {
            self.ruler.api_token = Some(token);
        }

        if let Some(log_level) = lookup("RGMUT_LOG_LEVEL") {
            self.log_level = log_level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ruler.base_url.trim().is_empty() {
            return Err(RulerError::configuration("ruler.base_url must not be empty"));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(RulerError::configuration(format!(
                "invalid log_level '{}', expected one of {}",
                self.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for source in &self.sources {
            if !seen.insert(source.name.as_str()) {
                return Err(RulerError::configuration(format!(
                    "duplicate source name '{}'",
                    source.name
                )));
            }
        }

        Ok(())
    }

    /// Resolver over the configured sources
    pub fn resolver(&self) -> StaticSourceResolver {
        StaticSourceResolver::new(self.sources.clone())
    }
}
