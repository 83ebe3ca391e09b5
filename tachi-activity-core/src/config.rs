//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/tachi-activity/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/tachi-activity/` (~/.config/tachi-activity/)
//! - State/Logs: `$XDG_STATE_HOME/tachi-activity/` (~/.local/state/tachi-activity/)

use crate::clump::{ClumpOptions, MERGE_WINDOW};
use crate::error::{Error, Result};
use chrono::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Activity API connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Clumping behaviour
    #[serde(default)]
    pub activity: ActivityConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Activity API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Server root, e.g. `https://kamai.tachi.ac`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Optional API token sent as a bearer header
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            token: None,
        }
    }
}

impl ApiConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(Error::Config("api.base_url must not be empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "api.base_url must be an http(s) URL, got {:?}",
                url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://kamai.tachi.ac".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Clumping configuration
#[derive(Debug, Deserialize)]
pub struct ActivityConfig {
    /// Largest gap in seconds between two scores of one timeline entry
    #[serde(default = "default_merge_window_secs")]
    pub merge_window_secs: i64,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            merge_window_secs: default_merge_window_secs(),
        }
    }
}

impl ActivityConfig {
    pub fn validate(&self) -> Result<()> {
        self.clump_options().map(|_| ())
    }

    /// Clumping options derived from this configuration.
    pub fn clump_options(&self) -> Result<ClumpOptions> {
        ClumpOptions::from_secs(self.merge_window_secs).ok_or_else(|| {
            Error::Config(format!(
                "activity.merge_window_secs must be between 1 and {}, got {}",
                max_merge_window_secs(),
                self.merge_window_secs
            ))
        })
    }
}

fn max_merge_window_secs() -> i64 {
    Duration::MAX.num_seconds()
}

fn default_merge_window_secs() -> i64 {
    MERGE_WINDOW.num_seconds()
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.activity.validate()
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/tachi-activity/config.toml` (~/.config/tachi-activity/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("tachi-activity").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/tachi-activity/` (~/.local/state/tachi-activity/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("tachi-activity")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://kamai.tachi.ac");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.api.token.is_none());
        assert_eq!(config.activity.merge_window_secs, 3600);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[api]
base_url = "https://boku.tachi.ac"
token = "abc123"

[activity]
merge_window_secs = 600

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.api.base_url, "https://boku.tachi.ac");
        assert_eq!(config.api.token.as_deref(), Some("abc123"));
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(
            config.activity.clump_options().unwrap().merge_window,
            Duration::minutes(10)
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_api_config_validation() {
        let config = ApiConfig {
            base_url: "kamai.tachi.ac".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ApiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_window_must_be_positive() {
        let config = ActivityConfig {
            merge_window_secs: 0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_merge_window_is_rejected() {
        let config: Config =
            toml::from_str("[activity]\nmerge_window_secs = 9223372036854775807").unwrap();

        assert!(matches!(config.validate(), Err(Error::Config(_))));
        assert!(matches!(
            config.activity.clump_options(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_largest_merge_window_is_accepted() {
        let config = ActivityConfig {
            merge_window_secs: max_merge_window_secs(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[activity]\nmerge_window_secs = -5\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"http://localhost:8080\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
    }
}
