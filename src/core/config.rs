//! Configuration management for Plugix.
//!
//! Handles loading configuration from TOML files, applying environment
//! overrides and validating the settings the bridge cannot run without.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default Plugix API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.plugix.ai";

/// Default platform tag sent with every request.
pub const DEFAULT_PLATFORM: &str = "pimcore";

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = ".plugix.toml";

/// Error type for configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("api_key is required (set it in the config file or via PLUGIX_API_KEY)")]
    MissingApiKey,

    #[error("Invalid api_url '{0}': expected an http:// or https:// URL")]
    InvalidApiUrl(String),
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Plugix API key (starts with sk_live_ or sk_test_)
    pub api_key: String,

    /// Plugix API URL
    pub api_url: String,

    /// Platform identifier
    pub platform: String,

    /// Timeout for outbound API requests, in seconds
    pub request_timeout_secs: u64,

    /// Supported languages for translations
    pub languages: Vec<String>,

    /// MCP connection settings
    pub mcp: McpConfig,

    /// Feature toggles for the AI operations
    pub features: FeaturesConfig,

    /// Catalog store settings
    pub catalog: CatalogConfig,
}

/// MCP (Model Context Protocol) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    /// Enable MCP connection
    pub enabled: bool,

    /// Reconnect automatically when the daemon loses the API
    pub auto_connect: bool,

    /// Liveness probe / reconnect interval in milliseconds
    pub reconnect_interval: u64,
}

/// AI feature toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Enable AI product descriptions
    pub product_descriptions: bool,

    /// Enable AI translations
    pub translations: bool,

    /// Enable AI SEO optimization
    pub seo_optimization: bool,
}

/// Catalog store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON file holding products and categories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// Looks for config in:
    /// 1. the explicit `path`, when given
    /// 2. `.plugix.toml` in current directory
    /// 3. `~/.config/plugix/config.toml`
    /// 4. Falls back to defaults
    ///
    /// Environment overrides (including a `.env` file) are applied last.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = match Self::locate(path) {
            Some(file) => Self::load_from_file(&file)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Find the config file to use, if any.
    pub fn locate(path: Option<&Path>) -> Option<PathBuf> {
        if let Some(explicit) = path {
            return Some(explicit.to_path_buf());
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        Self::config_dir().map(|dir| dir.join("config.toml")).filter(|p| p.exists())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `PLUGIX_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Some(key) = env_value("PLUGIX_API_KEY") {
            self.api_key = key;
        }
        if let Some(url) = env_value("PLUGIX_API_URL") {
            self.api_url = url;
        }
        if let Some(platform) = env_value("PLUGIX_PLATFORM") {
            self.platform = platform;
        }
    }

    /// Check the settings required to talk to the API.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(self.api_url.clone()));
        }
        Ok(())
    }

    /// API URL without trailing slashes.
    pub fn normalized_api_url(&self) -> String {
        self.api_url.trim_end_matches('/').to_string()
    }

    /// Outbound request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether `language` is one of the configured translation languages.
    pub fn supports_language(&self, language: &str) -> bool {
        self.languages.iter().any(|l| l.eq_ignore_ascii_case(language))
    }

    /// API key with everything but a short prefix hidden.
    pub fn masked_api_key(&self) -> String {
        if self.api_key.is_empty() {
            return "(not set)".to_string();
        }
        let prefix: String = self.api_key.chars().take(8).collect();
        format!("{prefix}…")
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("plugix"))
    }
}

impl McpConfig {
    /// Reconnect interval as a duration.
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            request_timeout_secs: 30,
            languages: ["en", "de", "fr", "es", "it", "ru"].iter().map(|l| l.to_string()).collect(),
            mcp: McpConfig::default(),
            features: FeaturesConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self { enabled: true, auto_connect: true, reconnect_interval: 5000 }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self { product_descriptions: true, translations: true, seo_optimization: true }
    }
}
