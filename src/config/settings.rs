//! Configuration settings
//!
//! Settings are loaded from a TOML file, environment variables and
//! command-line overrides, in that order of increasing priority.

use crate::types::{Language, Platform};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default service origin
pub const DEFAULT_BASE_URL: &str = "https://f1tv.formula1.com";

/// Default image resizer endpoint
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://f1tv.formula1.com/image-resizer/image";

/// Default signing key set for subscription tokens
pub const DEFAULT_JWKS_URL: &str = "https://api.formula1.com/static/jwks.json";

// Helper functions for serde defaults
fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_image_base_url() -> String {
    DEFAULT_IMAGE_BASE_URL.to_string()
}

fn default_jwks_url() -> String {
    DEFAULT_JWKS_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

/// Main configuration settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Service/session configuration
    #[serde(default)]
    pub client: ClientSettings,
    /// Network configuration
    #[serde(default)]
    pub network: NetworkSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Service and session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Content language
    #[serde(default)]
    pub language: Language,
    /// Playback platform
    #[serde(default)]
    pub platform: Platform,
    /// Service origin
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Image resizer endpoint
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    /// Signing key set used by opt-in token verification
    #[serde(default = "default_jwks_url")]
    pub jwks_url: String,
    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Subscription (ascendon) token
    #[serde(default)]
    pub ascendon: Option<String>,
    /// Whether readiness waits for the configuration snapshot
    #[serde(default = "default_true")]
    pub wait_for_config: bool,
}

/// Network and proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// HTTPS proxy URL
    #[serde(default)]
    pub https_proxy: Option<String>,
    /// HTTP proxy URL
    #[serde(default)]
    pub http_proxy: Option<String>,
    /// All protocols proxy URL
    #[serde(default)]
    pub all_proxy: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            platform: Platform::default(),
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            jwks_url: default_jwks_url(),
            user_agent: None,
            ascendon: None,
            wait_for_config: default_true(),
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            https_proxy: None,
            http_proxy: None,
            all_proxy: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbose: false,
            format: default_log_format(),
        }
    }
}

impl NetworkSettings {
    /// Request timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Connect timeout as a [`Duration`]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::default().merge_with_env()
    }

    /// Load settings from configuration file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config("file", &format!("Failed to read config file: {}", e))
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| {
            crate::Error::config("file", &format!("Failed to parse config file: {}", e))
        })?;

        Ok(settings)
    }

    /// Apply environment variable overrides on top of these settings
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Ok(token) = std::env::var("F1TV_ASCENDON")
            && !token.trim().is_empty()
        {
            self.client.ascendon = Some(token.trim().to_string());
        }

        if let Ok(language) = std::env::var("F1TV_LANGUAGE") {
            self.client.language = language.parse()?;
        }

        if let Ok(platform) = std::env::var("F1TV_PLATFORM") {
            self.client.platform = platform.parse()?;
        }

        if let Ok(base_url) = std::env::var("F1TV_BASE_URL") {
            self.client.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("F1TV_REQUEST_TIMEOUT") {
            self.network.request_timeout = timeout.parse().map_err(|e| {
                crate::Error::config(
                    "F1TV_REQUEST_TIMEOUT",
                    &format!("Invalid timeout: {}", e),
                )
            })?;
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }

        // Proxy settings override only when present
        if let Ok(proxy) = std::env::var("HTTPS_PROXY") {
            self.network.https_proxy = Some(proxy);
        }
        if let Ok(proxy) = std::env::var("HTTP_PROXY") {
            self.network.http_proxy = Some(proxy);
        }
        if let Ok(proxy) = std::env::var("ALL_PROXY") {
            self.network.all_proxy = Some(proxy);
        }

        Ok(self)
    }

    /// Get effective proxy URL based on priority
    pub fn get_proxy_url(&self) -> Option<String> {
        self.network
            .https_proxy
            .as_ref()
            .or(self.network.http_proxy.as_ref())
            .or(self.network.all_proxy.as_ref())
            .cloned()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> crate::Result<()> {
        for (name, value) in [
            ("base_url", &self.client.base_url),
            ("image_base_url", &self.client.image_base_url),
            ("jwks_url", &self.client.jwks_url),
        ] {
            if let Err(e) = url::Url::parse(value) {
                return Err(crate::Error::config(
                    name,
                    &format!("Invalid URL '{}': {}", value, e),
                ));
            }
        }

        if self.network.request_timeout == 0 {
            return Err(crate::Error::config(
                "request_timeout",
                "Invalid request timeout: cannot be 0",
            ));
        }

        if self.network.connect_timeout == 0 {
            return Err(crate::Error::config(
                "connect_timeout",
                "Invalid connect timeout: cannot be 0",
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(crate::Error::config(
                    "log_level",
                    &format!("Invalid log level: {}", self.logging.level),
                ));
            }
        }

        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => {
                return Err(crate::Error::config(
                    "log_format",
                    &format!("Invalid log format: {}", other),
                ));
            }
        }

        for (name, proxy_url) in [
            ("https_proxy", &self.network.https_proxy),
            ("http_proxy", &self.network.http_proxy),
            ("all_proxy", &self.network.all_proxy),
        ] {
            if let Some(url_str) = proxy_url
                && let Err(e) = url::Url::parse(url_str)
            {
                return Err(crate::Error::config(
                    name,
                    &format!("Invalid proxy URL '{}': {}", url_str, e),
                ));
            }
        }

        Ok(())
    }
}
