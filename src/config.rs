//! Configuration file parser for ~/.config/feedroll/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, with a warning logged for each one.
use crate::feed::FetchSettings;
use crate::rotator::RotationTiming;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Feed rotated when nothing else is configured.
pub const DEFAULT_FEED_URL: &str = "https://androiddev.social/@svenjacobs.rss";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("HOME environment variable not set")]
    NoHome,
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// RSS feed to rotate. Must be http or https.
    pub feed_url: String,

    /// `id` of the display element in the generated page.
    pub element_id: String,

    /// CSS class that hides (fades out) the display element.
    pub hidden_class: String,

    /// Number of leading feed entries included in the rotation.
    pub max_entries: usize,

    /// Fade-out wait after hiding a visible element.
    pub hide_delay_ms: u64,

    /// Pause before each content swap.
    pub swap_delay_ms: u64,

    /// How long each entry is shown.
    pub display_ms: u64,

    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            element_id: "toots".to_string(),
            hidden_class: "hide".to_string(),
            max_entries: 5,
            hide_delay_ms: 1_000,
            swap_delay_ms: 500,
            display_ms: 7_000,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 8] = [
        "feed_url",
        "element_id",
        "hidden_class",
        "max_entries",
        "hide_delay_ms",
        "swap_delay_ms",
        "display_ms",
        "request_timeout_secs",
    ];

    /// `~/.config/feedroll/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = std::env::var_os("HOME").ok_or(ConfigError::NoHome)?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("feedroll")
            .join("config.toml"))
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    ///
    /// The result is not validated; call [`Config::validate`] once command
    /// line overrides have been applied.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), feed = %config.feed_url, "Loaded configuration");
        Ok(config)
    }

    /// Checks values that would break the page or the rotation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.feed_url)
            .map_err(|e| ConfigError::Invalid(format!("feed_url '{}': {e}", self.feed_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "feed_url scheme '{}' not supported (only http/https)",
                url.scheme()
            )));
        }

        if self.max_entries == 0 {
            return Err(ConfigError::Invalid(
                "max_entries must be at least 1".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }

        for (key, value) in [
            ("element_id", &self.element_id),
            ("hidden_class", &self.hidden_class),
        ] {
            if !is_css_identifier(value) {
                return Err(ConfigError::Invalid(format!(
                    "{key} '{value}' must be a non-empty identifier of letters, digits, '-' or '_'"
                )));
            }
        }

        Ok(())
    }

    pub fn timing(&self) -> RotationTiming {
        RotationTiming {
            hide_delay: Duration::from_millis(self.hide_delay_ms),
            swap_delay: Duration::from_millis(self.swap_delay_ms),
            display_duration: Duration::from_millis(self.display_ms),
            max_entries: self.max_entries,
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: Duration::from_secs(self.request_timeout_secs),
            ..FetchSettings::default()
        }
    }
}

/// Plain id/class names only: they are written into the page unescaped.
fn is_css_identifier(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// ============================================================================
// Tests
// ============================================================================
