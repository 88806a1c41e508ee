//! Widget Configuration
//!
//! Settings for an embedded widget, loaded from
//! `~/.config/portfolio-chat/config.toml` with environment overrides.
//!
//! # Configuration Priority
//!
//! 1. CLI arguments (applied by the binary after loading)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! data_dir = "/srv/portfolio/data"
//!
//! [runtime]
//! host = "localhost"
//! port = 11434
//! load_timeout_secs = 300
//!
//! [analytics]
//! url = "http://localhost:8080/api"
//! clear_on_close = false
//!
//! [timing]
//! closing_ms = 300
//! blur_debounce_ms = 150
//!
//! [rotator]
//! kind = "typewriter"
//! type_delay = 50
//! delete_delay = 30
//! hold = 2000
//! gap = 500
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rotator::RotatorStyle;

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Where the settings mostly came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    #[default]
    Default,
}

// =============================================================================
// TOML Structures
// =============================================================================

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct RuntimeToml {
    host: Option<String>,
    port: Option<u16>,
    load_timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct AnalyticsToml {
    url: Option<String>,
    clear_on_close: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct TimingToml {
    closing_ms: Option<u64>,
    blur_debounce_ms: Option<u64>,
}

/// Root of the TOML file
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct WidgetToml {
    data_dir: Option<PathBuf>,
    runtime: RuntimeToml,
    analytics: AnalyticsToml,
    timing: TimingToml,
    rotator: Option<RotatorStyle>,
}

// =============================================================================
// Settings
// =============================================================================

/// Resolved widget settings
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetSettings {
    /// Directory holding `ai_config.json`, `ai_context.json`, `prompts.json`
    pub data_dir: PathBuf,
    /// Portfolio API root for analytics (`None` = analytics off)
    pub analytics_url: Option<String>,
    /// Clear the stored question log when the chat closes
    pub clear_log_on_close: bool,
    /// Inference runtime host
    pub runtime_host: String,
    /// Inference runtime port
    pub runtime_port: u16,
    /// Give up on a model load after this long
    pub load_timeout: Duration,
    /// Closing animation window before the panel collapses
    pub closing_window: Duration,
    /// Grace period after blur so a send click can land first
    pub blur_debounce: Duration,
    /// Placeholder rotation style
    pub rotator: RotatorStyle,
    /// Where most values came from
    pub source: ConfigSource,
    /// File the settings were read from, if any
    pub config_file_path: Option<PathBuf>,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            analytics_url: None,
            clear_log_on_close: false,
            runtime_host: "localhost".to_string(),
            runtime_port: 11434,
            load_timeout: crate::engine::DEFAULT_LOAD_TIMEOUT,
            closing_window: Duration::from_millis(300),
            blur_debounce: Duration::from_millis(150),
            rotator: RotatorStyle::default(),
            source: ConfigSource::Default,
            config_file_path: None,
        }
    }
}

impl WidgetSettings {
    /// Defaults plus environment overrides (no file)
    #[must_use]
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        apply_env_config(&mut settings, |key| std::env::var(key).ok());
        settings
    }

    /// Reject values the widget cannot run with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime_port == 0 {
            return Err(ConfigError::ValidationError(
                "runtime port must be non-zero".to_string(),
            ));
        }
        if self.load_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "load timeout must be non-zero".to_string(),
            ));
        }
        if let RotatorStyle::Fade { interval, fade } = self.rotator {
            if fade > interval {
                return Err(ConfigError::ValidationError(format!(
                    "rotator fade ({}ms) exceeds interval ({}ms)",
                    fade.as_millis(),
                    interval.as_millis()
                )));
            }
        }
        Ok(())
    }
}

/// Default configuration file path
///
/// `$XDG_CONFIG_HOME/portfolio-chat/config.toml`, typically
/// `~/.config/portfolio-chat/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("portfolio-chat").join("config.toml"))
}

/// Load settings from the default path and the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read, parsed, or
/// validated. A missing file is not an error.
pub fn load_settings() -> Result<WidgetSettings, ConfigError> {
    load_settings_from_path(default_config_path().as_deref())
}

/// Load settings from a specific file and the environment
///
/// # Errors
///
/// See [`load_settings`].
pub fn load_settings_from_path(path: Option<&Path>) -> Result<WidgetSettings, ConfigError> {
    let mut settings = load_file(path)?;
    apply_env_config(&mut settings, |key| std::env::var(key).ok());
    settings.validate()?;
    Ok(settings)
}

fn load_file(path: Option<&Path>) -> Result<WidgetSettings, ConfigError> {
    let mut settings = WidgetSettings::default();

    let Some(config_path) = path else {
        return Ok(settings);
    };
    if !config_path.exists() {
        tracing::debug!(
            path = %config_path.display(),
            "Config file not found, using defaults"
        );
        return Ok(settings);
    }

    let toml_content =
        std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
            path: config_path.to_path_buf(),
            source: e,
        })?;
    let toml_config: WidgetToml = toml::from_str(&toml_content)?;
    apply_toml_config(&mut settings, toml_config);
    settings.config_file_path = Some(config_path.to_path_buf());
    settings.source = ConfigSource::File;

    tracing::info!(path = %config_path.display(), "Loaded configuration from file");
    Ok(settings)
}

fn apply_toml_config(settings: &mut WidgetSettings, toml: WidgetToml) {
    if let Some(dir) = toml.data_dir {
        settings.data_dir = dir;
    }

    if let Some(host) = toml.runtime.host {
        settings.runtime_host = host;
    }
    if let Some(port) = toml.runtime.port {
        settings.runtime_port = port;
    }
    if let Some(secs) = toml.runtime.load_timeout_secs {
        settings.load_timeout = Duration::from_secs(secs);
    }

    if toml.analytics.url.is_some() {
        settings.analytics_url = toml.analytics.url;
    }
    if let Some(clear) = toml.analytics.clear_on_close {
        settings.clear_log_on_close = clear;
    }

    if let Some(ms) = toml.timing.closing_ms {
        settings.closing_window = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timing.blur_debounce_ms {
        settings.blur_debounce = Duration::from_millis(ms);
    }

    if let Some(style) = toml.rotator {
        settings.rotator = style;
    }
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Apply environment overrides using `lookup` to read variables
fn apply_env_config(settings: &mut WidgetSettings, lookup: impl Fn(&str) -> Option<String>) {
    let mut touched = false;

    if let Some(dir) = lookup("PORTFOLIO_CHAT_DATA_DIR") {
        settings.data_dir = PathBuf::from(dir);
        touched = true;
    }
    if let Some(url) = lookup("PORTFOLIO_CHAT_ANALYTICS_URL") {
        settings.analytics_url = (!url.is_empty()).then_some(url);
        touched = true;
    }
    if let Some(flag) = lookup("PORTFOLIO_CHAT_CLEAR_ON_CLOSE") {
        settings.clear_log_on_close = parse_flag(&flag);
        touched = true;
    }
    if let Some(secs) = lookup("PORTFOLIO_CHAT_LOAD_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        settings.load_timeout = Duration::from_secs(secs);
        touched = true;
    }
    if let Some(host) = lookup("OLLAMA_HOST") {
        settings.runtime_host = host;
        touched = true;
    }
    if let Some(port) = lookup("OLLAMA_PORT").and_then(|v| v.parse().ok()) {
        settings.runtime_port = port;
        touched = true;
    }

    if touched && settings.source == ConfigSource::Default {
        settings.source = ConfigSource::Env;
    }
}
