//! Watcher configuration management
//!
//! Values are layered: defaults, then an optional TOML file, then
//! `PRICE_WATCH_*` environment variables, then command-line flags. The
//! result is validated once and handed to the scheduler as an immutable
//! value.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::evaluator::{Comparison, PriceTarget};
use crate::{
    DEFAULT_COURSE_URL, DEFAULT_NOTIFICATION_TIMEOUT_SECS, DEFAULT_NOTIFICATION_TITLE,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_THRESHOLD,
    DEFAULT_TIMEZONE,
};

/// Main watcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Course page to poll
    pub url: String,

    /// Price the observed value is compared against
    pub threshold: f64,

    /// Predicate used for the comparison
    pub comparison: Comparison,

    /// Seconds between polls
    pub poll_interval_secs: u64,

    /// Seconds the desktop popup stays visible
    pub notification_timeout_secs: u64,

    /// IANA zone used for the alert timestamp
    pub timezone: String,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,

    /// Popup title
    pub notification_title: String,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, json, compact)
    pub format: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_COURSE_URL.to_string(),
            threshold: DEFAULT_THRESHOLD,
            comparison: Comparison::AtOrBelow,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            notification_timeout_secs: DEFAULT_NOTIFICATION_TIMEOUT_SECS,
            timezone: DEFAULT_TIMEZONE.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            notification_title: DEFAULT_NOTIFICATION_TITLE.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "compact".to_string() }
    }
}

impl WatchConfig {
    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Get popup display time as Duration
    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_secs)
    }

    /// Get HTTP request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Threshold and predicate as one value
    pub fn target(&self) -> PriceTarget {
        PriceTarget::new(self.threshold, self.comparison)
    }

    /// Resolve the configured timezone
    pub fn tz(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            anyhow::anyhow!(
                "Invalid timezone: {} (expected IANA tz like America/Argentina/Buenos_Aires)",
                self.timezone
            )
        })
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Parse configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: WatchConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Override fields from `PRICE_WATCH_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Override fields from any key lookup using the environment variable names
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PRICE_WATCH_URL") {
            self.url = url;
        }

        if let Some(threshold) = lookup("PRICE_WATCH_THRESHOLD") {
            self.threshold = threshold
                .trim()
                .parse()
                .with_context(|| format!("Invalid PRICE_WATCH_THRESHOLD: {}", threshold))?;
        }

        if let Some(comparison) = lookup("PRICE_WATCH_COMPARISON") {
            self.comparison = comparison.parse().context("PRICE_WATCH_COMPARISON")?;
        }

        if let Some(interval) = lookup("PRICE_WATCH_INTERVAL_SECS") {
            self.poll_interval_secs = interval
                .trim()
                .parse()
                .with_context(|| format!("Invalid PRICE_WATCH_INTERVAL_SECS: {}", interval))?;
        }

        if let Some(timeout) = lookup("PRICE_WATCH_NOTIFY_TIMEOUT_SECS") {
            self.notification_timeout_secs = timeout.trim().parse().with_context(|| {
                format!("Invalid PRICE_WATCH_NOTIFY_TIMEOUT_SECS: {}", timeout)
            })?;
        }

        if let Some(timezone) = lookup("PRICE_WATCH_TIMEZONE") {
            self.timezone = timezone;
        }

        if let Some(level) = lookup("PRICE_WATCH_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("PRICE_WATCH_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow::anyhow!("Course URL must not be empty"));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(anyhow::anyhow!("Course URL must be http(s): {}", self.url));
        }

        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(anyhow::anyhow!("Invalid price threshold: {}", self.threshold));
        }

        if self.poll_interval_secs == 0 {
            return Err(anyhow::anyhow!("Poll interval must be greater than zero"));
        }

        if self.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Request timeout must be greater than zero"));
        }

        self.tz()?;

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(anyhow::anyhow!("Invalid log level: {}", self.logging.level)),
        }

        match self.logging.format.as_str() {
            "json" | "pretty" | "compact" => {}
            _ => return Err(anyhow::anyhow!("Invalid log format: {}", self.logging.format)),
        }

        Ok(())
    }
}
