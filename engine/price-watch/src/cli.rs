//! # Command Line Interface

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::WatchConfig;
use crate::evaluator::Comparison;

/// Watch a course page and get notified when its price hits the target
#[derive(Parser, Debug, Default)]
#[command(name = "price-watch")]
#[command(version, about = "Watch a course price and raise a desktop alert")]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Course page to watch
    #[arg(long)]
    pub url: Option<String>,

    /// Price to compare against
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Alert when the price is at-or-below or above the threshold
    #[arg(long)]
    pub comparison: Option<Comparison>,

    /// Seconds between checks
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// IANA timezone for the alert timestamp
    #[arg(long)]
    pub timezone: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (pretty, json, compact)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Apply flags on top of an already layered configuration
    pub fn apply_to(&self, config: &mut WatchConfig) {
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(comparison) = self.comparison {
            config.comparison = comparison;
        }
        if let Some(interval) = self.interval_secs {
            config.poll_interval_secs = interval;
        }
        if let Some(timezone) = &self.timezone {
            config.timezone = timezone.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
    }

    /// Build the effective configuration: defaults, file, environment, flags
    pub fn load_config(&self) -> Result<WatchConfig> {
        self.load_config_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Cli::load_config`], reading overrides through `lookup`
    pub fn load_config_with<F>(&self, lookup: F) -> Result<WatchConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config {
            Some(path) => WatchConfig::from_file(path)?,
            None => WatchConfig::default(),
        };

        config.apply_vars(lookup).context("Failed to read environment overrides")?;
        self.apply_to(&mut config);
        config.validate().context("Invalid configuration")?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from([
            "price-watch",
            "--url",
            "https://example.com/course/",
            "-t",
            "12.5",
            "--comparison",
            "above",
            "--interval-secs",
            "900",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("https://example.com/course/"));
        assert_eq!(cli.threshold, Some(12.5));
        assert_eq!(cli.comparison, Some(Comparison::Above));
        assert_eq!(cli.interval_secs, Some(900));
        assert!(!cli.print_config);
    }

    #[test]
    fn unknown_comparison_is_rejected() {
        assert!(Cli::try_parse_from(["price-watch", "--comparison", "sideways"]).is_err());
    }

    fn no_env(_key: &str) -> Option<String> {
        None
    }

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("watch.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn flags_beat_env_beat_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "threshold = 30.0\npoll_interval_secs = 120\n");

        let cli = Cli { config: Some(path), threshold: Some(18.0), ..Default::default() };
        let config = cli
            .load_config_with(|key| match key {
                "PRICE_WATCH_THRESHOLD" => Some("25".to_string()),
                "PRICE_WATCH_INTERVAL_SECS" => Some("300".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.threshold, 18.0);
        assert_eq!(config.poll_interval_secs, 300);
        assert_eq!(config.comparison, Comparison::AtOrBelow);
    }

    #[test]
    fn env_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "threshold = 30.0\n");

        let cli = Cli { config: Some(path), ..Default::default() };
        let config = cli
            .load_config_with(|key| {
                (key == "PRICE_WATCH_THRESHOLD").then(|| "25".to_string())
            })
            .unwrap();

        assert_eq!(config.threshold, 25.0);
    }

    #[test]
    fn defaults_load_without_file_or_env() {
        let config = Cli::default().load_config_with(no_env).unwrap();
        assert_eq!(config, WatchConfig::default());
    }

    #[test]
    fn bad_timezone_flag_fails_validation() {
        let cli = Cli { timezone: Some("Atlantis/Capital".to_string()), ..Default::default() };
        assert!(cli.load_config_with(no_env).is_err());
    }

    #[test]
    fn bad_env_value_fails_loading() {
        let err = Cli::default()
            .load_config_with(|key| {
                (key == "PRICE_WATCH_COMPARISON").then(|| "sideways".to_string())
            })
            .unwrap_err();
        assert!(err.to_string().contains("environment"));
    }

    #[test]
    fn missing_config_file_fails_loading() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli { config: Some(dir.path().join("absent.toml")), ..Default::default() };
        assert!(cli.load_config_with(no_env).is_err());
    }
}
