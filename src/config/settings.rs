use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::models::DEFAULT_SENTINEL_NAME;
use crate::utils::validate_time_format;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub refresh: RefreshConfig,
    pub alerts: AlertsConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub location: String, // local path or http(s) URL
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_ms: u64,
    pub fast_interval_ms: u64,
    pub watch_file: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub start_enabled: bool,
    pub bell: bool,
    pub desktop: bool,
    pub sound_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub site_title: String,
    pub timezone: String,
    pub time_format: String,
    pub sentinel_name: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            location: "status.json".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            fast_interval_ms: 1000,
            watch_file: true,
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            start_enabled: false,
            bell: true,
            desktop: false,
            sound_name: "message-new-instant".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            site_title: "San Antonio COVID-19 Vaccine Availability".to_string(),
            timezone: "America/Chicago".to_string(),
            time_format: "%d-%b-%Y %I:%M:%S %p".to_string(),
            sentinel_name: DEFAULT_SENTINEL_NAME.to_string(),
        }
    }
}

/// Intervals below this would hammer the source for no visible benefit.
const MIN_INTERVAL_MS: u64 = 100;

impl Config {
    /// Load from `path`, or from the default location when `None`. A missing
    /// default config is created with commented defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !config_path.exists() {
            let config = Self::default();
            if path.is_none() {
                config.save_to(&config_path)?;
            }
            return Ok(config);
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        fs::write(config_path, self.to_commented_toml())
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(".config").join("vaxwatch").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.location.trim().is_empty() {
            anyhow::bail!("source.location must not be empty");
        }
        if self.refresh.interval_ms < MIN_INTERVAL_MS || self.refresh.fast_interval_ms < MIN_INTERVAL_MS {
            anyhow::bail!("Refresh intervals must be at least {} ms", MIN_INTERVAL_MS);
        }
        Tz::from_str(&self.display.timezone)
            .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", self.display.timezone, e))?;
        validate_time_format(&self.display.time_format)
            .context("Invalid display.time_format")?;
        Ok(())
    }

    /// Generate TOML with comments explaining each option
    pub fn to_commented_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# vaxwatch configuration\n");
        output.push_str("# Live view of vaccine provider availability from a collector's status.json.\n");
        output.push_str("# Every value can be overridden from the command line.\n");
        output.push('\n');

        output.push_str("[source]\n");
        output.push_str("# Path to status.json, or an http(s) URL serving it.\n");
        output.push_str("# Each refresh re-reads the source with caching disabled.\n");
        output.push_str(&format!("location = {}\n", toml_string(&self.source.location)));
        output.push_str("# HTTP request timeout in seconds (ignored for local files)\n");
        output.push_str(&format!("request_timeout_secs = {}\n", self.source.request_timeout_secs));
        output.push('\n');

        output.push_str("[refresh]\n");
        output.push_str("# How often the view re-fetches the source, in milliseconds.\n");
        output.push_str("# A refresh that is still running when the next one is due is skipped, not queued.\n");
        output.push_str(&format!("interval_ms = {}\n", self.refresh.interval_ms));
        output.push_str("# Interval used with --fast\n");
        output.push_str(&format!("fast_interval_ms = {}\n", self.refresh.fast_interval_ms));
        output.push_str("# Refresh immediately when a local status file changes on disk\n");
        output.push_str(&format!("watch_file = {}\n", self.refresh.watch_file));
        output.push('\n');

        output.push_str("[alerts]\n");
        output.push_str("# Whether audible alerts start switched on. Toggle with 's' in the dashboard;\n");
        output.push_str("# toggling is never written back to this file.\n");
        output.push_str(&format!("start_enabled = {}\n", self.alerts.start_enabled));
        output.push_str("# Ring the terminal bell on alerts\n");
        output.push_str(&format!("bell = {}\n", self.alerts.bell));
        output.push_str("# Also raise a desktop notification\n");
        output.push_str(&format!("desktop = {}\n", self.alerts.desktop));
        output.push_str("# Sound hint passed to the notification service\n");
        output.push_str(&format!("sound_name = {}\n", toml_string(&self.alerts.sound_name)));
        output.push('\n');

        output.push_str("[display]\n");
        output.push_str(&format!("site_title = {}\n", toml_string(&self.display.site_title)));
        output.push_str("# Timezone and strftime format for the \"Last page refresh\" line\n");
        output.push_str(&format!("timezone = {}\n", toml_string(&self.display.timezone)));
        output.push_str(&format!("time_format = {}\n", toml_string(&self.display.time_format)));
        output.push_str("# Collector self-test provider, hidden unless --debug is given\n");
        output.push_str(&format!("sentinel_name = {}\n", toml_string(&self.display.sentinel_name)));

        output
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "source.location" => self.source.location = value.to_string(),
            "source.request_timeout_secs" => {
                self.source.request_timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout value: {}", value))?;
            }
            "refresh.interval_ms" => {
                self.refresh.interval_ms = parse_interval(value)?;
            }
            "refresh.fast_interval_ms" => {
                self.refresh.fast_interval_ms = parse_interval(value)?;
            }
            "refresh.watch_file" => {
                self.refresh.watch_file = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            "alerts.start_enabled" => {
                self.alerts.start_enabled = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            "alerts.bell" => {
                self.alerts.bell = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            "alerts.desktop" => {
                self.alerts.desktop = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            "alerts.sound_name" => self.alerts.sound_name = value.to_string(),
            "display.site_title" => self.display.site_title = value.to_string(),
            "display.timezone" => {
                Tz::from_str(value)
                    .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", value, e))?;
                self.display.timezone = value.to_string();
            }
            "display.time_format" => {
                validate_time_format(value)?;
                self.display.time_format = value.to_string();
            }
            "display.sentinel_name" => self.display.sentinel_name = value.to_string(),
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }
}

fn parse_interval(value: &str) -> Result<u64> {
    let ms: u64 = value
        .parse()
        .with_context(|| format!("Invalid interval value: {}", value))?;
    if ms < MIN_INTERVAL_MS {
        anyhow::bail!("Interval must be at least {} ms", MIN_INTERVAL_MS);
    }
    Ok(ms)
}

fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
