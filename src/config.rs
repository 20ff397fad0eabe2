//! Configuration management for athena-frame.
//!
//! Handles loading configuration from TOML files and environment variables,
//! with support for named connections.

use crate::connector::PollOptions;
use crate::error::{AthenaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Named connections.
    #[serde(default)]
    pub connections: HashMap<String, ConnectorConfig>,
}

/// Settings for one connector: which AWS profile to use and where results go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// AWS profile name.
    #[serde(default)]
    pub profile: String,

    /// Default output location (`s3://bucket/prefix`).
    pub output_location: Option<String>,

    /// Region override; the profile's region is used otherwise.
    pub region: Option<String>,

    /// Athena work group.
    pub work_group: Option<String>,

    /// Seconds between status checks.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Maximum seconds to wait for a query; unbounded when absent.
    pub max_wait_secs: Option<u64>,
}

fn default_poll_interval_secs() -> u64 {
    2
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            output_location: None,
            region: None,
            work_group: None,
            poll_interval_secs: default_poll_interval_secs(),
            max_wait_secs: None,
        }
    }
}

impl ConnectorConfig {
    /// Creates a config for a profile with every other setting at its default.
    pub fn for_profile(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            ..Default::default()
        }
    }

    /// Checks that the profile is set and the poll interval is at least a second.
    pub fn validate(&self) -> Result<()> {
        if self.profile.trim().is_empty() {
            return Err(AthenaError::config("AWS profile name must not be empty"));
        }
        if self.poll_interval_secs == 0 {
            return Err(AthenaError::config(
                "poll_interval_secs must be at least 1 second",
            ));
        }
        Ok(())
    }

    /// Returns the polling behaviour described by this config.
    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_wait: self.max_wait_secs.map(Duration::from_secs),
        }
    }

    /// Merges another config into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &ConnectorConfig) {
        if !other.profile.is_empty() {
            self.profile = other.profile.clone();
        }
        if other.output_location.is_some() {
            self.output_location = other.output_location.clone();
        }
        if other.region.is_some() {
            self.region = other.region.clone();
        }
        if other.work_group.is_some() {
            self.work_group = other.work_group.clone();
        }
        if other.poll_interval_secs != default_poll_interval_secs() {
            self.poll_interval_secs = other.poll_interval_secs;
        }
        if other.max_wait_secs.is_some() {
            self.max_wait_secs = other.max_wait_secs;
        }
    }

    /// Applies environment variables (AWS_PROFILE, ATHENA_OUTPUT_LOCATION, ...) as defaults.
    pub fn apply_env_defaults(&mut self) {
        self.apply_defaults_from(|name| std::env::var(name).ok());
    }

    fn apply_defaults_from(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.profile.is_empty() {
            if let Some(profile) = var("AWS_PROFILE") {
                self.profile = profile;
            }
        }
        if self.output_location.is_none() {
            self.output_location = var("ATHENA_OUTPUT_LOCATION");
        }
        if self.region.is_none() {
            self.region = var("AWS_REGION");
        }
        if self.work_group.is_none() {
            self.work_group = var("ATHENA_WORK_GROUP");
        }
    }

    /// Returns a short description for log output.
    pub fn display_string(&self) -> String {
        let region = self.region.as_deref().unwrap_or("profile region");
        match &self.output_location {
            Some(location) => format!("{} ({region}) -> {location}", self.profile),
            None => format!("{} ({region})", self.profile),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("athena-frame")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file is an empty config.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AthenaError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            AthenaError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named connection, or the default connection if name is None.
    pub fn get_connection(&self, name: Option<&str>) -> Option<&ConnectorConfig> {
        let key = name.unwrap_or("default");
        self.connections.get(key)
    }
}
