//! Command-line argument parsing for athena-frame.

use athena_frame::config::{Config, ConnectorConfig};
use athena_frame::error::{AthenaError, Result};
use athena_frame::output::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Run SQL on Amazon Athena and print the result.
#[derive(Parser, Debug)]
#[command(name = "athena-frame")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQL query to run
    #[arg(value_name = "SQL", conflicts_with = "file")]
    pub sql: Option<String>,

    /// Read the SQL query from a file
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// AWS profile name
    #[arg(short = 'p', long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Where Athena writes results (s3://bucket/prefix)
    #[arg(short = 'o', long, value_name = "LOCATION")]
    pub output_location: Option<String>,

    /// Use named connection from config
    #[arg(short = 'c', long, value_name = "NAME")]
    pub connection: Option<String>,

    /// AWS region override
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Athena work group
    #[arg(long, value_name = "NAME")]
    pub work_group: Option<String>,

    /// Seconds between status checks
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: Option<u64>,

    /// Give up waiting after this many seconds
    #[arg(long, value_name = "SECS")]
    pub max_wait: Option<u64>,

    /// Output format: text, csv, or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub format: String,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Parses the output format from the --format argument.
    pub fn parse_output_format(&self) -> Result<OutputFormat> {
        self.format.parse().map_err(AthenaError::config)
    }

    /// Returns the SQL text from the positional argument or --file.
    pub fn query_text(&self) -> Result<String> {
        if let Some(sql) = &self.sql {
            return Ok(sql.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path).map_err(|e| {
                AthenaError::config(format!("Failed to read {}: {e}", path.display()))
            });
        }
        Err(AthenaError::config("No query given. Pass SQL or --file"))
    }

    /// Converts CLI arguments to connector overrides, without file or env values.
    pub fn to_connector_config(&self) -> ConnectorConfig {
        ConnectorConfig {
            profile: self.profile.clone().unwrap_or_default(),
            output_location: self.output_location.clone(),
            region: self.region.clone(),
            work_group: self.work_group.clone(),
            max_wait_secs: self.max_wait,
            ..Default::default()
        }
    }

    /// Resolves the connector config with precedence:
    /// 1. CLI arguments (highest)
    /// 2. Named connection from config
    /// 3. Default connection from config
    /// 4. Environment variables
    pub fn resolve_connector(&self, config: &Config) -> Result<ConnectorConfig> {
        let mut resolved = match self.connection.as_deref() {
            Some(name) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
                AthenaError::config(format!("Connection '{name}' not found in config file"))
            })?,
            None => config.get_connection(None).cloned().unwrap_or_default(),
        };

        resolved.merge(&self.to_connector_config());
        // merge() cannot tell an explicit default from an unset flag
        if let Some(secs) = self.poll_interval {
            resolved.poll_interval_secs = secs;
        }
        resolved.apply_env_defaults();
        Ok(resolved)
    }
}
