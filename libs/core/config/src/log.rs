use crate::{ConfigError, EnvOverrides, EnvSource};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Output format of the stdout log layer
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, multi-line output for local development
    #[default]
    Pretty,
    /// One JSON object per event for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}', expected 'pretty' or 'json'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Logging section of the service configuration
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive, used when `RUST_LOG` is not set
    pub level: String,
    pub format: LogFormat,
    /// When set, events are also written to a daily rolling file in this directory
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            directory: None,
            file_prefix: "course".to_string(),
        }
    }
}

impl EnvOverrides for LogConfig {
    /// Reads `<PREFIX>_LOG_LEVEL`, `<PREFIX>_LOG_FORMAT` and `<PREFIX>_LOG_DIRECTORY`
    fn apply_env(&mut self, env: &EnvSource) -> Result<(), ConfigError> {
        env.override_string("LOG_LEVEL", &mut self.level);
        env.override_parsed("LOG_FORMAT", &mut self.format)?;
        if let Some(directory) = env.get("LOG_DIRECTORY") {
            self.directory = Some(PathBuf::from(directory));
        }
        Ok(())
    }
}
