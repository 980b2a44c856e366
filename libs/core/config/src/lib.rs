pub mod file;
pub mod log;
pub mod server;
pub mod tracing;

pub use file::load_toml;
pub use log::{LogConfig, LogFormat};
pub use server::ServerConfig;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Environment variables scoped under a common prefix.
///
/// `EnvSource::new("COURSE_SERVER").key("database_url")` resolves to
/// `COURSE_SERVER_DATABASE_URL`. Empty values are treated as unset.
#[derive(Clone, Debug)]
pub struct EnvSource {
    prefix: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_end_matches('_').to_ascii_uppercase();
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full variable name for `name` under this prefix
    pub fn key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_ascii_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_ascii_uppercase())
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        env::var(self.key(name)).ok().filter(|value| !value.is_empty())
    }

    /// Read and parse a variable, `Ok(None)` when it is not set
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(name)
            .map(|raw| {
                raw.parse().map_err(|e: T::Err| ConfigError::ParseError {
                    key: self.key(name),
                    details: e.to_string(),
                })
            })
            .transpose()
    }

    /// Overwrite `target` when the variable is set
    pub fn override_string(&self, name: &str, target: &mut String) {
        if let Some(value) = self.get(name) {
            *target = value;
        }
    }

    /// Overwrite `target` with the parsed variable when it is set
    pub fn override_parsed<T>(&self, name: &str, target: &mut T) -> Result<(), ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        if let Some(value) = self.parse(name)? {
            *target = value;
        }
        Ok(())
    }
}

/// Configuration sections that accept environment overrides on top of file values
pub trait EnvOverrides {
    fn apply_env(&mut self, env: &EnvSource) -> Result<(), ConfigError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_source_key_uppercases_and_joins() {
        let env = EnvSource::new("course_server");
        assert_eq!(env.prefix(), "COURSE_SERVER");
        assert_eq!(env.key("database_url"), "COURSE_SERVER_DATABASE_URL");
    }

    #[test]
    fn test_env_source_trailing_underscore_is_ignored() {
        let env = EnvSource::new("COURSE_SERVER_");
        assert_eq!(env.key("LOG_LEVEL"), "COURSE_SERVER_LOG_LEVEL");
    }

    #[test]
    fn test_env_source_empty_prefix() {
        let env = EnvSource::new("");
        assert_eq!(env.key("port"), "PORT");
    }

    #[test]
    fn test_env_source_get_treats_empty_as_unset() {
        temp_env::with_var("TESTPFX_EMPTY", Some(""), || {
            assert_eq!(EnvSource::new("TESTPFX").get("EMPTY"), None);
        });
    }

    #[test]
    fn test_env_source_parse_success() {
        temp_env::with_var("TESTPFX_PORT", Some("3000"), || {
            let port: Option<u16> = EnvSource::new("TESTPFX").parse("port").unwrap();
            assert_eq!(port, Some(3000));
        });
    }

    #[test]
    fn test_env_source_parse_error_names_full_key() {
        temp_env::with_var("TESTPFX_PORT", Some("not_a_number"), || {
            let err = EnvSource::new("TESTPFX").parse::<u16>("port").unwrap_err();
            assert!(err.to_string().contains("TESTPFX_PORT"));
        });
    }

    #[test]
    fn test_env_source_override_keeps_value_when_unset() {
        temp_env::with_var_unset("TESTPFX_HOST", || {
            let mut host = "localhost".to_string();
            EnvSource::new("TESTPFX").override_string("host", &mut host);
            assert_eq!(host, "localhost");
        });
    }

    #[test]
    fn test_env_source_override_parsed() {
        temp_env::with_var("TESTPFX_BATCH", Some("25"), || {
            let mut batch = 50usize;
            EnvSource::new("TESTPFX")
                .override_parsed("batch", &mut batch)
                .unwrap();
            assert_eq!(batch, 25);
        });
    }
}
