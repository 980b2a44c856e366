use serde::Deserialize;

use crate::common::RetryConfig;

#[cfg(feature = "config")]
use core_config::{ConfigError, EnvOverrides, EnvSource};

/// Redis configuration
///
/// ```toml
/// [redis]
/// url = "redis://127.0.0.1:6379/0"
///
/// [redis.retry]
/// max_retries = 5
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis connection URL, credentials and database number included
    pub url: String,

    /// Backoff used by `connect_from_config_with_retry`
    pub retry: RetryConfig,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            retry: RetryConfig::default(),
        }
    }

    /// Get a reference to the Redis URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::new("redis://127.0.0.1:6379")
    }
}

/// Reads `<PREFIX>_REDIS_URL`
#[cfg(feature = "config")]
impl EnvOverrides for RedisConfig {
    fn apply_env(&mut self, env: &EnvSource) -> Result<(), ConfigError> {
        env.override_string("REDIS_URL", &mut self.url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_config_new() {
        let config = RedisConfig::new("redis://localhost:6379");
        assert_eq!(config.url(), "redis://localhost:6379");
        assert_eq!(config.retry, RetryConfig::default());
    }

    #[test]
    fn test_redis_config_default() {
        let config = RedisConfig::default();
        assert_eq!(config.url, "redis://127.0.0.1:6379");
    }

    #[test]
    fn test_redis_config_deserialize() {
        let config: RedisConfig = toml::from_str(
            r#"
            url = "redis://cache:6379/2"

            [retry]
            initial_delay_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.url, "redis://cache:6379/2");
        assert_eq!(config.retry.initial_delay_ms, 250);
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_redis_config_env_override() {
        temp_env::with_var("RDTEST_REDIS_URL", Some("redis://prod:6379"), || {
            let mut config = RedisConfig::default();
            config.apply_env(&EnvSource::new("RDTEST")).unwrap();
            assert_eq!(config.url, "redis://prod:6379");
        });
    }
}
