use crate::{ConfigError, EnvOverrides, EnvSource};
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Server configuration for HTTP APIs
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on draining in-flight requests once shutdown starts
    pub drain_timeout_secs: u64,
}

impl ServerConfig {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            ..Self::default()
        }
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

impl EnvOverrides for ServerConfig {
    /// Reads `<PREFIX>_SERVER_HOST`, `<PREFIX>_SERVER_PORT` and
    /// `<PREFIX>_SERVER_DRAIN_TIMEOUT_SECS`
    fn apply_env(&mut self, env: &EnvSource) -> Result<(), ConfigError> {
        env.override_string("SERVER_HOST", &mut self.host);
        env.override_parsed("SERVER_PORT", &mut self.port)?;
        env.override_parsed("SERVER_DRAIN_TIMEOUT_SECS", &mut self.drain_timeout_secs)?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED.to_string(),
            port: 8080,
            drain_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_env_with_defaults() {
        temp_env::with_vars(
            [
                ("SRVTEST_SERVER_HOST", None::<&str>),
                ("SRVTEST_SERVER_PORT", None::<&str>),
            ],
            || {
                let mut config = ServerConfig::default();
                config.apply_env(&EnvSource::new("SRVTEST")).unwrap();
                assert_eq!(config.host, "0.0.0.0");
                assert_eq!(config.port, 8080);
                assert_eq!(config.address(), "0.0.0.0:8080");
            },
        );
    }

    #[test]
    fn test_server_config_env_with_custom_values() {
        temp_env::with_vars(
            [
                ("SRVTEST_SERVER_HOST", Some("127.0.0.1")),
                ("SRVTEST_SERVER_PORT", Some("3000")),
                ("SRVTEST_SERVER_DRAIN_TIMEOUT_SECS", Some("5")),
            ],
            || {
                let mut config = ServerConfig::default();
                config.apply_env(&EnvSource::new("SRVTEST")).unwrap();
                assert_eq!(config.address(), "127.0.0.1:3000");
                assert_eq!(config.drain_timeout(), Duration::from_secs(5));
            },
        );
    }

    #[test]
    fn test_server_config_env_invalid_port() {
        temp_env::with_var("SRVTEST_SERVER_PORT", Some("not_a_number"), || {
            let mut config = ServerConfig::default();
            let err = config.apply_env(&EnvSource::new("SRVTEST")).unwrap_err();
            assert!(err.to_string().contains("SRVTEST_SERVER_PORT"));
        });
    }

    #[test]
    fn test_server_config_env_port_out_of_range() {
        temp_env::with_var("SRVTEST_SERVER_PORT", Some("99999"), || {
            let mut config = ServerConfig::default();
            assert!(config.apply_env(&EnvSource::new("SRVTEST")).is_err());
        });
    }

    #[test]
    fn test_server_config_deserialize_partial() {
        let config: ServerConfig = toml::from_str("port = 9000").unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.drain_timeout_secs, 30);
    }

    #[test]
    fn test_server_config_new() {
        let config = ServerConfig::new("192.168.1.1".to_string(), 5000);
        assert_eq!(config.host, "192.168.1.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.drain_timeout_secs, 30);
    }
}
