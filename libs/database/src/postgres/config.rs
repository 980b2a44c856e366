use sea_orm::ConnectOptions;
use serde::Deserialize;
use std::time::Duration;
use tracing::log::LevelFilter;

use crate::common::RetryConfig;

#[cfg(feature = "config")]
use core_config::{ConfigError, EnvOverrides, EnvSource};

/// PostgreSQL database configuration
///
/// The connection target is either a full `url` or the discrete
/// `host`/`port`/`user`/`password`/`name`/`ssl_mode` parts. When both are
/// present the URL wins.
///
/// ```toml
/// [database]
/// host = "localhost"
/// user = "course"
/// password = "secret"
/// name = "course"
/// max_connections = 20
///
/// [database.retry]
/// max_retries = 5
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// Full connection URL, takes precedence over the discrete parts
    pub url: Option<String>,

    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,

    /// Connection idle timeout in seconds
    pub idle_timeout_secs: u64,

    /// Connection max lifetime in seconds
    pub max_lifetime_secs: u64,

    /// Log every statement at debug level
    pub sqlx_logging: bool,

    /// Backoff used by `connect_from_config_with_retry`
    pub retry: RetryConfig,
}

impl PostgresConfig {
    /// Create a config that connects to `url` with default pool settings
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Whether enough is set to build a connection URL
    pub fn is_configured(&self) -> bool {
        self.url.as_deref().is_some_and(|url| !url.is_empty())
            || (!self.host.is_empty() && !self.name.is_empty())
    }

    /// Connection URL, composed from the discrete parts when `url` is unset
    pub fn database_url(&self) -> String {
        if let Some(url) = self.url.as_deref().filter(|url| !url.is_empty()) {
            return url.to_string();
        }

        let credentials = match (self.user.is_empty(), self.password.is_empty()) {
            (true, _) => String::new(),
            (false, true) => format!("{}@", urlencoding::encode(&self.user)),
            (false, false) => format!(
                "{}:{}@",
                urlencoding::encode(&self.user),
                urlencoding::encode(&self.password)
            ),
        };

        let mut url = format!(
            "postgres://{}{}:{}/{}",
            credentials, self.host, self.port, self.name
        );
        if !self.ssl_mode.is_empty() {
            url.push_str("?sslmode=");
            url.push_str(&self.ssl_mode);
        }
        url
    }

    /// Convert this config into SeaORM ConnectOptions
    pub fn into_connect_options(self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(self.database_url());
        opt.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(self.max_lifetime_secs))
            .sqlx_logging(self.sqlx_logging)
            .sqlx_logging_level(LevelFilter::Debug);
        opt
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: String::new(),
            password: String::new(),
            name: String::new(),
            ssl_mode: "disable".to_string(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout_secs: 8,
            acquire_timeout_secs: 8,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
            sqlx_logging: false,
            retry: RetryConfig::default(),
        }
    }
}

/// Environment overrides, all under the caller's prefix:
/// `DATABASE_URL`, `DATABASE_HOST`, `DATABASE_PORT`, `DATABASE_USER`,
/// `DATABASE_PASSWORD`, `DATABASE_NAME`, `DATABASE_SSL_MODE`,
/// `DATABASE_MAX_CONNECTIONS`, `DATABASE_MIN_CONNECTIONS`
#[cfg(feature = "config")]
impl EnvOverrides for PostgresConfig {
    fn apply_env(&mut self, env: &EnvSource) -> Result<(), ConfigError> {
        if let Some(url) = env.get("DATABASE_URL") {
            self.url = Some(url);
        }
        env.override_string("DATABASE_HOST", &mut self.host);
        env.override_parsed("DATABASE_PORT", &mut self.port)?;
        env.override_string("DATABASE_USER", &mut self.user);
        env.override_string("DATABASE_PASSWORD", &mut self.password);
        env.override_string("DATABASE_NAME", &mut self.name);
        env.override_string("DATABASE_SSL_MODE", &mut self.ssl_mode);
        env.override_parsed("DATABASE_MAX_CONNECTIONS", &mut self.max_connections)?;
        env.override_parsed("DATABASE_MIN_CONNECTIONS", &mut self.min_connections)?;
        Ok(())
    }
}
