use database::postgres::{self, DatabaseConnection};
use database::redis::{self, ConnectionManager};
use eyre::WrapErr;
use tracing::{error, info};

use crate::bootstrap::Mode;
use crate::config::AppConfig;

/// Infrastructure handles shared by the runnable unit.
///
/// Built once per process. The cache is only connected when serving.
pub struct Clients {
    pub db: DatabaseConnection,
    pub cache: Option<ConnectionManager>,
}

impl Clients {
    pub async fn connect(config: &AppConfig, mode: Mode) -> eyre::Result<Self> {
        let db = postgres::connect_from_config_with_retry(config.database.clone())
            .await
            .wrap_err("PostgreSQL connection failed")?;

        let cache = match mode {
            Mode::Serve => Some(
                redis::connect_from_config_with_retry(&config.redis)
                    .await
                    .wrap_err("Redis connection failed")?,
            ),
            Mode::Seed => None,
        };

        info!(cache = cache.is_some(), "Clients ready");
        Ok(Self { db, cache })
    }

    /// Close the database pool. The Redis manager closes on drop.
    pub async fn close(self) {
        match self.db.close().await {
            Ok(()) => info!("PostgreSQL connection closed successfully"),
            Err(e) => error!("Error closing PostgreSQL: {}", e),
        }

        if let Some(cache) = self.cache {
            drop(cache);
            info!("Redis connection closed successfully");
        }
    }
}
