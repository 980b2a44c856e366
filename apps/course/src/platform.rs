use async_trait::async_trait;
use core_config::tracing::{TracingGuard, init_tracing};
use core_config::{ConfigError, LogConfig};
use database::postgres::{MigrationError, MigrationReport, migrate};
use std::path::Path;
use std::sync::Arc;

use crate::api_server::ApiServer;
use crate::bootstrap::{Mode, Platform};
use crate::clients::Clients;
use crate::config::AppConfig;
use crate::runnable::Runnable;
use crate::seeder::Seeder;

/// The real collaborators: TOML config, tracing, Postgres, Redis
#[derive(Clone, Copy, Debug, Default)]
pub struct LivePlatform;

#[async_trait]
impl Platform for LivePlatform {
    type Guard = TracingGuard;
    type Clients = Clients;

    fn load_config(&self, path: &Path, env_prefix: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::load(path, env_prefix)
    }

    fn init_logging(&self, config: &LogConfig) -> TracingGuard {
        init_tracing(config)
    }

    async fn migrate(
        &self,
        dir: &Path,
        database_url: &str,
        strict: bool,
    ) -> Result<MigrationReport, MigrationError> {
        migrate(dir, database_url, strict).await
    }

    async fn connect(&self, config: &AppConfig, mode: Mode) -> eyre::Result<Clients> {
        Clients::connect(config, mode).await
    }

    fn build_unit(
        &self,
        mode: Mode,
        config: Arc<AppConfig>,
        clients: Arc<Clients>,
    ) -> eyre::Result<Box<dyn Runnable>> {
        let unit: Box<dyn Runnable> = match mode {
            Mode::Serve => Box::new(ApiServer::new(config, clients)),
            Mode::Seed => Box::new(Seeder::from_clients(&config, &clients)),
        };
        Ok(unit)
    }

    async fn release(&self, clients: Clients) {
        clients.close().await;
    }
}
