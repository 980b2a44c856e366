use async_trait::async_trait;
use axum::Router;
use axum_helpers::{AppInfo, ShutdownSignal, create_router, health_router, serve};
use domain_catalog::{CatalogService, PgCourseRepository, RedisCourseCache};
use std::sync::Arc;
use tracing::info;

use crate::api;
use crate::clients::Clients;
use crate::config::AppConfig;
use crate::runnable::{Completion, RunError, Runnable};

pub const APP_INFO: AppInfo = AppInfo {
    name: env!("CARGO_PKG_NAME"),
    version: env!("CARGO_PKG_VERSION"),
};

/// HTTP server unit: serves the catalog API until shutdown
pub struct ApiServer {
    config: Arc<AppConfig>,
    clients: Arc<Clients>,
}

impl ApiServer {
    pub fn new(config: Arc<AppConfig>, clients: Arc<Clients>) -> Self {
        Self { config, clients }
    }

    /// Full application router
    ///
    /// - `/api/courses/...`: catalog, read-through cached when a cache is connected
    /// - `/health`: liveness with app name/version
    /// - `/ready`: readiness with real database/cache pings
    pub fn router(&self) -> Router {
        let mut catalog = CatalogService::new(PgCourseRepository::new(self.clients.db.clone()));

        if let Some(cache) = &self.clients.cache {
            catalog = catalog.with_cache(Arc::new(RedisCourseCache::new(
                cache.clone(),
                self.config.cache.ttl(),
                self.config.cache.key_prefix.clone(),
            )));
        }

        let root = health_router(APP_INFO).merge(api::ready_router(self.clients.clone()));
        create_router(api::routes(catalog), root)
    }
}

#[async_trait]
impl Runnable for ApiServer {
    fn name(&self) -> &'static str {
        "server"
    }

    async fn run(self: Box<Self>, signal: ShutdownSignal) -> Result<Completion, RunError> {
        if signal.is_triggered() {
            info!("Shutdown requested before the server started, not binding");
            return Ok(Completion::Interrupted);
        }

        let router = self.router();
        serve(router, &self.config.server, signal).await?;

        info!("Server drained");
        Ok(Completion::Interrupted)
    }
}
