use database::redis::{ConnectionManager, connect};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::redis::Redis;

/// Redis container for cache tests, removed when dropped
pub struct TestRedis {
    _container: ContainerAsync<Redis>,
    connection: ConnectionManager,
    url: String,
}

impl TestRedis {
    /// Start `redis:8-alpine` and connect through the service connector
    pub async fn new() -> Self {
        let container = Redis::default()
            .with_tag("8-alpine")
            .start()
            .await
            .expect("Failed to start Redis container");

        let port = container
            .get_host_port_ipv4(6379)
            .await
            .expect("Failed to get Redis port");

        let url = format!("redis://127.0.0.1:{port}");
        let connection = connect(&url).await.expect("Failed to connect to Redis");

        tracing::info!(port, "Test Redis ready");

        Self {
            _container: container,
            connection,
            url,
        }
    }

    /// A handle on the shared connection manager
    pub fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
