use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use super::{RedisConfig, check_health};
use crate::common::{DatabaseError, retry_with_backoff};

/// Open a [`ConnectionManager`] for `url` and make sure the server answers.
///
/// A malformed URL fails before any network traffic.
pub async fn connect(url: &str) -> Result<ConnectionManager, DatabaseError> {
    let client = Client::open(url)?;
    let mut manager = ConnectionManager::new(client).await?;

    check_health(&mut manager).await?;

    info!("Redis connection established");
    Ok(manager)
}

/// [`connect`] to `config.url`, retrying with the backoff in `config.retry`
pub async fn connect_from_config_with_retry(
    config: &RedisConfig,
) -> Result<ConnectionManager, DatabaseError> {
    retry_with_backoff(|| connect(&config.url), config.retry.clone()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires actual Redis
    async fn test_connect() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let result = connect(&redis_url).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let err = connect("not-a-redis-url").await.unwrap_err();
        assert!(matches!(err, DatabaseError::Redis(_)));
    }
}
