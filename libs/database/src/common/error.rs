use std::time::Duration;

/// Errors raised by the connectors and readiness probes of this crate
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[cfg(feature = "postgres")]
    #[error("postgres: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    #[cfg(feature = "redis")]
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),

    /// The backend answered, but not with what the probe expects
    #[error("{backend} probe got unexpected reply: {reply}")]
    UnexpectedReply {
        backend: &'static str,
        reply: String,
    },

    #[error("{backend} probe did not answer within {after:?}")]
    ProbeTimeout {
        backend: &'static str,
        after: Duration,
    },
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Upper bound for a single readiness probe
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Run `probe`, turning an overrun of `after` into
/// [`DatabaseError::ProbeTimeout`]
pub(crate) async fn with_probe_timeout<T>(
    backend: &'static str,
    after: Duration,
    probe: impl Future<Output = DatabaseResult<T>>,
) -> DatabaseResult<T> {
    tokio::time::timeout(after, probe)
        .await
        .unwrap_or(Err(DatabaseError::ProbeTimeout { backend, after }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_timeout() {
        let err = with_probe_timeout(
            "postgres",
            Duration::from_millis(10),
            std::future::pending::<DatabaseResult<()>>(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            DatabaseError::ProbeTimeout {
                backend: "postgres",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_probe_result_passes_through() {
        let reply = with_probe_timeout("redis", PROBE_TIMEOUT, async { Ok("PONG") })
            .await
            .unwrap();
        assert_eq!(reply, "PONG");
    }

    #[test]
    fn test_unexpected_reply_message() {
        let err = DatabaseError::UnexpectedReply {
            backend: "redis",
            reply: "LOADING".to_string(),
        };
        assert_eq!(err.to_string(), "redis probe got unexpected reply: LOADING");
    }
}
