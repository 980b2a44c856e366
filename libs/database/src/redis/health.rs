use redis::aio::ConnectionManager;
use tracing::debug;

use crate::common::{DatabaseError, DatabaseResult, PROBE_TIMEOUT, with_probe_timeout};

/// Readiness probe: `PING` must answer `PONG`, bounded by
/// [`PROBE_TIMEOUT`]
pub async fn check_health(conn: &mut ConnectionManager) -> DatabaseResult<()> {
    let reply: String = with_probe_timeout("redis", PROBE_TIMEOUT, async {
        Ok(redis::cmd("PING").query_async(conn).await?)
    })
    .await?;

    if reply != "PONG" {
        return Err(DatabaseError::UnexpectedReply {
            backend: "redis",
            reply,
        });
    }

    debug!("Redis probe passed");
    Ok(())
}
