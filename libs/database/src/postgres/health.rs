use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::debug;

use crate::common::{DatabaseError, DatabaseResult, PROBE_TIMEOUT, with_probe_timeout};

/// Readiness probe: `SELECT 1` through the pool, bounded by
/// [`PROBE_TIMEOUT`]
pub async fn check_health(db: &DatabaseConnection) -> DatabaseResult<()> {
    with_probe_timeout("postgres", PROBE_TIMEOUT, async {
        let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
        match db.query_one_raw(stmt).await? {
            Some(_) => Ok(()),
            None => Err(DatabaseError::UnexpectedReply {
                backend: "postgres",
                reply: "no rows".to_string(),
            }),
        }
    })
    .await?;

    debug!("PostgreSQL probe passed");
    Ok(())
}
