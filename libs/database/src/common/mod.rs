//! Pieces shared by the Postgres and Redis halves: error type, readiness
//! probe timeout, startup retry policy.

pub mod error;
pub mod retry;

pub(crate) use error::with_probe_timeout;
pub use error::{DatabaseError, DatabaseResult, PROBE_TIMEOUT};
pub use retry::{RetryConfig, retry_with_backoff};
