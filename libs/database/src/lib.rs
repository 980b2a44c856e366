//! Storage plumbing for the course service: Postgres through SeaORM, Redis
//! for the read cache, and the SQL migration gate.
//!
//! # Features
//!
//! - `postgres` (default): pool connector, readiness probe, migration gate
//! - `redis` (default): `ConnectionManager` connector and probe
//! - `config`: `core_config::EnvOverrides` for [`postgres::PostgresConfig`]
//!   and [`redis::RedisConfig`]
//! - `all`: everything above
//!
//! ```ignore
//! use database::{postgres, redis};
//!
//! let report = postgres::migrate(Path::new("migrations"), &config.database_url(), true).await?;
//! let db = postgres::connect_from_config_with_retry(config.clone()).await?;
//! let cache = redis::connect_from_config_with_retry(&redis_config).await?;
//! postgres::check_health(&db).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub mod redis;

pub use common::{DatabaseError, DatabaseResult, PROBE_TIMEOUT, RetryConfig};
