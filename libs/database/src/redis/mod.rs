//! Redis connector for the course read cache.
//!
//! Hands out a [`ConnectionManager`], which reconnects by itself once the
//! first handshake succeeded.

mod config;
mod connector;
mod health;

pub use config::RedisConfig;
pub use connector::{connect, connect_from_config_with_retry};
pub use health::check_health;

pub use redis::AsyncCommands;
pub use redis::aio::ConnectionManager;
