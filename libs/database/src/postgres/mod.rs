//! PostgreSQL: pool connectors, readiness probe, SQL file migration gate

mod config;
mod connector;
mod health;
pub mod migrate;

pub use config::PostgresConfig;
pub use connector::{connect, connect_from_config_with_retry};
pub use health::check_health;
pub use migrate::{
    MigrationError, MigrationFile, MigrationReport, MigrationWarning, migrate,
    run_migrations_from_dir,
};

pub use sea_orm::{DatabaseConnection, DbErr};
