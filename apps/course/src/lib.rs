//! Course catalog service.
//!
//! `course server start` migrates the database and serves the catalog API;
//! `course server seed` loads the reference catalog and exits. Both go
//! through [`bootstrap::Bootstrap`], which owns setup order, the shutdown
//! signal and the exit status.

pub mod api;
pub mod api_server;
pub mod bootstrap;
pub mod cli;
pub mod clients;
pub mod config;
pub mod platform;
pub mod runnable;
pub mod seeder;

pub use bootstrap::{Bootstrap, BootstrapError, BootstrapOptions, Mode, Platform};
pub use config::AppConfig;
pub use platform::LivePlatform;
pub use runnable::{Completion, RunError, Runnable};
