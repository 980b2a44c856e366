//! Process lifecycle: ordered setup, signal wiring, running one unit.
//!
//! ```text
//! config ─► logging ─► signal listener ─► migrations (serve only)
//!        ─► clients ─► unit ─► run until done or cancelled ─► release
//! ```
//!
//! Every step that talks to the outside world goes through [`Platform`], so
//! the sequence itself can be exercised without a database or a network.

use async_trait::async_trait;
use axum_helpers::ShutdownCoordinator;
use core_config::{ConfigError, LogConfig};
use database::postgres::{MigrationError, MigrationReport};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::runnable::{Completion, RunError, Runnable};

/// Which unit the process runs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Migrate, then serve HTTP until shutdown
    Serve,
    /// Write the reference catalog, no migrations, no cache
    Seed,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Serve => "serve",
            Mode::Seed => "seed",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BootstrapOptions {
    pub config_path: PathBuf,
    pub env_prefix: String,
    pub migration_dir: PathBuf,
    pub mode: Mode,
}

/// Collaborators of the bootstrap sequence
#[async_trait]
pub trait Platform: Send + Sync {
    /// Flushes buffered log output when dropped
    type Guard: Send;
    /// Infrastructure handles shared with the unit
    type Clients: Send + Sync + 'static;

    fn load_config(&self, path: &Path, env_prefix: &str) -> Result<AppConfig, ConfigError>;

    fn init_logging(&self, config: &LogConfig) -> Self::Guard;

    async fn migrate(
        &self,
        dir: &Path,
        database_url: &str,
        strict: bool,
    ) -> Result<MigrationReport, MigrationError>;

    async fn connect(&self, config: &AppConfig, mode: Mode) -> eyre::Result<Self::Clients>;

    fn build_unit(
        &self,
        mode: Mode,
        config: Arc<AppConfig>,
        clients: Arc<Self::Clients>,
    ) -> eyre::Result<Box<dyn Runnable>>;

    /// Tear down clients once nothing else references them
    async fn release(&self, clients: Self::Clients);
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to load configuration: {0}")]
    Config(ConfigError),

    #[error("migration failed: {0}")]
    Migration(MigrationError),

    #[error("failed to construct clients: {0:#}")]
    Clients(eyre::Report),

    #[error("failed to build runnable unit: {0:#}")]
    Build(eyre::Report),

    #[error("{0}")]
    Run(RunError),
}

impl BootstrapError {
    /// Setup failures that stop the process before any unit exists
    pub fn is_fatal(&self) -> bool {
        matches!(self, BootstrapError::Config(_) | BootstrapError::Migration(_))
    }

    pub fn stage(&self) -> &'static str {
        match self {
            BootstrapError::Config(_) => "config",
            BootstrapError::Migration(_) => "migration",
            BootstrapError::Clients(_) => "clients",
            BootstrapError::Build(_) => "build",
            BootstrapError::Run(_) => "run",
        }
    }

    /// sysexits(3) codes for setup stages, 1 for a failed unit
    pub fn exit_code(&self) -> u8 {
        match self {
            BootstrapError::Config(_) => 78,
            BootstrapError::Migration(_) => 65,
            BootstrapError::Clients(_) => 69,
            BootstrapError::Build(_) => 70,
            BootstrapError::Run(_) => 1,
        }
    }
}

pub struct Bootstrap<P: Platform> {
    platform: P,
    options: BootstrapOptions,
    shutdown: ShutdownCoordinator,
    listen_for_signals: bool,
}

impl<P: Platform> Bootstrap<P> {
    pub fn new(platform: P, options: BootstrapOptions) -> Self {
        Self {
            platform,
            options,
            shutdown: ShutdownCoordinator::new(),
            listen_for_signals: true,
        }
    }

    /// Use an existing coordinator, e.g. to trigger shutdown from a test
    pub fn with_shutdown(mut self, shutdown: ShutdownCoordinator) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Do not install SIGINT/SIGTERM handlers
    pub fn without_signal_listener(mut self) -> Self {
        self.listen_for_signals = false;
        self
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Run to completion and map the outcome to a process exit code.
    ///
    /// No overall timeout is applied here. The server bounds its own drain
    /// with `server.drain_timeout_secs`; the supervisor's hard-kill timeout
    /// (e.g. `terminationGracePeriodSeconds`) should sit above it.
    pub async fn run(self) -> ExitCode {
        match self.execute().await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => ExitCode::from(e.exit_code()),
        }
    }

    /// The bootstrap sequence, returning how the unit finished.
    ///
    /// Errors are already reported when this returns: on stderr for a
    /// config failure, in the log for everything later.
    pub async fn execute(&self) -> Result<Completion, BootstrapError> {
        let options = &self.options;

        let config = match self
            .platform
            .load_config(&options.config_path, &options.env_prefix)
        {
            Ok(config) => Arc::new(config),
            Err(e) => {
                let err = BootstrapError::Config(e);
                // No subscriber yet
                eprintln!("Error: {err}");
                return Err(err);
            }
        };

        // Dropped last, after the outcome is logged
        let _log_guard = self.platform.init_logging(&config.log);

        info!(
            version = env!("CARGO_PKG_VERSION"),
            mode = options.mode.as_str(),
            config = %options.config_path.display(),
            "Starting course service"
        );

        let listener = self
            .listen_for_signals
            .then(|| self.shutdown.listen_for_signals());

        let result = self.run_stages(config).await;

        if let Some(listener) = listener {
            listener.abort();
        }

        match &result {
            Ok(completion) => info!(?completion, "Course service stopped"),
            Err(e) => error!(
                stage = e.stage(),
                fatal = e.is_fatal(),
                error = %e,
                "Course service failed"
            ),
        }

        result
    }

    async fn run_stages(&self, config: Arc<AppConfig>) -> Result<Completion, BootstrapError> {
        let mode = self.options.mode;

        if mode == Mode::Serve {
            let dir = &self.options.migration_dir;
            debug!("running migration on {}", dir.display());

            let report = self
                .platform
                .migrate(dir, &config.database.database_url(), true)
                .await
                .map_err(BootstrapError::Migration)?;
            info!(
                applied = ?report.applied,
                already_applied = report.skipped,
                "Migrations up to date"
            );
        }

        let clients = self
            .platform
            .connect(&config, mode)
            .await
            .map_err(BootstrapError::Clients)?;
        let clients = Arc::new(clients);

        let unit = match self
            .platform
            .build_unit(mode, config.clone(), clients.clone())
        {
            Ok(unit) => unit,
            Err(e) => {
                self.release(clients).await;
                return Err(BootstrapError::Build(e));
            }
        };

        let unit_name = unit.name();
        info!(unit = unit_name, "Starting runnable unit");

        let outcome = unit.run(self.shutdown.signal()).await;
        debug!(unit = unit_name, ok = outcome.is_ok(), "Runnable unit returned");

        self.release(clients).await;
        outcome.map_err(BootstrapError::Run)
    }

    async fn release(&self, clients: Arc<P::Clients>) {
        match Arc::try_unwrap(clients) {
            Ok(clients) => self.platform.release(clients).await,
            Err(still_shared) => warn!(
                references = Arc::strong_count(&still_shared),
                "Clients still referenced after the unit returned, leaving them to drop"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_and_nonzero() {
        let errors = [
            BootstrapError::Config(ConfigError::NotFound(PathBuf::from("x.toml"))),
            BootstrapError::Migration(MigrationError::DirectoryNotFound(PathBuf::from("m"))),
            BootstrapError::Clients(eyre::eyre!("refused")),
            BootstrapError::Build(eyre::eyre!("bad")),
            BootstrapError::Run(RunError::Server(axum_helpers::ServeError::DrainTimeout(
                std::time::Duration::from_secs(1),
            ))),
        ];

        let codes: Vec<u8> = errors.iter().map(BootstrapError::exit_code).collect();
        assert!(codes.iter().all(|code| *code != 0));

        let mut unique = codes.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_only_config_and_migration_are_fatal() {
        assert!(BootstrapError::Config(ConfigError::Invalid("x".into())).is_fatal());
        assert!(
            BootstrapError::Migration(MigrationError::DirectoryNotFound(PathBuf::from("m")))
                .is_fatal()
        );
        assert!(!BootstrapError::Clients(eyre::eyre!("refused")).is_fatal());
        assert!(!BootstrapError::Build(eyre::eyre!("bad")).is_fatal());
    }

    #[test]
    fn test_message_includes_cause() {
        let err = BootstrapError::Config(ConfigError::NotFound(PathBuf::from("/etc/course.toml")));
        let message = err.to_string();
        assert!(message.starts_with("failed to load configuration"));
        assert!(message.contains("/etc/course.toml"));

        let err = BootstrapError::Clients(eyre::eyre!("connection refused").wrap_err("Redis"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(Mode::Serve.as_str(), "serve");
        assert_eq!(Mode::Seed.as_str(), "seed");
    }
}
