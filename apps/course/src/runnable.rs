use async_trait::async_trait;
use axum_helpers::{ServeError, ShutdownSignal};
use domain_catalog::CatalogError;
use thiserror::Error;

/// How a unit finished when it did not fail
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The work ran to its natural end
    Finished,
    /// The shutdown signal stopped the work early
    Interrupted,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("server failed: {0}")]
    Server(#[from] ServeError),

    #[error("seeding failed: {0}")]
    Seed(#[from] CatalogError),
}

/// The long-running part of the process, started once setup is complete.
///
/// `run` consumes the unit and must return promptly with
/// [`Completion::Interrupted`] once `signal` fires, including when it
/// already fired before `run` was called.
#[async_trait]
pub trait Runnable: Send {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn run(self: Box<Self>, signal: ShutdownSignal) -> Result<Completion, RunError>;
}
