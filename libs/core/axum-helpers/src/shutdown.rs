use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Read-only view of the process-wide shutdown state.
///
/// Handed to long-running work so it can observe shutdown without being able
/// to trigger it. The state is a level, not an edge: a signal cloned or
/// polled after shutdown started still reports it.
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    /// A signal nobody can trigger. Useful for one-off runs and tests.
    pub fn never() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Whether shutdown has been initiated.
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once shutdown is initiated, immediately if it already was.
    pub async fn triggered(&self) {
        self.token.cancelled().await
    }
}

/// Shutdown coordinator that owns the trigger side of [`ShutdownSignal`].
///
/// This handles:
/// - Signal reception (SIGTERM, SIGINT)
/// - Triggering shutdown exactly once, from signals or from code
/// - Shutdown state tracking
///
/// Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    /// Set by the first caller of `shutdown`, decides who logs
    initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observer handle for code that must react to shutdown.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            token: self.token.clone(),
        }
    }

    /// Check if shutdown has been initiated.
    pub fn is_shutting_down(&self) -> bool {
        self.initiated.load(Ordering::Acquire)
    }

    /// Initiate shutdown and notify all observers.
    ///
    /// Returns `true` for the call that actually triggered shutdown. Later
    /// calls return `false` and have no effect.
    pub fn shutdown(&self, reason: &str) -> bool {
        if self
            .initiated
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(reason, "Shutdown already initiated, ignoring");
            return false;
        }

        warn!(reason, "Initiating graceful shutdown");
        self.token.cancel();
        true
    }

    /// Wait for SIGINT or SIGTERM, then initiate shutdown.
    ///
    /// Returns early without triggering if shutdown was initiated elsewhere.
    pub async fn wait_for_signal(&self) {
        self.wait_with(OsSignals::install()).await
    }

    /// Install the SIGINT/SIGTERM handlers, then wait for them in the
    /// background.
    ///
    /// The handlers are registered before this returns, so a signal sent
    /// right after the call is delivered to the coordinator even if the
    /// task has not been polled yet. The task ends as soon as shutdown is
    /// initiated by any path. Abort the handle to stop listening earlier.
    pub fn listen_for_signals(&self) -> JoinHandle<()> {
        let signals = OsSignals::install();
        let coordinator = self.clone();
        tokio::spawn(async move { coordinator.wait_with(signals).await })
    }

    async fn wait_with(&self, signals: OsSignals) {
        tokio::select! {
            name = signals.recv() => {
                self.shutdown(name);
            }
            _ = self.token.cancelled() => {
                debug!("Shutdown initiated elsewhere, no longer waiting for OS signals");
            }
        }
    }
}

/// Registered termination signal handlers.
///
/// Registration replaces the default action (terminate the process) at
/// once; delivery is buffered until [`recv`](Self::recv) is polled. A handler
/// that cannot be installed is logged and never fires, so the other one keeps
/// working.
struct OsSignals {
    #[cfg(unix)]
    interrupt: Option<signal::unix::Signal>,
    #[cfg(unix)]
    terminate: Option<signal::unix::Signal>,
}

impl OsSignals {
    /// Must be called from within a Tokio runtime.
    #[cfg(unix)]
    fn install() -> Self {
        use signal::unix::SignalKind;

        let install = |kind: SignalKind, name: &str| match signal::unix::signal(kind) {
            Ok(stream) => Some(stream),
            Err(e) => {
                error!(error = %e, signal = name, "Failed to install signal handler");
                None
            }
        };

        Self {
            interrupt: install(SignalKind::interrupt(), "SIGINT"),
            terminate: install(SignalKind::terminate(), "SIGTERM"),
        }
    }

    // Ctrl+C registers on first poll here; there is no SIGTERM to lose.
    #[cfg(not(unix))]
    fn install() -> Self {
        Self {}
    }

    /// Resolves with the name of the first termination signal received.
    #[cfg(unix)]
    async fn recv(self) -> &'static str {
        async fn next(stream: Option<signal::unix::Signal>, name: &'static str) -> &'static str {
            match stream {
                Some(mut stream) => match stream.recv().await {
                    Some(()) => name,
                    None => std::future::pending().await,
                },
                None => std::future::pending().await,
            }
        }

        tokio::select! {
            name = next(self.interrupt, "SIGINT") => name,
            name = next(self.terminate, "SIGTERM") => name,
        }
    }

    #[cfg(not(unix))]
    async fn recv(self) -> &'static str {
        match signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending().await
            }
        }
    }
}
