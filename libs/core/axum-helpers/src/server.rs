use crate::errors::not_found;
use crate::shutdown::ShutdownSignal;
use axum::Router;
use core_config::ServerConfig;
use std::future::IntoFuture;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info, warn};

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] io::Error),

    #[error("in-flight requests did not drain within {0:?}")]
    DrainTimeout(Duration),
}

/// Wraps API routes with the common layers: request tracing and a JSON 404
/// fallback. API routes are nested under `/api`, `root` is merged as is
/// (health endpoints and the like).
pub fn create_router(apis: Router, root: Router) -> Router {
    Router::new()
        .nest("/api", apis)
        .merge(root)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Bind `server_config.address()` and serve until `signal` fires.
///
/// See [`serve_listener`] for the shutdown behavior.
pub async fn serve(
    router: Router,
    server_config: &ServerConfig,
    signal: ShutdownSignal,
) -> Result<(), ServeError> {
    let addr = server_config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;

    serve_listener(listener, router, server_config.drain_timeout(), signal).await
}

/// Serve on an already bound listener until `signal` fires.
///
/// Once the signal fires the listener stops accepting and in-flight requests
/// get `drain_timeout` to complete. Returns `Ok(())` after a clean drain and
/// [`ServeError::DrainTimeout`] when requests are still running at the
/// deadline; those connections are dropped with the returned future.
pub async fn serve_listener(
    listener: TcpListener,
    router: Router,
    drain_timeout: Duration,
    signal: ShutdownSignal,
) -> Result<(), ServeError> {
    info!("Server starting on {}", listener.local_addr()?);

    let graceful = {
        let signal = signal.clone();
        async move {
            signal.triggered().await;
            info!(?drain_timeout, "Shutdown requested, draining in-flight requests");
        }
    };

    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(graceful)
        .into_future();
    tokio::pin!(server);

    let deadline = async {
        signal.triggered().await;
        tokio::time::sleep(drain_timeout).await;
    };

    tokio::select! {
        result = &mut server => {
            result.inspect_err(|e| {
                error!("Server encountered an error: {:?}", e);
            })?;
            info!("Server stopped");
            Ok(())
        }
        _ = deadline => {
            warn!(?drain_timeout, "Drain timeout exceeded, dropping remaining connections");
            Err(ServeError::DrainTimeout(drain_timeout))
        }
    }
}
