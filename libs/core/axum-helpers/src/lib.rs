//! # Axum Helpers
//!
//! Utilities shared by the HTTP-facing services.
//!
//! ## Modules
//!
//! - **[`shutdown`]**: OS signal handling and the process-wide shutdown signal
//! - **[`server`]**: Router layering and serving with a bounded drain
//! - **[`health`]**: Liveness and readiness endpoints
//! - **[`errors`]**: Structured error responses with error codes
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::{ShutdownCoordinator, create_router, health_router, serve};
//!
//! let coordinator = ShutdownCoordinator::new();
//! let _listener = coordinator.listen_for_signals();
//!
//! let router = create_router(api_routes, health_router(app_info));
//! serve(router, &config.server, coordinator.signal()).await?;
//! ```

pub mod errors;
pub mod health;
pub mod server;
pub mod shutdown;

// Re-export shutdown types
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

// Re-export server types
pub use server::{ServeError, create_router, serve, serve_listener};

// Re-export health types
pub use health::{AppInfo, HealthCheckFuture, HealthResponse, health_router, run_health_checks};

// Re-export error types
pub use errors::{AppError, ErrorResponse};
