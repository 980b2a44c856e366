use axum::Router;
use axum::routing::get;
use domain_catalog::{CatalogService, CourseRepository, handlers};
use std::sync::Arc;

use crate::clients::Clients;

pub mod health;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix is added by `axum_helpers::create_router`.
pub fn routes<R: CourseRepository + 'static>(catalog: CatalogService<R>) -> Router {
    Router::new().nest("/courses", handlers::router(catalog))
}

/// Creates a router with the /ready endpoint that pings the shared clients.
pub fn ready_router(clients: Arc<Clients>) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(clients)
}
