//! Readiness check backed by the real database and cache connections.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use std::sync::Arc;

use crate::clients::Clients;

/// Readiness check endpoint that actually checks database and cache connections.
pub async fn ready_handler(State(clients): State<Arc<Clients>>) -> Response {
    let mut checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            database::postgres::check_health(&clients.db)
                .await
                .map_err(|e| e.to_string())
        }),
    )];

    if let Some(cache) = &clients.cache {
        let mut cache = cache.clone();
        checks.push((
            "cache",
            Box::pin(async move {
                database::redis::check_health(&mut cache)
                    .await
                    .map_err(|e| e.to_string())
            }),
        ));
    }

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}
