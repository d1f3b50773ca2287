use axum::{Json, Router, routing::get};
use serde::Serialize;

use super::{AppState, routes};

/// Health check plus the versioned API, with shared state applied.
pub(crate) fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::router(state.clone()))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
