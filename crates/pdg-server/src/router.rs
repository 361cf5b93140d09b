//! Axum router wiring.

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ops::index))
        .route("/metrics", get(ops::metrics))
        .route("/metrics/", get(ops::metrics))
        .route("/-/reload", get(ops::reload))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
