//! HTTP endpoints.
//!
//! - `/`          : landing page linking to the metrics
//! - `/metrics/`  : Prometheus text format of the active generation
//! - `/-/reload`  : stop all runners, reload configuration, restart
//! - `/healthz`   : liveness

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::error::ApiError;

pub const METRICS_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub async fn index() -> Html<&'static str> {
    Html("<a href=\"/metrics/\">Metrics</a>")
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.coordinator().render();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

/// Blocks until the new generation is running.
pub async fn reload(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    state.coordinator().reload().await?;
    Ok("OK")
}
