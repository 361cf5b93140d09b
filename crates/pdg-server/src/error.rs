//! HTTP mapping for `PdgError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use pdg_core::error::PdgError;

/// Error returned by HTTP handlers.
#[derive(Debug)]
pub struct ApiError(pub PdgError);

impl From<PdgError> for ApiError {
    fn from(e: PdgError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.0.code().as_str(),
            "message": self.0.to_string(),
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
