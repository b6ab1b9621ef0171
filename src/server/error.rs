//! JSON error responses for the HTTP surface.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::error::GenerationError;

/// Shown when every attempt hit an overloaded or exhausted model.
pub const BUSY_MESSAGE: &str =
    "La IA está ocupada en este momento. Por favor espera unos segundos.";

/// Characters of raw model output quoted back on decode failures.
const RAW_PREVIEW_CHARS: usize = 200;

/// Error returned by handlers, rendered as `{"error": "<message>"}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    TooManyRequests(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a session generation failure.
    pub fn from_session_error(err: GenerationError) -> Self {
        match &err {
            GenerationError::ServiceUnavailable { .. } => {
                ApiError::TooManyRequests(BUSY_MESSAGE.to_string())
            }
            GenerationError::Decode { .. } => ApiError::Internal(format!(
                "Error de formato JSON. La IA respondió: {}...",
                err.raw_output_preview(RAW_PREVIEW_CHARS).unwrap_or_default()
            )),
            _ => ApiError::Internal(format!("Error al generar la sesión: {}", err)),
        }
    }

    /// Map an EPT structure failure.
    pub fn from_ept_error(err: GenerationError) -> Self {
        match err {
            GenerationError::ServiceUnavailable { .. } => {
                ApiError::TooManyRequests(BUSY_MESSAGE.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::warn!(status = %status, error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
