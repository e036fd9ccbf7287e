//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are converted to a
//! `{"error": "..."}` body with an appropriate status code before any
//! document bytes are sent.
//!
//! Internal errors are logged with full detail but only a generic message is
//! returned, so workspace paths never reach clients. Conversion failures are
//! the exception: the tool's diagnostics are returned verbatim.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mdport_core::ConvertError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// All errors that can occur in the mdport-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A multipart body exceeded the configured upload bound.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// The caller referenced a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The conversion tool exited non-zero; carries its diagnostics.
    #[error("conversion failed: {0}")]
    ConversionFailed(String),

    /// The conversion tool exceeded its deadline.
    #[error("conversion timed out: {0}")]
    Timeout(String),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ConvertError> for ServerError {
    fn from(e: ConvertError) -> Self {
        match e {
            ConvertError::EmptySource | ConvertError::UnsupportedFormat(_) => {
                ServerError::BadRequest(e.to_string())
            }
            ConvertError::Failed { .. } => ServerError::ConversionFailed(e.to_string()),
            ConvertError::Timeout(_) => ServerError::Timeout(e.to_string()),
            ConvertError::Io(_) | ConvertError::Spawn { .. } | ConvertError::OutputMissing => {
                ServerError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ServerError::PayloadTooLarge(m) => (StatusCode::PAYLOAD_TOO_LARGE, m),
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ServerError::ConversionFailed(m) => {
                warn!(diagnostics = %m, "conversion tool reported failure");
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
            ServerError::Timeout(m) => {
                warn!(message = %m, "conversion timed out");
                (StatusCode::GATEWAY_TIMEOUT, m)
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}
