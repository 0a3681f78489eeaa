use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use shutter_service::AssetError;

/// Errors that can occur when running the Shutter server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An asset operation failed.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// The request could not be decoded (bad query string, broken multipart
    /// body, body over the transport limit).
    #[error("{message}")]
    Request {
        /// Status reported to the client.
        status: StatusCode,
        /// Human-readable reason.
        message: String,
    },
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Asset(e) => match e {
                AssetError::BadRequest(_) => StatusCode::BAD_REQUEST,
                AssetError::NotFound(_) => StatusCode::NOT_FOUND,
                AssetError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                AssetError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                AssetError::Inconsistency { .. }
                | AssetError::StorageUnavailable(_)
                | AssetError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Request { status, .. } => *status,
            Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
