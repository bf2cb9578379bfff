//! Request-level errors and their mapping to HTTP responses.

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Everything that can go wrong while serving one request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Translation(#[from] query_engine_translation::translation::Error),

    #[error("format '{0}' is not supported")]
    UnsupportedFormat(String),

    #[error("method {0} is not allowed")]
    MethodNotAllowed(Method),

    #[error(transparent)]
    Execution(#[from] query_engine_execution::Error),

    #[error("could not serialize rows: {0}")]
    SerializeRows(#[from] serde_json::Error),

    #[error("could not render csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("server is shutting down")]
    ShuttingDown,
}

impl RequestError {
    /// Translation problems and rejected queries are the requester's fault;
    /// everything else is ours.
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::Translation(_) | RequestError::UnsupportedFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            RequestError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::Execution(err) if err.is_rejected_query() => StatusCode::BAD_REQUEST,
            RequestError::Execution(_) | RequestError::SerializeRows(_) | RequestError::Csv(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RequestError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}
