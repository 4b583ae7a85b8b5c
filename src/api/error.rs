use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::wake::WakeError;

/// Per-request error taxonomy, converted to a structured JSON response at the
/// dispatch boundary.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Timeout: failed to reach '{host}' after {timeout_s}s")]
    HostUnreachable { host: String, timeout_s: u64 },

    #[error("No matching handlers for: {0}")]
    NoHandler(String),

    /// Unclassified failure; the detail is logged, not sent to the client.
    #[error("internal proxy error")]
    Internal(String),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::HostUnreachable { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::NoHandler(_) => StatusCode::NOT_FOUND,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body: `{"message": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            ProxyError::Internal(detail) => error!(detail = %detail, "Request failed"),
            other => warn!(error = %other, "Request failed"),
        }

        let status = self.status_code();
        let body = ErrorResponse {
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<WakeError> for ProxyError {
    fn from(value: WakeError) -> Self {
        match value {
            WakeError::HostUnreachable { host, timeout_s } => {
                ProxyError::HostUnreachable { host, timeout_s }
            }
            WakeError::Send(err) => ProxyError::Internal(format!("wake signal send failed: {err}")),
        }
    }
}
