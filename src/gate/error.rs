//! Mapping from library errors to HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Error returned by gateway handlers
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Inbound payload rejected before any backend call
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Backend failed or answered with something unusable
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Backend did not answer within the outbound timeout
    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl GatewayError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            GatewayError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            GatewayError::BadRequest(msg)
            | GatewayError::BadGateway(msg)
            | GatewayError::GatewayTimeout(msg)
            | GatewayError::Internal(msg) => msg,
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<crate::Error> for GatewayError {
    fn from(err: crate::Error) -> Self {
        match err {
            crate::Error::InvalidRequest(msg) => GatewayError::BadRequest(msg),
            crate::Error::Backend { status, body } => {
                GatewayError::BadGateway(format!("Backend returned {}: {}", status, body))
            }
            crate::Error::Http(e) if e.is_timeout() => GatewayError::GatewayTimeout(e.to_string()),
            crate::Error::Http(e) => GatewayError::BadGateway(e.to_string()),
            crate::Error::MalformedResponse(msg) => GatewayError::BadGateway(msg),
            crate::Error::Json(e) => GatewayError::Internal(e.to_string()),
            crate::Error::Config(msg) => GatewayError::Internal(format!("Config: {}", msg)),
        }
    }
}
