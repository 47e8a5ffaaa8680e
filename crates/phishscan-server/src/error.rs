//! Server error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use phishscan_sdk::{FailureReason, SdkError};
use serde_json::json;
use std::fmt;

/// Server error type
#[derive(Debug)]
pub enum ServerError {
    /// Required request field is absent
    MissingField(&'static str),

    /// Invalid request
    InvalidRequest(String),

    /// Caller identity header is missing or empty
    Unauthorized(String),

    /// Classification pipeline error
    Classification(SdkError),

    /// Internal server error
    InternalError(String),
}

impl ServerError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::MissingField(_) | ServerError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::Classification(err) => match err.reason() {
                FailureReason::Extraction => StatusCode::UNPROCESSABLE_ENTITY,
                FailureReason::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Failure category, for classification errors only
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            ServerError::Classification(err) => Some(err.reason()),
            _ => None,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::MissingField(field) => write!(f, "Missing required field: {}", field),
            ServerError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ServerError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServerError::Classification(err) => write!(f, "Classification failed: {}", err),
            ServerError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Classification(err) => Some(err),
            _ => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let mut body = json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        if let Some(reason) = self.reason() {
            body["reason"] = json!(reason.as_str());
        }

        (status, Json(body)).into_response()
    }
}

impl From<SdkError> for ServerError {
    fn from(err: SdkError) -> Self {
        ServerError::Classification(err)
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(err.to_string())
    }
}
