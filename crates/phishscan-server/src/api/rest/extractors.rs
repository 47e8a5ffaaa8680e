//! Custom extractors
//!
//! Provides request extractors with JSON error bodies.

use crate::error::ServerError;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde_json::json;

/// Header carrying the caller identity for report endpoints
pub const USER_ID_HEADER: &str = "x-user-id";

/// Custom JSON extractor with better error messages
pub struct JsonExtractor<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonExtractor<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => {
                let error_message = match rejection {
                    JsonRejection::JsonDataError(err) => {
                        format!("Invalid JSON data: {}", err)
                    }
                    JsonRejection::JsonSyntaxError(err) => {
                        format!("JSON syntax error: {}", err)
                    }
                    JsonRejection::MissingJsonContentType(_) => {
                        "Missing 'Content-Type: application/json' header".to_string()
                    }
                    _ => format!("Failed to parse JSON: {}", rejection),
                };

                Err((
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": error_message,
                        "status": 400,
                    })),
                ))
            }
        }
    }
}

/// Caller identity taken from the `x-user-id` header.
///
/// Identity is asserted by an upstream gateway; this extractor only checks
/// that one was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ServerError::Unauthorized(format!("missing {} header", USER_ID_HEADER)))?;

        let user = value
            .to_str()
            .map_err(|_| ServerError::Unauthorized(format!("{} is not valid text", USER_ID_HEADER)))?
            .trim();

        if user.is_empty() {
            return Err(ServerError::Unauthorized(format!("empty {} header", USER_ID_HEADER)));
        }

        Ok(UserId(user.to_string()))
    }
}
