//! HTTP-facing error type.
//!
//! Every handler returns [`ApiError`]; library and store failures are
//! classified into one of its variants before they reach the client.

use std::collections::BTreeMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Field name to messages, serialized as `{"field": ["msg", ...]}`.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Err` when at least one field failed.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(FieldErrors),

    /// Normalized login failure; `details` carries the underlying reason.
    #[error("Invalid credentials: {details}")]
    InvalidCredentials { details: String },

    #[error("Invalid token: {details}")]
    InvalidToken { details: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    MalformedBody(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidCredentials { .. }
            | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidToken { .. } | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        match self {
            ApiError::Internal(e) => tracing::error!(error = ?e, "internal error"),
            ApiError::InvalidCredentials { details } => {
                tracing::warn!(%details, "login rejected")
            }
            ApiError::InvalidToken { details } => tracing::warn!(%details, "token rejected"),
            _ => tracing::debug!(error = %self, "request rejected"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let body = match self {
            ApiError::Validation(errors) => json!(errors),
            ApiError::InvalidCredentials { details } => json!({
                "status": "error",
                "message": "Invalid credentials",
                "details": details,
            }),
            ApiError::InvalidToken { details } => json!({
                "status": "error",
                "message": "Invalid token",
                "details": details,
            }),
            ApiError::Unauthorized(detail) | ApiError::MalformedBody(detail) => {
                json!({ "detail": detail })
            }
            ApiError::Internal(_) => json!({ "detail": "Internal server error" }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}
