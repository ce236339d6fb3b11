use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

/// Request-level failure taxonomy.
///
/// Every variant carries a stable category code and maps to one
/// transport status; handlers return these and the boundary serializes
/// them uniformly as `{"success": false, "message", "code"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input. All violations are collected and reported
    /// together, not short-circuited on the first.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Access denied. No token provided")]
    NoToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    /// Token verified but its subject no longer exists in the store.
    #[error("User not found")]
    UnknownSubject,

    /// Login failure. Deliberately identical for unknown email and
    /// wrong password so accounts cannot be enumerated.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is deactivated. Contact administrator")]
    AccountDeactivated,

    #[error("Access denied. Insufficient permissions")]
    RoleNotPermitted,

    #[error("Cannot modify your own status")]
    SelfModification,

    #[error("Current password is incorrect")]
    CurrentPasswordIncorrect,

    #[error("Email already in use")]
    EmailInUse,

    #[error("User not found")]
    NotFound,

    /// Backend deadline hit; the request is safe to retry.
    #[error("Service temporarily unavailable")]
    Unavailable,

    /// Unexpected fault. The source chain is logged, never sent to the
    /// caller.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::SelfModification
            | ApiError::CurrentPasswordIncorrect => StatusCode::BAD_REQUEST,
            ApiError::NoToken
            | ApiError::InvalidToken
            | ApiError::TokenExpired
            | ApiError::UnknownSubject
            | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::AccountDeactivated | ApiError::RoleNotPermitted => StatusCode::FORBIDDEN,
            ApiError::EmailInUse => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_FAILED",
            ApiError::NoToken => "NO_TOKEN",
            ApiError::InvalidToken => "INVALID_TOKEN",
            ApiError::TokenExpired => "TOKEN_EXPIRED",
            ApiError::UnknownSubject => "UNKNOWN_SUBJECT",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            ApiError::RoleNotPermitted => "ROLE_NOT_PERMITTED",
            ApiError::SelfModification => "SELF_MODIFICATION",
            ApiError::CurrentPasswordIncorrect => "CURRENT_PASSWORD_INCORRECT",
            ApiError::EmailInUse => "EMAIL_IN_USE",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::Unavailable => "UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::EmailInUse,
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Timeout => ApiError::Unavailable,
            StoreError::Database(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            // Full chain goes to the log; the caller only sees the
            // generic message.
            error!(code = self.code(), error = ?self, "request failed");
        }
        let mut body = json!({
            "success": false,
            "message": self.to_string(),
            "code": self.code(),
        });
        if let ApiError::Validation(errors) = &self {
            body["errors"] = json!(errors);
        }
        (status, Json(body)).into_response()
    }
}

/// Success envelope mirroring the error shape on the wire.
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiSuccess<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}
