//! Custom error types for the converter service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::jwt::JwtError;
use crate::manager::ManagerError;

/// Custom error type for the converter service
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing, invalid or expired credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but the role does not allow it
    #[error("Forbidden")]
    Forbidden,

    /// Request understood but refused, with a machine-readable code
    #[error("{code}")]
    BadRequest {
        code: &'static str,
        reason: Option<String>,
    },

    /// Payload failed validation
    #[error("{0}")]
    Validation(String),

    /// Internal server error
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(code: &'static str) -> Self {
        AppError::BadRequest { code, reason: None }
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::UserAlreadyExists => AppError::bad_request("REGISTER_USER_ALREADY_EXISTS"),
            ManagerError::InvalidRole => AppError::bad_request("REGISTER_INVALID_ROLE"),
            ManagerError::InvalidPassword(reason) => AppError::BadRequest {
                code: "REGISTER_INVALID_PASSWORD",
                reason: Some(reason),
            },
            ManagerError::Validation(message) => AppError::Validation(message),
            ManagerError::Store(err) => AppError::Internal(err),
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        AppError::Internal(err.into())
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        AppError::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
            AppError::Forbidden => (StatusCode::FORBIDDEN, json!({ "error": "Forbidden" })),
            AppError::BadRequest { code, reason } => {
                let mut body = json!({ "error": code });
                if let Some(reason) = reason {
                    body["reason"] = json!(reason);
                }
                (StatusCode::BAD_REQUEST, body)
            }
            AppError::Validation(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": message }))
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for handler results
pub type AppResult<T> = Result<T, AppError>;
