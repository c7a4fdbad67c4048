use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AuthError, ChatError};

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),

    ValidationError(String),

    /// Model-selection failure; carries the allow-list when one applies.
    ModelSelection {
        message: String,
        allowed_models: Option<Vec<String>>,
    },

    Conflict(String),

    NotFound(String),

    /// Upstream provider failure, carrying status and body.
    UpstreamError(String),

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::ModelSelection { message, .. } => write!(f, "{message}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::UpstreamError(msg) => write!(f, "Provider error: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ApiResponse::error(msg)),
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, ApiResponse::error(msg)),
            Self::ModelSelection {
                message,
                allowed_models,
            } => (
                StatusCode::BAD_REQUEST,
                ApiResponse::error_with_models(message, allowed_models),
            ),
            Self::Conflict(msg) => (StatusCode::CONFLICT, ApiResponse::error(msg)),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, ApiResponse::error(msg)),
            Self::UpstreamError(msg) => {
                tracing::warn!("Provider error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, ApiResponse::error(msg))
            }
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::error("A database error occurred"),
                )
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::error("An internal error occurred"),
                )
            }
        };

        (status, Json::<ApiResponse<()>>(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::DuplicateUsername(_) => Self::Conflict(err.to_string()),
            AuthError::LastAdminDeletion => Self::ValidationError(err.to_string()),
            AuthError::UserNotFound(_) => Self::NotFound(err.to_string()),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::NoModelSelected { allowed_models } => Self::ModelSelection {
                message: "No model selected and no default model configured".to_string(),
                allowed_models,
            },
            ChatError::ModelNotAllowed {
                ref model,
                ref allowed_models,
            } => Self::ModelSelection {
                message: format!("Model '{model}' is not in the allowed model list"),
                allowed_models: Some(allowed_models.clone()),
            },
            ChatError::Provider(e) => Self::UpstreamError(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}
