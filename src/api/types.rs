use serde::{Deserialize, Serialize};

use crate::services::AccountInfo;

/// Standard JSON envelope: `{"status": "success", ...payload}` or
/// `{"status": "error", "error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,

    #[serde(flatten)]
    pub payload: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_models: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub const fn success(payload: T) -> Self {
        Self {
            status: "success",
            payload: Some(payload),
            error: None,
            allowed_models: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            payload: None,
            error: Some(message.into()),
            allowed_models: None,
        }
    }

    pub fn error_with_models(message: impl Into<String>, models: Option<Vec<String>>) -> Self {
        Self {
            status: "error",
            payload: None,
            error: Some(message.into()),
            allowed_models: models,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// Chat request body. Unknown fields are ignored rather than trusted.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub user: AccountInfo,
}

#[derive(Debug, Serialize)]
pub struct UserListDto {
    pub users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    /// Blank or absent leaves the password unchanged.
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// Bare response for `GET /models` (not enveloped).
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub provider: String,
    pub allowed_models: Option<Vec<String>>,
    pub note: String,
}
