use axum::{Json, extract::State, response::Redirect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, LoginRequest, SignupRequest, UserDto};
use crate::services::AccountInfo;

/// Session key for the logged-in account.
const SESSION_USER_KEY: &str = "user";

/// Account snapshot carried by the session cookie's server-side record.
/// Re-synced when an admin edits the logged-in account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
}

impl From<&AccountInfo> for SessionUser {
    fn from(account: &AccountInfo) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            is_admin: account.is_admin,
        }
    }
}

/// Read the current session user, treating session-store failures as
/// anonymous rather than erroring the request.
pub async fn current_user(session: &Session) -> Option<SessionUser> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .ok()
        .flatten()
}

/// Session user or a structured 401 for JSON routes.
pub async fn require_user(session: &Session) -> Result<SessionUser, ApiError> {
    current_user(session)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}

pub async fn start_session(session: &Session, user: &SessionUser) -> Result<(), ApiError> {
    session
        .insert(SESSION_USER_KEY, user)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to create session: {e}")))
}

/// POST /login
/// Verify credentials, start a session, return the account.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::ValidationError("Username is required".to_string()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::ValidationError("Password is required".to_string()));
    }

    let account = state
        .auth()
        .login(&payload.username, &payload.password)
        .await?;

    start_session(&session, &SessionUser::from(&account)).await?;

    tracing::info!("User logged in: {}", account.username);

    Ok(Json(ApiResponse::success(UserDto { user: account })))
}

/// POST /signup
/// Create an account, start a session, return the account.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let account = state
        .auth()
        .signup(&payload.username, &payload.password)
        .await?;

    start_session(&session, &SessionUser::from(&account)).await?;

    tracing::info!("User signed up: {}", account.username);

    Ok(Json(ApiResponse::success(UserDto { user: account })))
}

/// GET|POST /logout
/// Invalidate the current session and go home.
pub async fn logout(session: Session) -> Redirect {
    let _ = session.flush().await;
    Redirect::to("/")
}
