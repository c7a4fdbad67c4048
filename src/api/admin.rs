use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{SessionUser, current_user, start_session};
use super::{ApiError, ApiResponse, AppState, UpdateUserRequest, UserDto, UserListDto};
use crate::services::AccountUpdate;

/// Admin gating: anonymous callers go to the login page, authenticated
/// non-admins go home.
pub async fn require_admin(session: &Session) -> Result<SessionUser, Redirect> {
    match current_user(session).await {
        Some(user) if user.is_admin => Ok(user),
        Some(_) => Err(Redirect::to("/")),
        None => Err(Redirect::to("/login")),
    }
}

/// GET /admin/users
pub async fn list_users(State(state): State<Arc<AppState>>, session: Session) -> Response {
    let _admin = match require_admin(&session).await {
        Ok(user) => user,
        Err(redirect) => return redirect.into_response(),
    };

    match state.auth().list_accounts().await {
        Ok(users) => Json(ApiResponse::success(UserListDto { users })).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// GET /admin/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Response {
    let _admin = match require_admin(&session).await {
        Ok(user) => user,
        Err(redirect) => return redirect.into_response(),
    };

    match state.auth().get_account(id).await {
        Ok(user) => Json(ApiResponse::success(UserDto { user })).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// POST /admin/users/{id}
/// Edit an account. Blank password leaves it unchanged. Editing the
/// logged-in account re-syncs the live session so later authorization
/// checks see the new username/flag.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Response {
    let admin = match require_admin(&session).await {
        Ok(user) => user,
        Err(redirect) => return redirect.into_response(),
    };

    let update = AccountUpdate {
        username: payload.username,
        password: payload.password,
        is_admin: payload.is_admin,
    };

    let updated = match state.auth().update_account(id, update).await {
        Ok(user) => user,
        Err(err) => return ApiError::from(err).into_response(),
    };

    if updated.id == admin.id
        && let Err(err) = start_session(&session, &SessionUser::from(&updated)).await
    {
        return err.into_response();
    }

    tracing::info!("Account {} updated by {}", updated.username, admin.username);

    Json(ApiResponse::success(UserDto { user: updated })).into_response()
}

/// POST /admin/users/{id}/delete
/// Refuses to remove the last admin.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Response {
    let admin = match require_admin(&session).await {
        Ok(user) => user,
        Err(redirect) => return redirect.into_response(),
    };

    if let Err(err) = state.auth().delete_account(id).await {
        return ApiError::from(err).into_response();
    }

    tracing::info!("Account {id} deleted by {}", admin.username);

    Json(ApiResponse::success(serde_json::json!({ "deleted": id }))).into_response()
}
