use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::require_user;
use super::{ApiError, ApiResponse, AppState, ChatRequest, ChatResponse, ModelsResponse};

/// POST /chat
/// Session-gated pass-through to the provider gateway.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatResponse>>, ApiError> {
    let user = require_user(&session).await?;

    if payload.message.trim().is_empty() {
        return Err(ApiError::ValidationError("Message is required".to_string()));
    }

    tracing::debug!("Chat message from {}", user.username);

    let response = state
        .chat()
        .send_message(&payload.message, payload.model.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(ChatResponse { response })))
}

/// OPTIONS /chat — CORS preflight.
pub async fn chat_options() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// GET /models
/// Current provider and its allow-list.
pub async fn models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    let allowed_models = state.chat().allowed_models();

    let note = if allowed_models.is_some() {
        "Only the listed models are accepted".to_string()
    } else {
        "Any model accepted; server default applies when none is sent".to_string()
    };

    Json(ModelsResponse {
        provider: state.chat().provider_kind().to_string(),
        allowed_models,
        note,
    })
}
