//! Conversation routes

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{error::ApiError, models::user::User, state::AppState};

/// Pagination query for the messages endpoint
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Initiate or fetch the conversation with another user
///
/// Self-conversations are rejected. The unique pair index makes
/// get-or-create race-safe: both participants initiating concurrently
/// converge on the same row.
pub async fn initiate(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(other_user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if other_user_id == user.id {
        return Err(ApiError::Validation(
            "Cannot create conversation with yourself".to_string(),
        ));
    }

    let other_exists = state
        .user_repository
        .find_by_id(other_user_id)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::Internal(e)
        })?
        .is_some();
    if !other_exists {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let conversation = state
        .conversation_repository
        .get_or_create(user.id, other_user_id)
        .await
        .map_err(|e| {
            error!("Failed to initiate conversation: {}", e);
            ApiError::Internal(e)
        })?;

    let detail = state
        .conversation_repository
        .detail(&conversation)
        .await
        .map_err(|e| {
            error!("Failed to resolve conversation participants: {}", e);
            ApiError::Internal(e)
        })?;

    Ok(Json(json!({
        "message": "Conversation initiated successfully",
        "data": detail
    })))
}

/// All non-archived conversations for the current user
pub async fn get_all(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let conversations = state
        .conversation_repository
        .list_for_user(user.id)
        .await
        .map_err(|e| {
            error!("Failed to fetch conversations: {}", e);
            ApiError::Internal(e)
        })?;

    Ok(Json(json!({
        "message": "Conversations fetched successfully",
        "data": conversations
    })))
}

/// One page of a conversation's messages
///
/// Fetched newest-first, paginated, then reversed so the page reads
/// oldest-first. Viewing marks the user's unread messages from the
/// conversation's participants as read.
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(conversation_id): Path<Uuid>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = state
        .conversation_repository
        .find_by_id(conversation_id)
        .await
        .map_err(|e| {
            error!("Failed to load conversation: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Conversation not found".to_string()))?;

    if !conversation.has_participant(user.id) {
        return Err(ApiError::Forbidden(
            "Unauthorized to access this conversation".to_string(),
        ));
    }

    let page = pagination.page.unwrap_or(1).max(1);
    let limit = pagination.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    let participants = conversation.participants();
    let mut messages = state
        .message_repository
        .list_page(user.id, &participants, limit, offset)
        .await
        .map_err(|e| {
            error!("Failed to fetch messages: {}", e);
            ApiError::Internal(e)
        })?;

    // Read receipts are generated by viewing.
    state
        .message_repository
        .mark_conversation_read(user.id, &participants)
        .await
        .map_err(|e| {
            error!("Failed to mark messages as read: {}", e);
            ApiError::Internal(e)
        })?;

    messages.reverse();

    Ok(Json(json!({
        "message": "Messages fetched successfully",
        "data": messages,
        "pagination": { "page": page, "limit": limit }
    })))
}

/// Mute a conversation for the current user
pub async fn mute(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = state
        .conversation_repository
        .mute(conversation_id, user.id)
        .await
        .map_err(|e| {
            error!("Failed to mute conversation: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Conversation not found".to_string()))?;

    Ok(Json(json!({
        "message": "Conversation muted successfully",
        "data": conversation
    })))
}

/// Unmute a conversation for the current user
pub async fn unmute(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = state
        .conversation_repository
        .unmute(conversation_id, user.id)
        .await
        .map_err(|e| {
            error!("Failed to unmute conversation: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Conversation not found".to_string()))?;

    Ok(Json(json!({
        "message": "Conversation unmuted successfully",
        "data": conversation
    })))
}

/// Archive a conversation for the current user
///
/// There is no unarchive; an archived conversation stays out of the list.
pub async fn archive(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = state
        .conversation_repository
        .archive(conversation_id, user.id)
        .await
        .map_err(|e| {
            error!("Failed to archive conversation: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Conversation not found".to_string()))?;

    Ok(Json(json!({
        "message": "Conversation archived successfully",
        "data": conversation
    })))
}
