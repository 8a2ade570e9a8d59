//! Message routes

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::message::{
        AddReactionRequest, EditMessageRequest, MessageType, SendMessageRequest, preview,
        within_edit_window,
    },
    models::user::User,
    state::AppState,
};

/// Send a message in a conversation
///
/// The receiver is derived as the other participant. The message insert
/// and the denormalized conversation-summary update are two independent
/// writes; a crash in between leaves the summary stale but never corrupts
/// the message log.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = payload.content.trim().to_string();
    if content.is_empty() {
        return Err(ApiError::Validation(
            "conversationId and content are required".to_string(),
        ));
    }

    let message_type = match payload.message_type.as_deref() {
        None | Some("") => MessageType::Text,
        Some(raw) => raw.parse().map_err(ApiError::Validation)?,
    };

    let conversation = state
        .conversation_repository
        .find_by_id(payload.conversation_id)
        .await
        .map_err(|e| {
            error!("Failed to load conversation: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Conversation not found".to_string()))?;

    if !conversation.has_participant(user.id) {
        return Err(ApiError::Forbidden(
            "Unauthorized to send message in this conversation".to_string(),
        ));
    }

    let receiver = conversation.other_participant(user.id);

    let message = state
        .message_repository
        .insert(user.id, receiver, &content, message_type)
        .await
        .map_err(|e| {
            error!("Failed to send message: {}", e);
            ApiError::Internal(e)
        })?;

    state
        .conversation_repository
        .update_last_message(conversation.id, message.id, &preview(&content), user.id)
        .await
        .map_err(|e| {
            error!("Failed to update conversation summary: {}", e);
            ApiError::Internal(e)
        })?;

    let view = state
        .message_repository
        .view(message.id)
        .await
        .map_err(|e| {
            error!("Failed to load sent message: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Message sent successfully", "data": view })),
    ))
}

/// Edit a message
///
/// Only the sender may edit, and only within 15 minutes of creation. No
/// history of the previous content is kept.
pub async fn edit_message(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(message_id): Path<Uuid>,
    Json(payload): Json<EditMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = payload.content.trim().to_string();
    if content.is_empty() {
        return Err(ApiError::Validation("Content is required".to_string()));
    }

    let message = state
        .message_repository
        .find_by_id(message_id)
        .await
        .map_err(|e| {
            error!("Failed to load message: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    if message.from_user != user.id {
        return Err(ApiError::Forbidden(
            "Unauthorized to edit this message".to_string(),
        ));
    }

    if !within_edit_window(message.created_at, Utc::now()) {
        return Err(ApiError::Validation(
            "Cannot edit message older than 15 minutes".to_string(),
        ));
    }

    state
        .message_repository
        .update_content(message.id, &content)
        .await
        .map_err(|e| {
            error!("Failed to edit message: {}", e);
            ApiError::Internal(e)
        })?;

    let view = state
        .message_repository
        .view(message.id)
        .await
        .map_err(|e| {
            error!("Failed to load edited message: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    Ok(Json(json!({ "message": "Message edited successfully", "data": view })))
}

/// Soft-delete a message
///
/// The content is replaced with a fixed placeholder; the original text is
/// unrecoverable. Repeating the deletion succeeds with the same effect.
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .message_repository
        .find_by_id(message_id)
        .await
        .map_err(|e| {
            error!("Failed to load message: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    if message.from_user != user.id {
        return Err(ApiError::Forbidden(
            "Unauthorized to delete this message".to_string(),
        ));
    }

    state
        .message_repository
        .soft_delete(message.id)
        .await
        .map_err(|e| {
            error!("Failed to delete message: {}", e);
            ApiError::Internal(e)
        })?;

    Ok(Json(json!({ "message": "Message deleted successfully" })))
}

/// Mark messages as read
///
/// Marks every unread message addressed to the user as read, regardless
/// of the conversation in the path.
pub async fn mark_as_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(_conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let modified = state
        .message_repository
        .mark_all_read(user.id)
        .await
        .map_err(|e| {
            error!("Failed to mark messages as read: {}", e);
            ApiError::Internal(e)
        })?;

    Ok(Json(json!({
        "message": "Messages marked as read",
        "data": { "modifiedCount": modified }
    })))
}

/// Add an emoji reaction to a message
///
/// At most one reaction per (emoji, user) pair; a duplicate is rejected.
pub async fn add_reaction(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(message_id): Path<Uuid>,
    Json(payload): Json<AddReactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let emoji = payload.emoji.trim().to_string();
    if emoji.is_empty() {
        return Err(ApiError::Validation("Emoji is required".to_string()));
    }

    ensure_message_exists(&state, message_id).await?;

    let added = state
        .message_repository
        .add_reaction(message_id, user.id, &emoji)
        .await
        .map_err(|e| {
            error!("Failed to add reaction: {}", e);
            ApiError::Internal(e)
        })?;

    if !added {
        return Err(ApiError::Validation(
            "You already reacted with this emoji".to_string(),
        ));
    }

    let view = message_view(&state, message_id).await?;

    Ok(Json(json!({ "message": "Reaction added successfully", "data": view })))
}

/// Remove an emoji reaction from a message
///
/// Removing a reaction that does not exist succeeds silently.
pub async fn remove_reaction(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((message_id, emoji)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_message_exists(&state, message_id).await?;

    state
        .message_repository
        .remove_reaction(message_id, user.id, &emoji)
        .await
        .map_err(|e| {
            error!("Failed to remove reaction: {}", e);
            ApiError::Internal(e)
        })?;

    let view = message_view(&state, message_id).await?;

    Ok(Json(json!({ "message": "Reaction removed successfully", "data": view })))
}

async fn ensure_message_exists(state: &AppState, message_id: Uuid) -> Result<(), ApiError> {
    state
        .message_repository
        .find_by_id(message_id)
        .await
        .map_err(|e| {
            error!("Failed to load message: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;
    Ok(())
}

async fn message_view(
    state: &AppState,
    message_id: Uuid,
) -> Result<crate::models::message::MessageView, ApiError> {
    state
        .message_repository
        .view(message_id)
        .await
        .map_err(|e| {
            error!("Failed to load message: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))
}
