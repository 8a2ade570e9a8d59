//! Profile routes

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::user::{UpdateProfileRequest, User},
    state::AppState,
    validation::{validate_age, validate_bio},
};

/// The current user's own profile
pub async fn get_profile(Extension(user): Extension<User>) -> impl IntoResponse {
    Json(json!({ "message": "Profile fetched successfully", "user": user }))
}

/// Another user's public profile (no password, no email)
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .user_repository
        .find_public_profile(user_id)
        .await
        .map_err(|e| {
            error!("Failed to fetch user profile: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "message": "User profile fetched successfully",
        "data": profile
    })))
}

/// Update the current user's profile
///
/// Only the whitelisted fields are mutable; age and bio are re-validated.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(age) = payload.age {
        validate_age(age).map_err(ApiError::Validation)?;
    }
    if let Some(bio) = &payload.bio {
        validate_bio(bio).map_err(ApiError::Validation)?;
    }
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("Name cannot be empty".to_string()));
        }
    }

    let updated = state
        .user_repository
        .update_profile(user.id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to update profile: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": updated
    })))
}
