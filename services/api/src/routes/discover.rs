//! Discover feed route

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::error;

use crate::{error::ApiError, models::user::User, state::AppState};

/// Public profiles of every user except the caller
pub async fn get_discover(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.user_repository.discover(user.id).await.map_err(|e| {
        error!("Failed to fetch discover users: {}", e);
        ApiError::Internal(e)
    })?;

    Ok(Json(json!({
        "message": "Discover fetched successfully",
        "users": users
    })))
}
