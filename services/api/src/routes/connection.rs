//! Connection request routes

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
    models::connection::{ConnectionStatus, RespondAction},
    models::user::User,
    state::AppState,
};

/// Act on another user's profile
///
/// `ignored` is acknowledged without persistence; `interested` records a
/// directed request; `accepted` performs the mirror lookup only;
/// `rejected` is acknowledged as sent. Duplicate requests from the same
/// sender to the same receiver are not prevented.
pub async fn send_request(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((status, to_user_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let status: ConnectionStatus = status.parse().map_err(ApiError::Validation)?;

    let body = match status {
        ConnectionStatus::Ignored => json!({ "message": "Request ignored" }),
        ConnectionStatus::Interested => {
            state
                .connection_repository
                .create(user.id, to_user_id, status)
                .await
                .map_err(|e| {
                    if is_foreign_key_violation(&e) {
                        ApiError::NotFound("User not found".to_string())
                    } else {
                        error!("Failed to record connection request: {}", e);
                        ApiError::Internal(e)
                    }
                })?;
            json!({ "message": "Connection request sent successfully" })
        }
        ConnectionStatus::Accepted => {
            // Mirror lookup only; nothing is written for this status at
            // send time.
            let _mutual = state
                .connection_repository
                .mirror_exists(user.id, to_user_id, ConnectionStatus::Accepted)
                .await
                .map_err(|e| {
                    error!("Failed to look up mirror request: {}", e);
                    ApiError::Internal(e)
                })?;
            json!({ "message": "Request accepted" })
        }
        ConnectionStatus::Rejected => json!({ "message": "Request sent successfully" }),
    };

    Ok(Json(body))
}

/// All requests addressed to the current user, with sender profiles
pub async fn get_received(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let data = state
        .connection_repository
        .received_for(user.id)
        .await
        .map_err(|e| {
            error!("Failed to fetch received connection requests: {}", e);
            ApiError::Internal(e)
        })?;

    Ok(Json(json!({
        "message": "Received connection requests fetched successfully",
        "data": data
    })))
}

/// Accept or reject a received request
///
/// Only the receiving user may respond; no reverse-direction request is
/// created, mutuality stays a read-time derivation.
pub async fn respond(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((request_id, action)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let action: RespondAction = action
        .parse()
        .map_err(|_| ApiError::Validation("Invalid action".to_string()))?;

    let request = state
        .connection_repository
        .find_by_id(request_id)
        .await
        .map_err(|e| {
            error!("Failed to load connection request: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::NotFound("Connection request not found".to_string()))?;

    if request.to_user != user.id {
        return Err(ApiError::Forbidden("Unauthorized".to_string()));
    }

    let updated = state
        .connection_repository
        .set_status(request_id, action.resulting_status())
        .await
        .map_err(|e| {
            error!("Failed to update connection request: {}", e);
            ApiError::Internal(e)
        })?;

    let message = match action {
        RespondAction::Accept => "Request accepted successfully",
        RespondAction::Reject => "Request rejected successfully",
    };

    Ok(Json(json!({ "message": message, "data": updated })))
}

fn is_foreign_key_violation(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_foreign_key_violation()
    )
}
