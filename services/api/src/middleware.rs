//! Authentication middleware
//!
//! Verifies the signed `token` cookie on each request and resolves it to a
//! user row, which is injected into request extensions for handlers.

use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;

use crate::{error::ApiError, jwt::TokenError, state::AppState};

/// Extract and validate the token cookie, then load the current user
///
/// Absence, invalidity and expiry of the token each produce a distinct
/// 401 response.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get("token")
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| ApiError::Unauthorized("Authentication token missing".to_string()))?;

    let claims = state.jwt_service.verify(&token).map_err(|e| match e {
        TokenError::Expired => ApiError::Unauthorized("Authentication token expired".to_string()),
        TokenError::Invalid => ApiError::Unauthorized("Invalid authentication token".to_string()),
    })?;

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to load user for token: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::Unauthorized("Invalid authentication token".to_string()))?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
