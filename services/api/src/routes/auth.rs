//! Authentication routes: signup, login, logout, token verification

use axum::{
    Extension, Json,
    extract::{Multipart, State, multipart::Field},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::ApiError,
    models::user::{LoginRequest, NewUser, User},
    state::AppState,
    uploads::MAX_SIGNUP_PHOTOS,
    validation::{validate_age, validate_bio, validate_email, validate_password},
};

/// Name of the cookie carrying the signed token
const TOKEN_COOKIE: &str = "token";

/// User signup endpoint
///
/// Accepts a multipart form with the profile fields and up to five
/// `photos` file parts, which are persisted to the upload store and
/// recorded on the new profile.
pub async fn signup(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut name = None;
    let mut age = None;
    let mut email = None;
    let mut password = None;
    let mut location = None;
    let mut bio = None;
    let mut interests: Vec<String> = Vec::new();
    let mut profile_url = None;
    let mut photos: Vec<(Option<String>, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart payload: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => name = Some(read_text(field).await?),
            "age" => {
                let raw = read_text(field).await?;
                age = Some(
                    raw.trim()
                        .parse::<i32>()
                        .map_err(|_| ApiError::Validation("Age must be a number".to_string()))?,
                );
            }
            "emailId" => email = Some(read_text(field).await?),
            "password" => password = Some(read_text(field).await?),
            "location" => location = Some(read_text(field).await?),
            "bio" => bio = Some(read_text(field).await?),
            "interests" => {
                let raw = read_text(field).await?;
                interests.extend(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from),
                );
            }
            "profileURL" => profile_url = Some(read_text(field).await?),
            "photos" => {
                if photos.len() >= MAX_SIGNUP_PHOTOS {
                    return Err(ApiError::Validation(format!(
                        "A maximum of {} photos can be uploaded",
                        MAX_SIGNUP_PHOTOS
                    )));
                }
                let file_name = field.file_name().map(|s| s.to_string());
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::Validation(format!("Failed to read photo upload: {}", e))
                })?;
                photos.push((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let name = name
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Name is required".to_string()))?;
    let email = email.ok_or_else(|| ApiError::Validation("Email is required".to_string()))?;
    validate_email(email.trim()).map_err(ApiError::Validation)?;
    let password =
        password.ok_or_else(|| ApiError::Validation("Password is required".to_string()))?;
    validate_password(&password).map_err(ApiError::Validation)?;
    let age = age.ok_or_else(|| ApiError::Validation("Age is required".to_string()))?;
    validate_age(age).map_err(ApiError::Validation)?;
    let location = location
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Location is required".to_string()))?;
    if let Some(bio) = &bio {
        validate_bio(bio).map_err(ApiError::Validation)?;
    }

    let mut profile_images = Vec::new();
    for (file_name, bytes) in &photos {
        let url = state
            .uploads
            .save_photo(file_name.as_deref(), bytes)
            .await
            .map_err(|e| {
                error!("Failed to store signup photo: {}", e);
                ApiError::Internal(e)
            })?;
        profile_images.push(url);
    }

    let new_user = NewUser {
        name,
        age,
        email,
        password,
        location,
        bio,
        interests,
        profile_url,
        profile_images,
    };

    let user = state.user_repository.create(&new_user).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict {
                field: "emailId".to_string(),
            }
        } else {
            error!("Failed to create user: {}", e);
            ApiError::Internal(e)
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User added successfully!", "data": user })),
    ))
}

/// User login endpoint
///
/// On success the signed token is set as an HTTP-only, secure,
/// cross-site cookie and also returned in the body.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    info!("Login attempt for user: {}", payload.email);

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::Internal(e)
        })?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let password_ok = state
        .user_repository
        .verify_password(&user, &payload.password)
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            ApiError::Internal(e)
        })?;

    if !password_ok {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = state.jwt_service.sign(user.id).map_err(|e| {
        error!("Failed to sign token: {}", e);
        ApiError::Internal(e)
    })?;

    let jar = jar.add(auth_cookie(token.clone()));

    Ok((jar, Json(json!({ "token": token, "user": user }))))
}

/// Logout endpoint: clears the token cookie
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build((TOKEN_COOKIE, "")).path("/").build());
    (jar, Json(json!({ "message": "Logged out successfully" })))
}

/// Return the user resolved from the token cookie
pub async fn verify_token(Extension(user): Extension<User>) -> impl IntoResponse {
    Json(json!({ "message": "Token verified successfully", "user": user }))
}

/// Password reset placeholder
pub async fn forget_password() -> impl IntoResponse {
    Json(json!({ "message": "Password reset is not available yet" }))
}

fn auth_cookie(token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .build()
}

async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart payload: {}", e)))
}

fn is_unique_violation(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}
