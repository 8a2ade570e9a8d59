//! User model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User entity
///
/// The password hash is never serialized outward.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    #[serde(rename = "emailId")]
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub location: String,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    #[serde(rename = "profileURL")]
    pub profile_url: Option<String>,
    pub profile_images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user creation payload, assembled from the multipart signup form
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub age: i32,
    pub email: String,
    pub password: String,
    pub location: String,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub profile_url: Option<String>,
    pub profile_images: Vec<String>,
}

/// Public profile projection shown to other users
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "profileURL")]
    pub profile_url: Option<String>,
    pub age: i32,
    pub location: String,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub profile_images: Vec<String>,
}

/// Minimal user projection embedded in message payloads
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub profile_images: Vec<String>,
}

/// Whitelisted profile update payload
///
/// Only these fields are mutable; omitted fields are left untouched.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
    #[serde(rename = "profileURL")]
    pub profile_url: Option<String>,
    pub profile_images: Option<Vec<String>>,
}

/// User login credentials
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "emailId")]
    pub email: String,
    pub password: String,
}
