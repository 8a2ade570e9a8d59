//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::user::{NewUser, PublicProfile, UpdateProfileRequest, User};

const USER_COLUMNS: &str = "id, name, age, email, password_hash, location, bio, interests, \
     profile_url, profile_images, created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    ///
    /// The email is stored trimmed and lowercased; the password is stored
    /// as an argon2 hash. A duplicate email surfaces as a unique-violation
    /// database error.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        info!("Creating new user: {}", new_user.email);

        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, age, email, password_hash, location, bio, interests, profile_url, profile_images)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&new_user.name)
        .bind(new_user.age)
        .bind(new_user.email.trim().to_lowercase())
        .bind(&password_hash)
        .bind(&new_user.location)
        .bind(&new_user.bio)
        .bind(&new_user.interests)
        .bind(&new_user.profile_url)
        .bind(&new_user.profile_images)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_user(&row))
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1
            "#,
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| map_user(&row)))
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| map_user(&row)))
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        let result = argon2.verify_password(password.as_bytes(), &parsed_hash);

        Ok(result.is_ok())
    }

    /// Public profiles of every user except the given one
    pub async fn discover(&self, excluding: Uuid) -> Result<Vec<PublicProfile>> {
        let profiles = sqlx::query_as::<_, PublicProfile>(
            r#"
            SELECT id, name, profile_url, age, location, bio, interests, profile_images
            FROM users
            WHERE id <> $1
            "#,
        )
        .bind(excluding)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    /// Public profile projection of a single user
    pub async fn find_public_profile(&self, id: Uuid) -> Result<Option<PublicProfile>> {
        let profile = sqlx::query_as::<_, PublicProfile>(
            r#"
            SELECT id, name, profile_url, age, location, bio, interests, profile_images
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Apply a whitelisted profile update and return the updated projection
    ///
    /// Omitted fields keep their current value.
    pub async fn update_profile(
        &self,
        id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Option<PublicProfile>> {
        info!("Updating profile for user: {}", id);

        let profile = sqlx::query_as::<_, PublicProfile>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                age = COALESCE($3, age),
                location = COALESCE($4, location),
                bio = COALESCE($5, bio),
                interests = COALESCE($6, interests),
                profile_url = COALESCE($7, profile_url),
                profile_images = COALESCE($8, profile_images),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, profile_url, age, location, bio, interests, profile_images
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(update.age)
        .bind(&update.location)
        .bind(&update.bio)
        .bind(&update.interests)
        .bind(&update.profile_url)
        .bind(&update.profile_images)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}

fn map_user(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        age: row.get("age"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        location: row.get("location"),
        bio: row.get("bio"),
        interests: row.get("interests"),
        profile_url: row.get("profile_url"),
        profile_images: row.get("profile_images"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
