//! Connection request repository
//!
//! The ledger of directed connection requests. Mutuality ("matches") is
//! never stored; it is derived by looking up the mirror request at read
//! time.

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::connection::{ConnectionRequest, ConnectionStatus, ReceivedRequest};
use crate::models::user::PublicProfile;

/// Connection request repository
#[derive(Clone)]
pub struct ConnectionRepository {
    pool: PgPool,
}

impl ConnectionRepository {
    /// Create a new connection repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new directed request
    ///
    /// Duplicate requests for the same (from, to) pair are allowed.
    pub async fn create(
        &self,
        from_user: Uuid,
        to_user: Uuid,
        status: ConnectionStatus,
    ) -> Result<ConnectionRequest> {
        info!(
            "Recording connection request {} -> {} ({})",
            from_user, to_user, status
        );

        let row = sqlx::query(
            r#"
            INSERT INTO connection_requests (from_user, to_user, status)
            VALUES ($1, $2, $3)
            RETURNING id, from_user, to_user, status, created_at
            "#,
        )
        .bind(from_user)
        .bind(to_user)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        map_request(&row)
    }

    /// Whether the mirror request (to -> from) with the given status exists
    pub async fn mirror_exists(
        &self,
        from_user: Uuid,
        to_user: Uuid,
        status: ConnectionStatus,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM connection_requests
                WHERE from_user = $1 AND to_user = $2 AND status = $3
            )
            "#,
        )
        .bind(to_user)
        .bind(from_user)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// All requests addressed to the given user, newest first, with the
    /// sender's public profile joined in
    pub async fn received_for(&self, user_id: Uuid) -> Result<Vec<ReceivedRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.from_user, c.to_user, c.status, c.created_at,
                   u.name, u.profile_url, u.age, u.location, u.bio, u.interests, u.profile_images
            FROM connection_requests c
            JOIN users u ON u.id = c.from_user
            WHERE c.to_user = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let status: String = row.get("status");
                Ok(ReceivedRequest {
                    id: row.get("id"),
                    from_user: row.get("from_user"),
                    to_user: row.get("to_user"),
                    status: status.parse().map_err(anyhow::Error::msg)?,
                    created_at: row.get("created_at"),
                    from_user_details: PublicProfile {
                        id: row.get("from_user"),
                        name: row.get("name"),
                        profile_url: row.get("profile_url"),
                        age: row.get("age"),
                        location: row.get("location"),
                        bio: row.get("bio"),
                        interests: row.get("interests"),
                        profile_images: row.get("profile_images"),
                    },
                })
            })
            .collect()
    }

    /// Find a request by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ConnectionRequest>> {
        let row = sqlx::query(
            r#"
            SELECT id, from_user, to_user, status, created_at
            FROM connection_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_request(&row)).transpose()
    }

    /// Persist a status transition on an existing request
    pub async fn set_status(&self, id: Uuid, status: ConnectionStatus) -> Result<ConnectionRequest> {
        info!("Setting connection request {} status to {}", id, status);

        let row = sqlx::query(
            r#"
            UPDATE connection_requests
            SET status = $2
            WHERE id = $1
            RETURNING id, from_user, to_user, status, created_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        map_request(&row)
    }
}

fn map_request(row: &PgRow) -> Result<ConnectionRequest> {
    let status: String = row.get("status");
    Ok(ConnectionRequest {
        id: row.get("id"),
        from_user: row.get("from_user"),
        to_user: row.get("to_user"),
        status: status.parse().map_err(anyhow::Error::msg)?,
        created_at: row.get("created_at"),
    })
}
