//! Dashboard repository
//!
//! Read-only aggregation over the connection ledger and the message store.
//! Everything is recomputed per request; mutual matches are derived with a
//! correlated mirror-request lookup, never stored.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Profile card for a recent mutual match
#[derive(Debug, Clone)]
pub struct RecentMatchRow {
    pub other_user_id: Uuid,
    pub name: String,
    pub age: i32,
    pub location: String,
    pub profile_url: Option<String>,
    pub profile_images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A single activity feed source row
#[derive(Debug, Clone)]
pub struct ActivityRow {
    pub other_user_name: String,
    pub created_at: DateTime<Utc>,
}

/// Dashboard repository
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    /// Create a new dashboard repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinct users who sent the given user any connection request in the
    /// window ("profile views" proxy)
    pub async fn distinct_inbound_senders(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT from_user)
            FROM connection_requests
            WHERE to_user = $1
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Accepted requests involving the user whose mirror is also accepted
    ///
    /// Counts candidate rows, not pairs: when both directions fall inside
    /// the window, each contributes.
    pub async fn mutual_accepted_count(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM connection_requests c
            WHERE (c.from_user = $1 OR c.to_user = $1)
              AND c.status = 'accepted'
              AND ($2::timestamptz IS NULL OR c.created_at >= $2)
              AND ($3::timestamptz IS NULL OR c.created_at < $3)
              AND EXISTS (
                  SELECT 1 FROM connection_requests m
                  WHERE m.from_user = c.to_user
                    AND m.to_user = c.from_user
                    AND m.status = 'accepted'
              )
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Messages addressed to the user in the window, deleted excluded
    pub async fn inbound_message_count(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE to_user = $1
              AND is_deleted = FALSE
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// "Interested" requests addressed to the user in the window (likes)
    pub async fn inbound_interested_count(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM connection_requests
            WHERE to_user = $1
              AND status = 'interested'
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Unread, non-deleted messages addressed to the user
    pub async fn unread_message_count(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE to_user = $1 AND is_read = FALSE AND is_deleted = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// The most recent mutual matches, resolved to the other user's profile
    ///
    /// A candidate row matches when its mirror exists with an
    /// interested/accepted status of its own.
    pub async fn recent_matches(&self, user_id: Uuid, limit: i64) -> Result<Vec<RecentMatchRow>> {
        let rows = sqlx::query(
            r#"
            SELECT c.created_at, u.id AS other_user_id, u.name, u.age, u.location,
                   u.profile_url, u.profile_images
            FROM connection_requests c
            JOIN users u ON u.id = CASE WHEN c.from_user = $1 THEN c.to_user ELSE c.from_user END
            WHERE (c.from_user = $1 OR c.to_user = $1)
              AND c.status IN ('interested', 'accepted')
              AND EXISTS (
                  SELECT 1 FROM connection_requests m
                  WHERE m.from_user = c.to_user
                    AND m.to_user = c.from_user
                    AND m.status IN ('interested', 'accepted')
              )
            ORDER BY c.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let matches = rows
            .iter()
            .map(|row| RecentMatchRow {
                other_user_id: row.get("other_user_id"),
                name: row.get("name"),
                age: row.get("age"),
                location: row.get("location"),
                profile_url: row.get("profile_url"),
                profile_images: row.get("profile_images"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(matches)
    }

    /// Mutual accepted matches in the window, for the activity feed
    pub async fn recent_match_activity(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityRow>> {
        let rows = sqlx::query(
            r#"
            SELECT c.created_at,
                   CASE WHEN c.from_user = $1 THEN tu.name ELSE fu.name END AS other_user_name
            FROM connection_requests c
            JOIN users fu ON fu.id = c.from_user
            JOIN users tu ON tu.id = c.to_user
            WHERE (c.from_user = $1 OR c.to_user = $1)
              AND c.status = 'accepted'
              AND c.created_at >= $2
              AND EXISTS (
                  SELECT 1 FROM connection_requests m
                  WHERE m.from_user = c.to_user
                    AND m.to_user = c.from_user
                    AND m.status = 'accepted'
              )
            ORDER BY c.created_at DESC
            LIMIT 5
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(map_activity(rows))
    }

    /// Inbound likes in the window, for the activity feed
    pub async fn recent_like_activity(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityRow>> {
        let rows = sqlx::query(
            r#"
            SELECT c.created_at, u.name AS other_user_name
            FROM connection_requests c
            JOIN users u ON u.id = c.from_user
            WHERE c.to_user = $1
              AND c.status = 'interested'
              AND c.created_at >= $2
            ORDER BY c.created_at DESC
            LIMIT 5
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(map_activity(rows))
    }

    /// Latest inbound message per sender in the window, for the activity
    /// feed
    pub async fn recent_message_activity(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityRow>> {
        let rows = sqlx::query(
            r#"
            SELECT created_at, other_user_name FROM (
                SELECT DISTINCT ON (m.from_user) m.created_at, u.name AS other_user_name
                FROM messages m
                JOIN users u ON u.id = m.from_user
                WHERE m.to_user = $1
                  AND m.created_at >= $2
                  AND m.is_deleted = FALSE
                ORDER BY m.from_user, m.created_at DESC
            ) latest
            ORDER BY created_at DESC
            LIMIT 5
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(map_activity(rows))
    }
}

fn map_activity(rows: Vec<sqlx::postgres::PgRow>) -> Vec<ActivityRow> {
    rows.iter()
        .map(|row| ActivityRow {
            other_user_name: row.get("other_user_name"),
            created_at: row.get("created_at"),
        })
        .collect()
}
