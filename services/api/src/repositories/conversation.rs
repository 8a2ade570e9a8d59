//! Conversation repository
//!
//! One row per unordered participant pair, holding the denormalized
//! last-message summary and the per-user mute/block/archive sets.

use anyhow::Result;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::conversation::{
    Conversation, ConversationDetail, ConversationSummary, ParticipantProfile, SenderBrief,
    UnreadCount, ordered_pair,
};

/// Conversation repository
#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    /// Create a new conversation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the conversation for a participant pair, creating it if absent
    ///
    /// The pair is canonicalized before the insert, and the unique pair
    /// index makes concurrent initiation from both sides converge on a
    /// single row.
    pub async fn get_or_create(&self, a: Uuid, b: Uuid) -> Result<Conversation> {
        let (user_one, user_two) = ordered_pair(a, b);

        let inserted = sqlx::query(
            r#"
            INSERT INTO conversations (user_one, user_two)
            VALUES ($1, $2)
            ON CONFLICT (user_one, user_two) DO NOTHING
            "#,
        )
        .bind(user_one)
        .bind(user_two)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() > 0 {
            info!("Created conversation for pair {} / {}", user_one, user_two);
        }

        let conversation = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE user_one = $1 AND user_two = $2
            "#,
        )
        .bind(user_one)
        .bind(user_two)
        .fetch_one(&self.pool)
        .await?;

        Ok(conversation)
    }

    /// Find a conversation by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>> {
        let conversation =
            sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(conversation)
    }

    /// Resolve participant profiles and the last-message sender for a
    /// conversation
    pub async fn detail(&self, conversation: &Conversation) -> Result<ConversationDetail> {
        let participants = conversation.participants();
        let rows = sqlx::query(
            r#"
            SELECT id, name, profile_images, age, location
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(&participants[..])
        .fetch_all(&self.pool)
        .await?;

        let participants = rows
            .iter()
            .map(|row| ParticipantProfile {
                id: row.get("id"),
                name: row.get("name"),
                profile_images: row.get("profile_images"),
                age: row.get("age"),
                location: row.get("location"),
                email: None,
            })
            .collect();

        let last_message_sender = match conversation.last_message_sender {
            Some(sender_id) => sqlx::query("SELECT id, name FROM users WHERE id = $1")
                .bind(sender_id)
                .fetch_optional(&self.pool)
                .await?
                .map(|row| SenderBrief {
                    id: row.get("id"),
                    name: row.get("name"),
                }),
            None => None,
        };

        Ok(ConversationDetail {
            id: conversation.id,
            participants,
            last_message_text: conversation.last_message_text.clone(),
            last_message_sender,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        })
    }

    /// All non-archived conversations for the user, most recent activity
    /// first
    ///
    /// Blocking does not filter anything here; it is only surfaced as the
    /// `isBlocked` flag (blocked from the other side).
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.last_message_text, c.last_message_sender,
                   c.unread_count_one, c.unread_count_two,
                   c.muted_by, c.blocked_by, c.updated_at,
                   u.id AS other_id, u.name AS other_name, u.profile_images AS other_profile_images,
                   u.age AS other_age, u.location AS other_location, u.email AS other_email,
                   s.name AS sender_name
            FROM conversations c
            JOIN users u ON u.id = CASE WHEN c.user_one = $1 THEN c.user_two ELSE c.user_one END
            LEFT JOIN users s ON s.id = c.last_message_sender
            WHERE (c.user_one = $1 OR c.user_two = $1)
              AND NOT ($1 = ANY(c.archived_by))
            ORDER BY c.updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let summaries = rows
            .iter()
            .map(|row| {
                let other_id: Uuid = row.get("other_id");
                let muted_by: Vec<Uuid> = row.get("muted_by");
                let blocked_by: Vec<Uuid> = row.get("blocked_by");
                let sender_id: Option<Uuid> = row.get("last_message_sender");
                let sender_name: Option<String> = row.get("sender_name");

                ConversationSummary {
                    id: row.get("id"),
                    other_user: ParticipantProfile {
                        id: other_id,
                        name: row.get("other_name"),
                        profile_images: row.get("other_profile_images"),
                        age: row.get("other_age"),
                        location: row.get("other_location"),
                        email: Some(row.get("other_email")),
                    },
                    last_message: row.get("last_message_text"),
                    last_message_sender: sender_id.zip(sender_name).map(|(id, name)| SenderBrief {
                        id,
                        name,
                    }),
                    last_message_time: row.get("updated_at"),
                    unread_count: UnreadCount {
                        user_one: row.get("unread_count_one"),
                        user_two: row.get("unread_count_two"),
                    },
                    is_muted: muted_by.contains(&user_id),
                    is_blocked: blocked_by.contains(&other_id),
                }
            })
            .collect();

        Ok(summaries)
    }

    /// Add the user to the conversation's muted set (idempotent)
    pub async fn mute(&self, id: Uuid, user_id: Uuid) -> Result<Option<Conversation>> {
        self.update_member_set(
            id,
            user_id,
            r#"
            UPDATE conversations
            SET muted_by = CASE WHEN $2 = ANY(muted_by) THEN muted_by
                                ELSE array_append(muted_by, $2) END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .await
    }

    /// Remove the user from the conversation's muted set (idempotent)
    pub async fn unmute(&self, id: Uuid, user_id: Uuid) -> Result<Option<Conversation>> {
        self.update_member_set(
            id,
            user_id,
            r#"
            UPDATE conversations
            SET muted_by = array_remove(muted_by, $2),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .await
    }

    /// Add the user to the conversation's archived set (idempotent)
    ///
    /// There is no unarchive operation; archiving is permanent.
    pub async fn archive(&self, id: Uuid, user_id: Uuid) -> Result<Option<Conversation>> {
        self.update_member_set(
            id,
            user_id,
            r#"
            UPDATE conversations
            SET archived_by = CASE WHEN $2 = ANY(archived_by) THEN archived_by
                                   ELSE array_append(archived_by, $2) END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .await
    }

    async fn update_member_set(
        &self,
        id: Uuid,
        user_id: Uuid,
        sql: &str,
    ) -> Result<Option<Conversation>> {
        let conversation = sqlx::query_as::<_, Conversation>(sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(conversation)
    }

    /// Write the denormalized last-message summary
    ///
    /// This runs as its own statement after the message insert; a crash
    /// between the two leaves the summary stale but never corrupts the
    /// message log.
    pub async fn update_last_message(
        &self,
        id: Uuid,
        message_id: Uuid,
        text: &str,
        sender_id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_id = $2,
                last_message_text = $3,
                last_message_sender = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(message_id)
        .bind(text)
        .bind(sender_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
