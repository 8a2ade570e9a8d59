//! Message repository
//!
//! Messages reference their conversation implicitly through the
//! (from_user, to_user) pair; retrieval re-derives membership from the
//! conversation's participants.

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::models::message::{DELETED_PLACEHOLDER, Message, MessageType, MessageView, Reaction};
use crate::models::user::UserSummary;

const MESSAGE_COLUMNS: &str = "m.id, m.from_user, m.to_user, m.content, m.message_type, \
     m.image_url, m.is_read, m.read_at, m.is_edited, m.edited_at, m.is_deleted, \
     m.created_at, m.updated_at";

const VIEW_COLUMNS: &str = "m.id, m.from_user, m.to_user, m.content, m.message_type, \
     m.image_url, m.is_read, m.read_at, m.is_edited, m.edited_at, m.is_deleted, \
     m.created_at, m.updated_at, \
     f.name AS from_name, f.profile_images AS from_profile_images, \
     t.name AS to_name, t.profile_images AS to_profile_images";

/// Message repository
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new message
    pub async fn insert(
        &self,
        from_user: Uuid,
        to_user: Uuid,
        content: &str,
        message_type: MessageType,
    ) -> Result<Message> {
        let row = sqlx::query(
            r#"
            INSERT INTO messages (from_user, to_user, content, message_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, from_user, to_user, content, message_type, image_url,
                      is_read, read_at, is_edited, edited_at, is_deleted,
                      created_at, updated_at
            "#,
        )
        .bind(from_user)
        .bind(to_user)
        .bind(content)
        .bind(message_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        map_message(&row)
    }

    /// Find a message by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM messages m WHERE m.id = $1",
            MESSAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_message(&row)).transpose()
    }

    /// Message joined with sender/receiver summaries and reactions
    pub async fn view(&self, id: Uuid) -> Result<Option<MessageView>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {VIEW_COLUMNS}
            FROM messages m
            JOIN users f ON f.id = m.from_user
            JOIN users t ON t.id = m.to_user
            WHERE m.id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut view = map_view(&row)?;
        view.reactions = self
            .reactions_for(&[view.id])
            .await?
            .remove(&view.id)
            .unwrap_or_default();

        Ok(Some(view))
    }

    /// One page of the conversation's messages, newest first
    ///
    /// Soft-deleted messages are excluded. The caller reverses the page for
    /// oldest-first display.
    pub async fn list_page(
        &self,
        user_id: Uuid,
        participants: &[Uuid],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageView>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {VIEW_COLUMNS}
            FROM messages m
            JOIN users f ON f.id = m.from_user
            JOIN users t ON t.id = m.to_user
            WHERE ((m.from_user = $1 AND m.to_user = ANY($2))
                OR (m.to_user = $1 AND m.from_user = ANY($2)))
              AND m.is_deleted = FALSE
            ORDER BY m.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        ))
        .bind(user_id)
        .bind(participants)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut views = rows
            .iter()
            .map(map_view)
            .collect::<Result<Vec<MessageView>>>()?;

        let ids: Vec<Uuid> = views.iter().map(|v| v.id).collect();
        let mut reactions = self.reactions_for(&ids).await?;
        for view in &mut views {
            view.reactions = reactions.remove(&view.id).unwrap_or_default();
        }

        Ok(views)
    }

    /// Replace a message's content and record the edit
    pub async fn update_content(&self, id: Uuid, content: &str) -> Result<()> {
        info!("Editing message: {}", id);

        sqlx::query(
            r#"
            UPDATE messages
            SET content = $2, is_edited = TRUE, edited_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(content)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Soft-delete a message
    ///
    /// The content is overwritten with a fixed placeholder; the original
    /// text is unrecoverable.
    pub async fn soft_delete(&self, id: Uuid) -> Result<()> {
        info!("Soft-deleting message: {}", id);

        sqlx::query(
            r#"
            UPDATE messages
            SET is_deleted = TRUE, content = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(DELETED_PLACEHOLDER)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Mark every unread message addressed to the user as read, regardless
    /// of conversation
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE, read_at = NOW()
            WHERE to_user = $1 AND is_read = FALSE
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Mark unread messages addressed to the user from the given
    /// participants as read
    pub async fn mark_conversation_read(
        &self,
        user_id: Uuid,
        participants: &[Uuid],
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE, read_at = NOW()
            WHERE to_user = $1 AND from_user = ANY($2) AND is_read = FALSE
            "#,
        )
        .bind(user_id)
        .bind(participants)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Add a reaction; returns false when the same (user, emoji) reaction
    /// already exists on the message
    pub async fn add_reaction(&self, message_id: Uuid, user_id: Uuid, emoji: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO message_reactions (message_id, user_id, emoji)
            VALUES ($1, $2, $3)
            ON CONFLICT (message_id, user_id, emoji) DO NOTHING
            "#,
        )
        .bind(message_id)
        .bind(user_id)
        .bind(emoji)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a reaction; removing a non-existent reaction is a no-op
    pub async fn remove_reaction(&self, message_id: Uuid, user_id: Uuid, emoji: &str) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM message_reactions
            WHERE message_id = $1 AND user_id = $2 AND emoji = $3
            "#,
        )
        .bind(message_id)
        .bind(user_id)
        .bind(emoji)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn reactions_for(&self, message_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Reaction>>> {
        if message_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT message_id, user_id, emoji
            FROM message_reactions
            WHERE message_id = ANY($1)
            ORDER BY created_at
            "#,
        )
        .bind(message_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_message: HashMap<Uuid, Vec<Reaction>> = HashMap::new();
        for row in rows {
            let message_id: Uuid = row.get("message_id");
            by_message.entry(message_id).or_default().push(Reaction {
                emoji: row.get("emoji"),
                user_id: row.get("user_id"),
            });
        }

        Ok(by_message)
    }
}

fn map_message(row: &PgRow) -> Result<Message> {
    let message_type: String = row.get("message_type");
    Ok(Message {
        id: row.get("id"),
        from_user: row.get("from_user"),
        to_user: row.get("to_user"),
        content: row.get("content"),
        message_type: message_type.parse().map_err(anyhow::Error::msg)?,
        image_url: row.get("image_url"),
        is_read: row.get("is_read"),
        read_at: row.get("read_at"),
        is_edited: row.get("is_edited"),
        edited_at: row.get("edited_at"),
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_view(row: &PgRow) -> Result<MessageView> {
    let message_type: String = row.get("message_type");
    Ok(MessageView {
        id: row.get("id"),
        from_user: UserSummary {
            id: row.get("from_user"),
            name: row.get("from_name"),
            profile_images: row.get("from_profile_images"),
        },
        to_user: UserSummary {
            id: row.get("to_user"),
            name: row.get("to_name"),
            profile_images: row.get("to_profile_images"),
        },
        content: row.get("content"),
        message_type: message_type.parse().map_err(anyhow::Error::msg)?,
        image_url: row.get("image_url"),
        is_read: row.get("is_read"),
        read_at: row.get("read_at"),
        is_edited: row.get("is_edited"),
        edited_at: row.get("edited_at"),
        is_deleted: row.get("is_deleted"),
        reactions: vec![],
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
