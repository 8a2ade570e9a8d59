//! Message model and related types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::user::UserSummary;

/// Placeholder written over the content of a soft-deleted message
pub const DELETED_PLACEHOLDER: &str = "This message was deleted";

/// How long after creation a message may still be edited
pub const EDIT_WINDOW_MINUTES: i64 = 15;

/// How many characters of a message are denormalized onto the conversation
pub const PREVIEW_LENGTH: usize = 100;

/// Message content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    File,
    Emoji,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::File => "file",
            MessageType::Emoji => "emoji",
        }
    }
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::Text
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageType::Text),
            "image" => Ok(MessageType::Image),
            "file" => Ok(MessageType::File),
            "emoji" => Ok(MessageType::Emoji),
            other => Err(format!("Invalid message type: {}", other)),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message entity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub content: String,
    pub message_type: MessageType,
    pub image_url: Option<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Emoji reaction on a message
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub emoji: String,
    pub user_id: Uuid,
}

/// Message joined with sender/receiver summaries and reactions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
    pub content: String,
    pub message_type: MessageType,
    pub image_url: Option<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub reactions: Vec<Reaction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for sending a message
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub conversation_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub message_type: Option<String>,
}

/// Request payload for editing a message
#[derive(Debug, Clone, Deserialize)]
pub struct EditMessageRequest {
    pub content: String,
}

/// Request payload for adding a reaction
#[derive(Debug, Clone, Deserialize)]
pub struct AddReactionRequest {
    pub emoji: String,
}

/// Whether a message created at `created_at` may still be edited at `now`
pub fn within_edit_window(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(created_at) <= Duration::minutes(EDIT_WINDOW_MINUTES)
}

/// First `PREVIEW_LENGTH` characters of the content, for the denormalized
/// conversation summary
pub fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_round_trip() {
        for t in [
            MessageType::Text,
            MessageType::Image,
            MessageType::File,
            MessageType::Emoji,
        ] {
            assert_eq!(t.as_str().parse::<MessageType>(), Ok(t));
        }
        assert!("video".parse::<MessageType>().is_err());
    }

    #[test]
    fn test_edit_window_boundary() {
        let created = Utc::now();
        assert!(within_edit_window(created, created));
        assert!(within_edit_window(
            created,
            created + Duration::minutes(EDIT_WINDOW_MINUTES)
        ));
        assert!(!within_edit_window(
            created,
            created + Duration::minutes(EDIT_WINDOW_MINUTES) + Duration::seconds(1)
        ));
    }

    #[test]
    fn test_preview_truncates_to_100_chars() {
        let short = "hello";
        assert_eq!(preview(short), "hello");

        let long = "x".repeat(250);
        assert_eq!(preview(&long).chars().count(), PREVIEW_LENGTH);
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let content = "é".repeat(150);
        let p = preview(&content);
        assert_eq!(p.chars().count(), PREVIEW_LENGTH);
        assert!(p.chars().all(|c| c == 'é'));
    }
}
