//! Conversation model and related payloads

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Conversation entity
///
/// The participant pair is stored in canonical order (`user_one < user_two`)
/// and is fixed at creation.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub user_one: Uuid,
    pub user_two: Uuid,
    pub last_message_id: Option<Uuid>,
    pub last_message_text: Option<String>,
    pub last_message_sender: Option<Uuid>,
    pub unread_count_one: i32,
    pub unread_count_two: i32,
    pub muted_by: Vec<Uuid>,
    pub blocked_by: Vec<Uuid>,
    pub archived_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Participant ids as an owned pair
    pub fn participants(&self) -> [Uuid; 2] {
        [self.user_one, self.user_two]
    }

    /// Whether the given user is one of the two participants
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.user_one == user_id || self.user_two == user_id
    }

    /// The participant that is not the given user
    pub fn other_participant(&self, user_id: Uuid) -> Uuid {
        if self.user_one == user_id {
            self.user_two
        } else {
            self.user_one
        }
    }
}

/// Canonical ordering for an unordered participant pair
pub fn ordered_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b { (a, b) } else { (b, a) }
}

/// Participant projection embedded in conversation payloads
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProfile {
    pub id: Uuid,
    pub name: String,
    pub profile_images: Vec<String>,
    pub age: i32,
    pub location: String,
    #[serde(rename = "emailId", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Sender projection for the denormalized last-message sender
#[derive(Debug, Clone, Serialize)]
pub struct SenderBrief {
    pub id: Uuid,
    pub name: String,
}

/// Conversation with resolved participant profiles, returned on initiation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    pub id: Uuid,
    pub participants: Vec<ParticipantProfile>,
    pub last_message_text: Option<String>,
    pub last_message_sender: Option<SenderBrief>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user unread counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub user_one: i32,
    pub user_two: i32,
}

/// Conversation list entry for the current user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: Uuid,
    pub other_user: ParticipantProfile,
    pub last_message: Option<String>,
    pub last_message_sender: Option<SenderBrief>,
    pub last_message_time: DateTime<Utc>,
    pub unread_count: UnreadCount,
    pub is_muted: bool,
    pub is_blocked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_pair_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(ordered_pair(a, b), ordered_pair(b, a));
        let (lo, hi) = ordered_pair(a, b);
        assert!(lo < hi);
    }

    fn conversation(user_one: Uuid, user_two: Uuid) -> Conversation {
        Conversation {
            id: Uuid::new_v4(),
            user_one,
            user_two,
            last_message_id: None,
            last_message_text: None,
            last_message_sender: None,
            unread_count_one: 0,
            unread_count_two: 0,
            muted_by: vec![],
            blocked_by: vec![],
            archived_by: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_other_participant() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (lo, hi) = ordered_pair(a, b);
        let conv = conversation(lo, hi);
        assert_eq!(conv.other_participant(a), b);
        assert_eq!(conv.other_participant(b), a);
        assert!(conv.has_participant(a));
        assert!(conv.has_participant(b));
        assert!(!conv.has_participant(Uuid::new_v4()));
    }
}
