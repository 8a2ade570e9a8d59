//! Connection request model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::user::PublicProfile;

/// Status of a directed connection request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Ignored,
    Interested,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Ignored => "ignored",
            ConnectionStatus::Interested => "interested",
            ConnectionStatus::Accepted => "accepted",
            ConnectionStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ConnectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignored" => Ok(ConnectionStatus::Ignored),
            "interested" => Ok(ConnectionStatus::Interested),
            "accepted" => Ok(ConnectionStatus::Accepted),
            "rejected" => Ok(ConnectionStatus::Rejected),
            other => Err(format!("Invalid connection status: {}", other)),
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action the receiving user can take on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespondAction {
    Accept,
    Reject,
}

impl RespondAction {
    /// Status the request transitions to for this action
    pub fn resulting_status(&self) -> ConnectionStatus {
        match self {
            RespondAction::Accept => ConnectionStatus::Accepted,
            RespondAction::Reject => ConnectionStatus::Rejected,
        }
    }
}

impl FromStr for RespondAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(RespondAction::Accept),
            "reject" => Ok(RespondAction::Reject),
            other => Err(format!("Invalid action: {}", other)),
        }
    }
}

/// Directed connection request between two users
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
}

/// Received request joined with the sender's public profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedRequest {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub from_user_details: PublicProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ConnectionStatus::Ignored,
            ConnectionStatus::Interested,
            ConnectionStatus::Accepted,
            ConnectionStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<ConnectionStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("matched".parse::<ConnectionStatus>().is_err());
        assert!("".parse::<ConnectionStatus>().is_err());
    }

    #[test]
    fn test_respond_action() {
        assert_eq!(
            "accept".parse::<RespondAction>().unwrap().resulting_status(),
            ConnectionStatus::Accepted
        );
        assert_eq!(
            "reject".parse::<RespondAction>().unwrap().resulting_status(),
            ConnectionStatus::Rejected
        );
        assert!("ignore".parse::<RespondAction>().is_err());
    }
}
