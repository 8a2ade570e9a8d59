//! API models for entities, request and response payloads

pub mod connection;
pub mod conversation;
pub mod message;
pub mod user;

// Re-export for convenience
pub use connection::{ConnectionRequest, ConnectionStatus, ReceivedRequest, RespondAction};
pub use conversation::{Conversation, ConversationDetail, ConversationSummary};
pub use message::{Message, MessageType, MessageView, Reaction};
pub use user::{NewUser, PublicProfile, UpdateProfileRequest, User, UserSummary};
