//! Repositories for database operations

pub mod connection;
pub mod conversation;
pub mod dashboard;
pub mod message;
pub mod user;

// Re-export for convenience
pub use connection::ConnectionRepository;
pub use conversation::ConversationRepository;
pub use dashboard::DashboardRepository;
pub use message::MessageRepository;
pub use user::UserRepository;
