//! Application state shared across handlers

use sqlx::PgPool;

use crate::jwt::JwtService;
use crate::realtime::EventSender;
use crate::repositories::{
    ConnectionRepository, ConversationRepository, DashboardRepository, MessageRepository,
    UserRepository,
};
use crate::uploads::UploadStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub events: EventSender,
    pub uploads: UploadStore,
    pub user_repository: UserRepository,
    pub connection_repository: ConnectionRepository,
    pub conversation_repository: ConversationRepository,
    pub message_repository: MessageRepository,
    pub dashboard_repository: DashboardRepository,
}
