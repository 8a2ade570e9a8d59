use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod config;
mod error;
mod jwt;
mod middleware;
mod models;
mod realtime;
mod repositories;
mod routes;
mod state;
mod uploads;
mod validation;

use common::database::{DatabaseConfig, init_pool};
use tokio::net::TcpListener;

use crate::{
    config::ServerConfig,
    jwt::{JwtConfig, JwtService},
    repositories::{
        ConnectionRepository, ConversationRepository, DashboardRepository, MessageRepository,
        UserRepository,
    },
    state::AppState,
    uploads::UploadStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Heartlink API service");

    let server_config = ServerConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    // Initialize JWT service
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config);

    // Prepare the upload store for profile photos
    let uploads = UploadStore::new(server_config.upload_dir.clone());
    uploads.ensure_dir().await?;

    // Realtime channel; wired into the router, nothing publishes yet
    let events = realtime::channel();

    let app_state = AppState {
        db_pool: pool.clone(),
        jwt_service,
        events,
        uploads,
        user_repository: UserRepository::new(pool.clone()),
        connection_repository: ConnectionRepository::new(pool.clone()),
        conversation_repository: ConversationRepository::new(pool.clone()),
        message_repository: MessageRepository::new(pool.clone()),
        dashboard_repository: DashboardRepository::new(pool),
    };

    info!("Heartlink API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state, &server_config)?;

    let addr = format!("{}:{}", server_config.host, server_config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Heartlink API service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
