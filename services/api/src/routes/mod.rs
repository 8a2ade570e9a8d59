//! API routes

use anyhow::Result;
use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{config::ServerConfig, middleware::auth_middleware, realtime, state::AppState};

pub mod auth;
pub mod connection;
pub mod conversation;
pub mod dashboard;
pub mod discover;
pub mod message;
pub mod profile;

/// Create the router for the API service
///
/// Everything except signup/login/logout/forget and the health check sits
/// behind the authentication gate. Uploaded profile photos are served
/// statically under `/uploads`.
pub fn create_router(state: AppState, config: &ServerConfig) -> Result<Router> {
    let cors_origin = config.cors_origin.parse::<HeaderValue>()?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let protected = Router::new()
        .route("/verify-token", get(auth::verify_token))
        .route("/discover", get(discover::get_discover))
        .route(
            "/request/send/:status/:to_user_id",
            post(connection::send_request),
        )
        .route("/request/received", get(connection::get_received))
        .route(
            "/request/respond/:request_id/:action",
            post(connection::respond),
        )
        .route("/conversation/all", get(conversation::get_all))
        .route(
            "/conversation/initiate/:other_user_id",
            post(conversation::initiate),
        )
        .route(
            "/conversation/:conversation_id/messages",
            get(conversation::get_messages),
        )
        .route("/conversation/:conversation_id/mute", post(conversation::mute))
        .route(
            "/conversation/:conversation_id/unmute",
            post(conversation::unmute),
        )
        .route(
            "/conversation/:conversation_id/archive",
            post(conversation::archive),
        )
        // The :id segment is a message id everywhere except mark-read,
        // where it is a conversation id (shared name keeps the routes
        // compatible in one tree).
        .route("/message/send", post(message::send_message))
        .route(
            "/message/:id",
            put(message::edit_message).delete(message::delete_message),
        )
        .route("/message/:id/mark-read", post(message::mark_as_read))
        .route("/message/:id/reaction", post(message::add_reaction))
        .route(
            "/message/:id/reaction/:emoji",
            delete(message::remove_reaction),
        )
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/profile/:user_id", get(profile::get_user_by_id))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/ws", get(realtime::ws_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/logout", post(auth::logout))
        .route("/forget", put(auth::forget_password))
        .merge(protected)
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "heartlink-api"
    }))
}
