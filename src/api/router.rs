use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::domain::DomainError;

use super::chat;
use super::health;
use super::knowledge_bases;
use super::state::AppState;

/// Create the application router
pub fn create_router(state: AppState, cors: &CorsConfig) -> Result<Router, DomainError> {
    let origin: HeaderValue = cors.allowed_origin.parse().map_err(|_| {
        DomainError::configuration(format!(
            "Invalid CORS origin '{}'",
            cors.allowed_origin
        ))
    })?;

    let cors_layer = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/", get(health::root))
        .route(
            "/knowledge-bases",
            get(knowledge_bases::list).post(knowledge_bases::create),
        )
        .route("/knowledge-bases/upload", post(knowledge_bases::upload))
        .route("/chat/query", post(chat::query))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http()))
}
