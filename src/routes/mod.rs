pub mod chat_routes;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::chat_service::ChatService;
use self::chat_routes::{chat_handler, healthz_handler};

/// Builds the application router. The browser UI is served from a separate
/// origin, hence the permissive CORS layer.
pub fn app(service: ChatService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/healthz", get(healthz_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}
