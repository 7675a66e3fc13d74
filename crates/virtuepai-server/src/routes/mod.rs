//! HTTP routes for the `VirtuePAI` server.
//!
//! All endpoints live under `/api`. The chat route is concurrency-limited
//! because each request holds an outbound upstream connection.

pub mod chat;
pub mod contact;
pub mod health;
pub mod sales;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Chat requests allowed in flight at once.
const CHAT_CONCURRENCY: usize = 64;

/// Build the Axum router with all routes and middleware.
pub fn app(state: Arc<AppState>) -> Router {
    let chat_routes = Router::new()
        .nest("/api/chat", chat::router())
        .layer(tower::limit::ConcurrencyLimitLayer::new(CHAT_CONCURRENCY));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(chat_routes)
        .nest("/api/contact", contact::router())
        .nest("/api/sales", sales::router())
        .nest("/api/health", health::router())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}
