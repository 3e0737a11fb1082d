//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the marketplace.
//! It includes:
//! - Health check
//! - Category API endpoints (plus the models, brands and listings under a category)
//! - Product API endpoints
//! - User API endpoints

pub mod categories;
pub mod extract;
pub mod health;
pub mod products;
pub mod state;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ServerError;

pub use extract::{ApiJson, ApiQuery};
pub use state::AppState;

/// Build the `/api` router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(users::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let allow_origin = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            tracing::warn!(cors_origin, "Invalid CORS origin, cross-origin requests disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api", build_api_router())
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn not_found() -> ServerError {
    ServerError::not_found("Not found")
}
