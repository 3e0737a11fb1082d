//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::api::AppState;
use crate::config::DatabaseDriver;
use crate::error::ServerError;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: DatabaseDriver,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /api/health - Database ping
async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ServerError> {
    state.pool.ping().await.map_err(|e| {
        tracing::error!(error = %format!("{:#}", e), "Health check failed");
        ServerError::with_status(
            "Database unavailable",
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
        )
    })?;

    Ok(Json(HealthResponse {
        status: "ok",
        database: state.pool.driver(),
    }))
}
