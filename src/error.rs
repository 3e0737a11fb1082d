//! Typed request error
//!
//! Every service operation fails with a [`ServerError`]: a client-facing
//! message plus the HTTP status it maps to. Database failures are normalised
//! through [`match_error`] so callers never see driver internals.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error returned by services and handlers.
///
/// The status defaults to 500 when built with [`ServerError::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ServerError {
    message: String,
    status: StatusCode,
}

/// JSON body sent for every failed request: `{"error": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ServerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_status(message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn with_status(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(message, StatusCode::BAD_REQUEST)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_status(message, StatusCode::NOT_FOUND)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_status(message, StatusCode::CONFLICT)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Map a repository failure to a [`ServerError`].
///
/// - missing row: 404 `"<entity> not found"`
/// - unique or foreign key violation: 409
/// - anything else: 500 with `fallback` as the only client-visible text
pub fn match_error(error: anyhow::Error, entity: &str, fallback: impl Into<String>) -> ServerError {
    let fallback = fallback.into();

    match error.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::RowNotFound) => ServerError::not_found(format!("{} not found", entity)),
        Some(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
            ServerError::conflict(format!("{} already exists", entity))
        }
        Some(sqlx::Error::Database(db_error)) if db_error.is_foreign_key_violation() => {
            ServerError::conflict(format!("{} is still referenced by other records", entity))
        }
        _ => {
            tracing::error!(error = %format!("{:#}", error), entity, "{}", fallback);
            ServerError::internal(fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_new_defaults_to_500() {
        let err = ServerError::new("boom");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "boom");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_constructors_map_status() {
        assert_eq!(ServerError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServerError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ServerError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(ServerError::internal("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_match_error_row_not_found() {
        let error = Err::<(), _>(sqlx::Error::RowNotFound)
            .context("Failed to update product")
            .unwrap_err();

        let mapped = match_error(error, "Product", "Cannot update the product");

        assert_eq!(mapped.status(), StatusCode::NOT_FOUND);
        assert_eq!(mapped.message(), "Product not found");
    }

    #[test]
    fn test_match_error_unknown_uses_fallback() {
        let error = anyhow::anyhow!("connection reset by peer");

        let mapped = match_error(error, "Category", "Cannot get the categories");

        assert_eq!(mapped.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(mapped.message(), "Cannot get the categories");
    }

    #[test]
    fn test_match_error_pool_closed_is_internal() {
        let error = anyhow::Error::new(sqlx::Error::PoolClosed).context("Failed to list users");

        let mapped = match_error(error, "Users", "Cannot search users");

        assert_eq!(mapped.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_into_response_body_shape() {
        let response = ServerError::not_found("Category not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("Body is not JSON");

        assert_eq!(body, serde_json::json!({ "error": "Category not found" }));
    }
}
