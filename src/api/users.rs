//! User API endpoints
//!
//! - GET /api/users/search?query= - Search by name or email
//! - GET /api/users/email/{email} - Lookup by email
//! - GET /api/users/{userId}/products - Listings owned by a user

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::extract::ApiQuery;
use crate::api::AppState;
use crate::error::ServerError;
use crate::models::{ProductWithModel, User};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/search", get(search_users))
        .route("/users/email/{email}", get(get_user_by_email))
        .route("/users/{user_id}/products", get(list_user_products))
}

/// GET /api/users/search - Case-insensitive name/email search
async fn search_users(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<User>>, ServerError> {
    let query = params.query.unwrap_or_default();
    Ok(Json(state.user_service.search_users(&query).await?))
}

/// GET /api/users/email/{email}
async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<User>, ServerError> {
    Ok(Json(state.user_service.get_user_by_email(&email).await?))
}

/// GET /api/users/{userId}/products
async fn list_user_products(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ProductWithModel>>, ServerError> {
    Ok(Json(state.user_service.get_products_by_user(&user_id).await?))
}
