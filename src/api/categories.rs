//! Category API endpoints
//!
//! Handles HTTP requests for category management:
//! - GET /api/categories - List categories
//! - POST /api/categories - Create category
//! - GET/PUT/DELETE /api/category/{categoryId} - Single category
//! - GET /api/category/{categoryId}/models|brands|products - Catalog under a category

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::extract::ApiJson;
use crate::api::AppState;
use crate::error::ServerError;
use crate::models::{
    Brand, Category, CreateCategoryInput, Model, ProductWithModel, UpdateCategoryInput,
};

/// Build the categories router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/category/{category_id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/category/{category_id}/models", get(list_models))
        .route("/category/{category_id}/brands", get(list_brands))
        .route("/category/{category_id}/products", get(list_products))
}

/// GET /api/categories - List categories ordered by name
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ServerError> {
    Ok(Json(state.category_service.get_categories().await?))
}

/// POST /api/categories - Create category
async fn create_category(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateCategoryInput>,
) -> Result<(StatusCode, Json<Category>), ServerError> {
    let category = state.category_service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/category/{categoryId}
async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Category>, ServerError> {
    Ok(Json(state.category_service.get_category(&category_id).await?))
}

/// PUT /api/category/{categoryId} - Partial update
async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    ApiJson(input): ApiJson<UpdateCategoryInput>,
) -> Result<Json<Category>, ServerError> {
    Ok(Json(
        state
            .category_service
            .update_category(&category_id, input)
            .await?,
    ))
}

/// DELETE /api/category/{categoryId} - Returns the deleted category
async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Category>, ServerError> {
    Ok(Json(state.category_service.delete_category(&category_id).await?))
}

async fn list_models(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Vec<Model>>, ServerError> {
    Ok(Json(
        state
            .category_service
            .get_models_by_category(&category_id)
            .await?,
    ))
}

async fn list_brands(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Vec<Brand>>, ServerError> {
    Ok(Json(
        state
            .category_service
            .get_brands_by_category(&category_id)
            .await?,
    ))
}

async fn list_products(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Vec<ProductWithModel>>, ServerError> {
    Ok(Json(
        state
            .category_service
            .get_products_by_category(&category_id)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use crate::test_support::Fixtures;
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_create_then_get_category() {
        let fixtures = Fixtures::new().await;
        let server = fixtures.server();

        let created = server
            .post("/api/categories")
            .json(&json!({"name": "Phones", "picture": "phones.png"}))
            .await;
        assert_eq!(created.status_code(), StatusCode::CREATED);
        let body = created.json::<Value>();
        let id = body["id"].as_str().expect("id should be a string").to_string();
        assert_eq!(body["name"], "Phones");
        assert!(body.get("createdAt").is_some());

        let fetched = server.get(&format!("/api/category/{}", id)).await;
        assert_eq!(fetched.status_code(), StatusCode::OK);
        assert_eq!(fetched.json::<Value>()["picture"], "phones.png");

        let listed = server.get("/api/categories").await;
        assert_eq!(listed.json::<Value>().as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_get_category_errors() {
        let fixtures = Fixtures::new().await;
        let server = fixtures.server();

        let invalid = server.get("/api/category/123").await;
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            invalid.json::<Value>(),
            json!({"error": "\"categoryId\" must be a valid id"})
        );

        let missing = server
            .get(&format!("/api/category/{}", Uuid::new_v4()))
            .await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.json::<Value>(), json!({"error": "Category not found"}));
    }

    #[tokio::test]
    async fn test_create_category_rejects_bad_body() {
        let fixtures = Fixtures::new().await;
        let server = fixtures.server();

        let missing_name = server.post("/api/categories").json(&json!({"picture": "x.png"})).await;
        assert_eq!(missing_name.status_code(), StatusCode::BAD_REQUEST);
        assert!(missing_name.json::<Value>()["error"].is_string());

        server.post("/api/categories").json(&json!({"name": "Phones"})).await;
        let duplicate = server.post("/api/categories").json(&json!({"name": "Phones"})).await;
        assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);
        assert_eq!(duplicate.json::<Value>(), json!({"error": "Category already exists"}));
    }

    #[tokio::test]
    async fn test_update_category_accepts_pictures_alias() {
        let fixtures = Fixtures::new().await;
        let category = fixtures.category("Phones").await;
        let server = fixtures.server();

        let response = server
            .put(&format!("/api/category/{}", category.id))
            .json(&json!({"pictures": "new.png"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body = response.json::<Value>();
        assert_eq!(body["name"], "Phones");
        assert_eq!(body["picture"], "new.png");
    }

    #[tokio::test]
    async fn test_delete_category() {
        let fixtures = Fixtures::new().await;
        let category = fixtures.category("Phones").await;
        let server = fixtures.server();
        let path = format!("/api/category/{}", category.id);

        let deleted = server.delete(&path).await;
        assert_eq!(deleted.status_code(), StatusCode::OK);
        assert_eq!(deleted.json::<Value>()["id"], category.id);

        let again = server.delete(&path).await;
        assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_referenced_category_conflicts() {
        let fixtures = Fixtures::new().await;
        let listing = fixtures.listing().await;
        let server = fixtures.server();

        let response = server
            .delete(&format!("/api/category/{}", listing.category.id))
            .await;

        assert_eq!(response.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_category_catalog_endpoints() {
        let fixtures = Fixtures::new().await;
        let listing = fixtures.listing().await;
        let server = fixtures.server();
        let base = format!("/api/category/{}", listing.category.id);

        let models = server.get(&format!("{}/models", base)).await.json::<Value>();
        assert_eq!(models[0]["name"], "iPhone 13");
        assert_eq!(models[0]["brandId"], listing.brand.id);

        let brands = server.get(&format!("{}/brands", base)).await.json::<Value>();
        assert_eq!(brands, json!([{
            "id": listing.brand.id,
            "name": "Apple",
            "createdAt": brands[0]["createdAt"],
        }]));

        let products = server.get(&format!("{}/products", base)).await.json::<Value>();
        assert_eq!(products[0]["id"], listing.product.id);
        assert_eq!(products[0]["model"]["brand"]["name"], "Apple");
        assert_eq!(products[0]["model"]["category"]["name"], "Phones");
    }
}
