//! Product API endpoints
//!
//! - GET /api/products - Paginated listing (`page`, `perPage`, `sort`, `search`)
//! - POST /api/products - Create listing
//! - GET/PUT/DELETE /api/products/{productId} - Single listing

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::AppState;
use crate::error::ServerError;
use crate::models::{
    CreateProductInput, ListQuery, Product, ProductDetail, ProductWithModel, UpdateProductInput,
};

/// Build the products router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{product_id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// GET /api/products - List products
async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<ProductWithModel>>, ServerError> {
    Ok(Json(state.product_service.get_products(&query).await?))
}

/// POST /api/products - Create a listing and its room
async fn create_product(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateProductInput>,
) -> Result<(StatusCode, Json<Product>), ServerError> {
    let product = state.product_service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/products/{productId}
async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductDetail>, ServerError> {
    Ok(Json(state.product_service.get_product(&product_id).await?))
}

/// PUT /api/products/{productId} - Update price and/or pictures
async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    ApiJson(input): ApiJson<UpdateProductInput>,
) -> Result<Json<Product>, ServerError> {
    Ok(Json(
        state
            .product_service
            .update_product(&product_id, input)
            .await?,
    ))
}

/// DELETE /api/products/{productId}
async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, ServerError> {
    Ok(Json(state.product_service.delete_product(&product_id).await?))
}

#[cfg(test)]
mod tests {
    use crate::test_support::Fixtures;
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_create_product() {
        let fixtures = Fixtures::new().await;
        let listing = fixtures.listing().await;
        let server = fixtures.server();

        let response = server
            .post("/api/products")
            .json(&json!({
                "userId": listing.owner.id,
                "modelId": listing.model.id,
                "price": 650.0,
                "description": "Unlocked, 128GB",
                "pictures": ["a.jpg", "b.jpg"],
                "duration": 86400,
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["ownerId"], listing.owner.id);
        assert_eq!(body["pictures"], json!(["a.jpg", "b.jpg"]));
        assert!(body["roomId"].is_string());
        assert!(body["buyerId"].is_null());
    }

    #[tokio::test]
    async fn test_create_product_errors() {
        let fixtures = Fixtures::new().await;
        let listing = fixtures.listing().await;
        let server = fixtures.server();

        let missing_fields = server.post("/api/products").json(&json!({"price": 1.0})).await;
        assert_eq!(missing_fields.status_code(), StatusCode::BAD_REQUEST);
        assert!(missing_fields.json::<Value>()["error"].is_string());

        let unknown_model = server
            .post("/api/products")
            .json(&json!({
                "userId": listing.owner.id,
                "modelId": Uuid::new_v4().to_string(),
                "price": 10.0,
                "description": "Spare",
                "pictures": ["a.jpg"],
            }))
            .await;
        assert_eq!(unknown_model.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(unknown_model.json::<Value>(), json!({"error": "Model not found"}));
    }

    #[tokio::test]
    async fn test_get_product_detail() {
        let fixtures = Fixtures::new().await;
        let listing = fixtures.listing().await;
        let server = fixtures.server();

        let response = server
            .get(&format!("/api/products/{}", listing.product.id))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body = response.json::<Value>();
        assert_eq!(body["id"], listing.product.id);
        assert_eq!(body["model"]["name"], "iPhone 13");
        assert_eq!(body["owner"]["email"], "owner@example.com");
        assert_eq!(body["room"]["duration"], 3600);
        assert!(body["buyer"].is_null());

        let missing = server
            .get(&format!("/api/products/{}", Uuid::new_v4()))
            .await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.json::<Value>(), json!({"error": "Product not found"}));
    }

    #[tokio::test]
    async fn test_list_products_query() {
        let fixtures = Fixtures::new().await;
        fixtures.listing().await;
        let server = fixtures.server();

        let page = server
            .get("/api/products")
            .add_query_param("perPage", 5)
            .add_query_param("sort", "price_desc")
            .await;
        assert_eq!(page.status_code(), StatusCode::OK);
        assert_eq!(page.json::<Value>().as_array().map(Vec::len), Some(1));

        let bad_sort = server.get("/api/products").add_query_param("sort", "random").await;
        assert_eq!(bad_sort.status_code(), StatusCode::BAD_REQUEST);

        let bad_page = server.get("/api/products").add_query_param("page", "first").await;
        assert_eq!(bad_page.status_code(), StatusCode::BAD_REQUEST);
        assert!(bad_page.json::<Value>()["error"].is_string());

        let too_many = server.get("/api/products").add_query_param("perPage", 500).await;
        assert_eq!(too_many.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_products_search_non_ascii() {
        let fixtures = Fixtures::new().await;
        let listing = fixtures.listing().await;
        let server = fixtures.server();

        let created = server
            .post("/api/products")
            .json(&json!({
                "userId": listing.owner.id,
                "modelId": listing.model.id,
                "price": 120.0,
                "description": "Écran RÉPARÉ, très bon état",
                "pictures": ["a.jpg"],
            }))
            .await;
        assert_eq!(created.status_code(), StatusCode::CREATED);
        let id = created.json::<Value>()["id"].clone();

        for search in ["RÉPARÉ", "réparé", "ÉCRAN"] {
            let found = server
                .get("/api/products")
                .add_query_param("search", search)
                .await;
            assert_eq!(found.status_code(), StatusCode::OK);
            let body = found.json::<Value>();
            let ids: Vec<&Value> = body
                .as_array()
                .expect("list body is an array")
                .iter()
                .map(|p| &p["id"])
                .collect();
            assert_eq!(ids, vec![&id], "search {}", search);
        }
    }

    #[tokio::test]
    async fn test_update_and_delete_product() {
        let fixtures = Fixtures::new().await;
        let listing = fixtures.listing().await;
        let server = fixtures.server();
        let path = format!("/api/products/{}", listing.product.id);

        let updated = server.put(&path).json(&json!({"images": ["new.jpg"]})).await;
        assert_eq!(updated.status_code(), StatusCode::OK);
        assert_eq!(updated.json::<Value>()["pictures"], json!(["new.jpg"]));

        let bad_price = server.put(&path).json(&json!({"price": 0})).await;
        assert_eq!(bad_price.status_code(), StatusCode::BAD_REQUEST);

        let deleted = server.delete(&path).await;
        assert_eq!(deleted.status_code(), StatusCode::OK);

        let gone = server.get(&path).await;
        assert_eq!(gone.status_code(), StatusCode::NOT_FOUND);
    }
}
