//! Product service
//!
//! Listing lifecycle: creation (with its sale room), lookup, paginated
//! browsing, price/picture edits and removal.

use crate::db::repositories::{CatalogRepository, ProductRepository, UserRepository};
use crate::error::{match_error, ServerError};
use crate::models::{
    CreateProductInput, ListOptions, ListQuery, Product, ProductDetail, ProductSort,
    ProductWithModel, Room, UpdateProductInput, DEFAULT_ROOM_DURATION_SECS,
};
use crate::validation::{
    validate_description, validate_duration, validate_id, validate_pictures, validate_price,
    validate_search_query,
};
use std::sync::Arc;

const ENTITY: &str = "Product";
const ID_FIELD: &str = "productId";

/// Product service
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    catalog: Arc<dyn CatalogRepository>,
    users: Arc<dyn UserRepository>,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        catalog: Arc<dyn CatalogRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            products,
            catalog,
            users,
        }
    }

    /// Get a listing with model, room, owner and buyer
    pub async fn get_product(&self, id: &str) -> Result<ProductDetail, ServerError> {
        validate_id(ID_FIELD, id)?;

        self.products
            .get_detail(id)
            .await
            .map_err(|e| match_error(e, ENTITY, format!("Cannot get the product with id: {}", id)))?
            .ok_or_else(|| ServerError::not_found("Product not found"))
    }

    /// List a page of listings
    pub async fn get_products(&self, query: &ListQuery) -> Result<Vec<ProductWithModel>, ServerError> {
        let options = parse_list_options(query)?;

        self.products
            .list(&options)
            .await
            .map_err(|e| match_error(e, ENTITY, "Cannot get the products"))
    }

    /// Create a listing and its sale room
    ///
    /// # Errors
    /// - 400 on invalid input
    /// - 404 "Model not found" / "User not found" when a reference is dangling
    pub async fn create_product(&self, input: CreateProductInput) -> Result<Product, ServerError> {
        validate_id("userId", &input.user_id)?;
        validate_id("modelId", &input.model_id)?;
        validate_price(input.price)?;
        let description = validate_description(&input.description)?;
        validate_pictures("pictures", &input.pictures)?;
        let duration = input.duration.unwrap_or(DEFAULT_ROOM_DURATION_SECS);
        validate_duration(duration)?;

        let fallback = format!("Cannot create the product with model id: {}", input.model_id);

        self.catalog
            .get_model(&input.model_id)
            .await
            .map_err(|e| match_error(e, "Model", fallback.clone()))?
            .ok_or_else(|| ServerError::not_found("Model not found"))?;

        self.users
            .get_by_id(&input.user_id)
            .await
            .map_err(|e| match_error(e, "User", fallback.clone()))?
            .ok_or_else(|| ServerError::not_found("User not found"))?;

        let product = Product::new(
            input.model_id,
            input.user_id,
            input.price,
            description,
            input.pictures,
        );
        let room = Room::new(duration);

        let created = self
            .products
            .create(&product, &room)
            .await
            .map_err(|e| match_error(e, ENTITY, fallback))?;

        tracing::info!(
            id = %created.id,
            model_id = %created.model_id,
            owner_id = %created.owner_id,
            closes_at = %room.closes_at(),
            "Product listed"
        );
        Ok(created)
    }

    /// Change price and/or pictures of a listing
    pub async fn update_product(
        &self,
        id: &str,
        input: UpdateProductInput,
    ) -> Result<Product, ServerError> {
        validate_id(ID_FIELD, id)?;
        if input.is_empty() {
            return Err(ServerError::bad_request(
                "At least one of \"price\" or \"pictures\" must be provided",
            ));
        }
        if let Some(price) = input.price {
            validate_price(price)?;
        }
        if let Some(pictures) = &input.pictures {
            validate_pictures("pictures", pictures)?;
        }

        let updated = self
            .products
            .update(id, input.price, input.pictures.as_deref())
            .await
            .map_err(|e| match_error(e, ENTITY, format!("Cannot update the product with id: {}", id)))?
            .ok_or_else(|| ServerError::not_found("Product not found"))?;

        tracing::info!(id = %updated.id, "Product updated");
        Ok(updated)
    }

    /// Remove a listing and its room, returning the listing
    pub async fn delete_product(&self, id: &str) -> Result<Product, ServerError> {
        validate_id(ID_FIELD, id)?;

        let deleted = self
            .products
            .delete(id)
            .await
            .map_err(|e| match_error(e, ENTITY, format!("Cannot delete the product with id: {}", id)))?
            .ok_or_else(|| ServerError::not_found("Product not found"))?;

        tracing::info!(id = %deleted.id, "Product deleted");
        Ok(deleted)
    }
}

/// Validate raw query-string options, applying defaults
pub fn parse_list_options(query: &ListQuery) -> Result<ListOptions, ServerError> {
    let page = match query.page {
        None => 1,
        Some(page) if page >= 1 => u32::try_from(page)
            .map_err(|_| ServerError::bad_request("\"page\" must be a positive integer"))?,
        Some(_) => return Err(ServerError::bad_request("\"page\" must be a positive integer")),
    };

    let per_page = match query.per_page {
        None => ListOptions::DEFAULT_PER_PAGE,
        Some(n) if (1..=ListOptions::MAX_PER_PAGE as i64).contains(&n) => n as u32,
        Some(_) => {
            return Err(ServerError::bad_request(format!(
                "\"perPage\" must be between 1 and {}",
                ListOptions::MAX_PER_PAGE
            )))
        }
    };

    let sort = match query.sort.as_deref() {
        None | Some("") => ProductSort::default(),
        Some(raw) => raw.parse::<ProductSort>().map_err(ServerError::bad_request)?,
    };

    let search = match query.search.as_deref() {
        None => None,
        Some(raw) if raw.trim().is_empty() => None,
        Some(raw) => Some(validate_search_query(raw)?),
    };

    Ok(ListOptions {
        page,
        per_page,
        sort,
        search,
    })
}
