//! Category service
//!
//! Implements business logic for category management:
//! - Create, read, update, delete categories
//! - Models, brands and listings filed under a category
//! - Name uniqueness (enforced by the database, surfaced as 409)
//! - Deletion refused while models still reference the category

use crate::db::repositories::CategoryRepository;
use crate::error::{match_error, ServerError};
use crate::models::{
    Brand, Category, CreateCategoryInput, Model, ProductWithModel, UpdateCategoryInput,
};
use crate::validation::{validate_id, validate_name, validate_picture, MAX_NAME_LEN};
use std::sync::Arc;

const ENTITY: &str = "Category";
const ID_FIELD: &str = "categoryId";

/// Category service
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Get a category by ID
    ///
    /// # Errors
    /// - 400 if `id` is not a valid id
    /// - 404 if no category has this id
    pub async fn get_category(&self, id: &str) -> Result<Category, ServerError> {
        validate_id(ID_FIELD, id)?;

        self.repo
            .get_by_id(id)
            .await
            .map_err(|e| match_error(e, ENTITY, format!("Cannot get the category with id: {}", id)))?
            .ok_or_else(|| ServerError::not_found("Category not found"))
    }

    /// List all categories ordered by name
    pub async fn get_categories(&self) -> Result<Vec<Category>, ServerError> {
        self.repo
            .list()
            .await
            .map_err(|e| match_error(e, ENTITY, "Cannot get the categories"))
    }

    /// Create a new category
    ///
    /// # Errors
    /// - 400 if the name or picture is invalid
    /// - 409 if a category with the same name already exists
    pub async fn create_category(&self, input: CreateCategoryInput) -> Result<Category, ServerError> {
        let name = validate_name("name", &input.name, MAX_NAME_LEN)?;
        if let Some(picture) = &input.picture {
            validate_picture("picture", picture)?;
        }

        let category = Category::new(name, input.picture);
        let created = self.repo.create(&category).await.map_err(|e| {
            match_error(
                e,
                ENTITY,
                format!("Cannot create the category with name: {}", category.name),
            )
        })?;

        tracing::info!(id = %created.id, name = %created.name, "Category created");
        Ok(created)
    }

    /// Update a category; absent fields keep their current value
    ///
    /// # Errors
    /// - 400 if the id or a present field is invalid, or no field is present
    /// - 404 if no category has this id
    /// - 409 if the new name is taken
    pub async fn update_category(
        &self,
        id: &str,
        input: UpdateCategoryInput,
    ) -> Result<Category, ServerError> {
        validate_id(ID_FIELD, id)?;
        if input.is_empty() {
            return Err(ServerError::bad_request(
                "At least one of \"name\" or \"picture\" must be provided",
            ));
        }

        let input = UpdateCategoryInput {
            name: input
                .name
                .map(|name| validate_name("name", &name, MAX_NAME_LEN))
                .transpose()?,
            picture: input.picture,
        };
        if let Some(picture) = &input.picture {
            validate_picture("picture", picture)?;
        }

        let updated = self
            .repo
            .update(id, &input)
            .await
            .map_err(|e| match_error(e, ENTITY, format!("Cannot update the category with id: {}", id)))?
            .ok_or_else(|| ServerError::not_found("Category not found"))?;

        tracing::info!(id = %updated.id, "Category updated");
        Ok(updated)
    }

    /// Delete a category, returning it
    ///
    /// # Errors
    /// - 404 if no category has this id
    /// - 409 while models are still filed under it
    pub async fn delete_category(&self, id: &str) -> Result<Category, ServerError> {
        validate_id(ID_FIELD, id)?;

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| match_error(e, ENTITY, format!("Cannot delete the category with id: {}", id)))?
            .ok_or_else(|| ServerError::not_found("Category not found"))?;

        tracing::info!(id = %deleted.id, "Category deleted");
        Ok(deleted)
    }

    pub async fn get_models_by_category(&self, id: &str) -> Result<Vec<Model>, ServerError> {
        validate_id(ID_FIELD, id)?;

        self.repo.list_models(id).await.map_err(|e| {
            match_error(e, "Model", format!("Cannot get the models of the category with id: {}", id))
        })
    }

    pub async fn get_brands_by_category(&self, id: &str) -> Result<Vec<Brand>, ServerError> {
        validate_id(ID_FIELD, id)?;

        self.repo.list_brands(id).await.map_err(|e| {
            match_error(e, "Brand", format!("Cannot get the brands of the category with id: {}", id))
        })
    }

    pub async fn get_products_by_category(
        &self,
        id: &str,
    ) -> Result<Vec<ProductWithModel>, ServerError> {
        validate_id(ID_FIELD, id)?;

        self.repo.list_products(id).await.map_err(|e| {
            match_error(e, "Product", format!("Cannot get the products of the category with id: {}", id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxCategoryRepository;
    use crate::test_support::Fixtures;
    use axum::http::StatusCode;
    use uuid::Uuid;

    async fn setup_test_service() -> (Fixtures, CategoryService) {
        let fixtures = Fixtures::new().await;
        let service = CategoryService::new(SqlxCategoryRepository::boxed(fixtures.pool.clone()));
        (fixtures, service)
    }

    fn create_input(name: &str) -> CreateCategoryInput {
        CreateCategoryInput {
            name: name.to_string(),
            picture: Some("https://cdn.example.com/phones.png".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_category() {
        let (_fixtures, service) = setup_test_service().await;

        let created = service
            .create_category(create_input("  Phones  "))
            .await
            .expect("Failed to create category");
        assert_eq!(created.name, "Phones");

        let found = service.get_category(&created.id).await.unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_get_category_invalid_id() {
        let (_fixtures, service) = setup_test_service().await;

        let err = service.get_category("not-an-id").await.unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "\"categoryId\" must be a valid id");
    }

    #[tokio::test]
    async fn test_get_category_not_found() {
        let (_fixtures, service) = setup_test_service().await;

        let err = service
            .get_category(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Category not found");
    }

    #[tokio::test]
    async fn test_create_duplicate_name_conflicts() {
        let (_fixtures, service) = setup_test_service().await;
        service.create_category(create_input("Phones")).await.unwrap();

        let err = service.create_category(create_input("Phones")).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.message(), "Category already exists");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (_fixtures, service) = setup_test_service().await;

        let err = service.create_category(create_input("   ")).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_category_keeps_absent_fields() {
        let (_fixtures, service) = setup_test_service().await;
        let created = service.create_category(create_input("Phones")).await.unwrap();

        let updated = service
            .update_category(
                &created.id,
                UpdateCategoryInput {
                    name: Some("Smartphones".to_string()),
                    picture: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Smartphones");
        assert_eq!(updated.picture, created.picture);
    }

    #[tokio::test]
    async fn test_update_category_requires_a_field() {
        let (_fixtures, service) = setup_test_service().await;
        let created = service.create_category(create_input("Phones")).await.unwrap();

        let err = service
            .update_category(&created.id, UpdateCategoryInput::default())
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_missing_category() {
        let (_fixtures, service) = setup_test_service().await;

        let err = service
            .update_category(
                &Uuid::new_v4().to_string(),
                UpdateCategoryInput {
                    name: Some("Tablets".to_string()),
                    picture: None,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_category() {
        let (_fixtures, service) = setup_test_service().await;
        let created = service.create_category(create_input("Phones")).await.unwrap();

        let deleted = service.delete_category(&created.id).await.unwrap();
        assert_eq!(deleted.id, created.id);

        let err = service.delete_category(&created.id).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_referenced_category_conflicts() {
        let (fixtures, service) = setup_test_service().await;
        let listing = fixtures.listing().await;

        let err = service.delete_category(&listing.category.id).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.message(), "Category is still referenced by other records");
    }

    #[tokio::test]
    async fn test_category_children() {
        let (fixtures, service) = setup_test_service().await;
        let listing = fixtures.listing().await;

        let models = service.get_models_by_category(&listing.category.id).await.unwrap();
        let brands = service.get_brands_by_category(&listing.category.id).await.unwrap();
        let products = service.get_products_by_category(&listing.category.id).await.unwrap();

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].id, listing.model.id);
        assert_eq!(brands.len(), 1);
        assert_eq!(brands[0].id, listing.brand.id);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product.id, listing.product.id);

        let err = service.get_products_by_category("bad").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
