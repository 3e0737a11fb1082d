//! User service
//!
//! Lookup and search of marketplace users, and the listings they own.

use crate::db::repositories::{ProductRepository, UserRepository};
use crate::error::{match_error, ServerError};
use crate::models::{CreateUserInput, ProductWithModel, User};
use crate::validation::{
    validate_email, validate_id, validate_name, validate_picture, validate_search_query,
    MAX_NAME_LEN,
};
use std::sync::Arc;

const ENTITY: &str = "User";

/// User service
pub struct UserService {
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { users, products }
    }

    /// Register a user
    ///
    /// # Errors
    /// - 400 on invalid name, email or image
    /// - 409 if the email is already registered
    pub async fn create_user(&self, input: CreateUserInput) -> Result<User, ServerError> {
        let name = validate_name("name", &input.name, MAX_NAME_LEN)?;
        let email = input.email.trim().to_lowercase();
        validate_email(&email)?;
        if let Some(image) = &input.image {
            validate_picture("image", image)?;
        }

        let user = User::new(name, email, input.image);
        let created = self.users.create(&user).await.map_err(|e| {
            match_error(e, ENTITY, format!("Cannot create the user with email: {}", user.email))
        })?;

        tracing::info!(id = %created.id, "User created");
        Ok(created)
    }

    /// Users whose name or email contains `query`, case-insensitively
    pub async fn search_users(&self, query: &str) -> Result<Vec<User>, ServerError> {
        let query = validate_search_query(query)?;

        self.users
            .search(&query)
            .await
            .map_err(|e| match_error(e, ENTITY, format!("Cannot search users with query: {}", query)))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User, ServerError> {
        let email = email.trim();
        validate_email(email)?;

        self.users
            .get_by_email(email)
            .await
            .map_err(|e| match_error(e, ENTITY, format!("Cannot find user with email: {}", email)))?
            .ok_or_else(|| ServerError::not_found(format!("User with email: {} not found", email)))
    }

    /// Listings owned by the user; empty when the user has none or doesn't exist
    pub async fn get_products_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ProductWithModel>, ServerError> {
        validate_id("userId", user_id)?;

        self.products.list_by_owner(user_id).await.map_err(|e| {
            match_error(
                e,
                "Product",
                format!("Cannot find listings for user with id: {}", user_id),
            )
        })
    }
}
