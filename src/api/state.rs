//! Shared application state

use std::sync::Arc;

use crate::db::repositories::{
    SqlxCatalogRepository, SqlxCategoryRepository, SqlxProductRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::services::{CategoryService, ProductService, UserService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub category_service: Arc<CategoryService>,
    pub product_service: Arc<ProductService>,
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Wire the SQLx repositories and services on top of `pool`
    pub fn new(pool: DynDatabasePool) -> Self {
        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let catalog_repo = SqlxCatalogRepository::boxed(pool.clone());
        let product_repo = SqlxProductRepository::boxed(pool.clone());
        let user_repo = SqlxUserRepository::boxed(pool.clone());

        Self {
            category_service: Arc::new(CategoryService::new(category_repo)),
            product_service: Arc::new(ProductService::new(
                product_repo.clone(),
                catalog_repo,
                user_repo.clone(),
            )),
            user_service: Arc::new(UserService::new(user_repo, product_repo)),
            pool,
        }
    }
}
