//! Catalog repository
//!
//! Brands and models are reference data: they are written by seeding and
//! looked up when listings are created.

use crate::db::{Backend, DynDatabasePool};
use crate::models::{Brand, Model};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, SqlitePool};
use std::sync::Arc;

use super::rows;

/// Catalog repository trait
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_brand(&self, brand: &Brand) -> Result<Brand>;

    async fn get_brand(&self, id: &str) -> Result<Option<Brand>>;

    async fn create_model(&self, model: &Model) -> Result<Model>;

    async fn get_model(&self, id: &str) -> Result<Option<Model>>;
}

/// SQLx-based catalog repository implementation
pub struct SqlxCatalogRepository {
    pool: DynDatabasePool,
}

impl SqlxCatalogRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CatalogRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CatalogRepository for SqlxCatalogRepository {
    async fn create_brand(&self, brand: &Brand) -> Result<Brand> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_brand_sqlite(pool, brand).await,
            Backend::Mysql(pool) => create_brand_mysql(pool, brand).await,
        }
    }

    async fn get_brand(&self, id: &str) -> Result<Option<Brand>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_brand_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_brand_mysql(pool, id).await,
        }
    }

    async fn create_model(&self, model: &Model) -> Result<Model> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_model_sqlite(pool, model).await,
            Backend::Mysql(pool) => create_model_mysql(pool, model).await,
        }
    }

    async fn get_model(&self, id: &str) -> Result<Option<Model>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_model_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_model_mysql(pool, id).await,
        }
    }
}

const INSERT_BRAND: &str = "INSERT INTO brands (id, name, created_at) VALUES (?, ?, ?)";
const SELECT_BRAND: &str = "SELECT id, name, created_at FROM brands WHERE id = ?";
const INSERT_MODEL: &str =
    "INSERT INTO models (id, name, brand_id, category_id, created_at) VALUES (?, ?, ?, ?, ?)";
const SELECT_MODEL: &str =
    "SELECT id, name, brand_id, category_id, created_at FROM models WHERE id = ?";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_brand_sqlite(pool: &SqlitePool, brand: &Brand) -> Result<Brand> {
    sqlx::query(INSERT_BRAND)
        .bind(&brand.id)
        .bind(&brand.name)
        .bind(brand.created_at)
        .execute(pool)
        .await
        .context("Failed to create brand")?;

    Ok(brand.clone())
}

async fn get_brand_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Brand>> {
    let row = sqlx::query(SELECT_BRAND)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get brand by ID")?;

    row.as_ref().map(rows::sqlite::brand).transpose()
}

async fn create_model_sqlite(pool: &SqlitePool, model: &Model) -> Result<Model> {
    sqlx::query(INSERT_MODEL)
        .bind(&model.id)
        .bind(&model.name)
        .bind(&model.brand_id)
        .bind(&model.category_id)
        .bind(model.created_at)
        .execute(pool)
        .await
        .context("Failed to create model")?;

    Ok(model.clone())
}

async fn get_model_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Model>> {
    let row = sqlx::query(SELECT_MODEL)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get model by ID")?;

    row.as_ref().map(rows::sqlite::model).transpose()
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_brand_mysql(pool: &MySqlPool, brand: &Brand) -> Result<Brand> {
    sqlx::query(INSERT_BRAND)
        .bind(&brand.id)
        .bind(&brand.name)
        .bind(brand.created_at)
        .execute(pool)
        .await
        .context("Failed to create brand")?;

    Ok(brand.clone())
}

async fn get_brand_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Brand>> {
    let row = sqlx::query(SELECT_BRAND)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get brand by ID")?;

    row.as_ref().map(rows::mysql::brand).transpose()
}

async fn create_model_mysql(pool: &MySqlPool, model: &Model) -> Result<Model> {
    sqlx::query(INSERT_MODEL)
        .bind(&model.id)
        .bind(&model.name)
        .bind(&model.brand_id)
        .bind(&model.category_id)
        .bind(model.created_at)
        .execute(pool)
        .await
        .context("Failed to create model")?;

    Ok(model.clone())
}

async fn get_model_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Model>> {
    let row = sqlx::query(SELECT_MODEL)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get model by ID")?;

    row.as_ref().map(rows::mysql::model).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixtures;

    #[tokio::test]
    async fn test_brand_roundtrip() {
        let fixtures = Fixtures::new().await;
        let repo = SqlxCatalogRepository::new(fixtures.pool.clone());

        let brand = repo.create_brand(&Brand::new("Apple".to_string())).await.unwrap();
        let found = repo.get_brand(&brand.id).await.unwrap().expect("Brand not found");

        assert_eq!(found.name, "Apple");
        assert!(repo.get_brand("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_brand_rejected() {
        let fixtures = Fixtures::new().await;
        let repo = SqlxCatalogRepository::new(fixtures.pool.clone());
        repo.create_brand(&Brand::new("Apple".to_string())).await.unwrap();

        assert!(repo.create_brand(&Brand::new("Apple".to_string())).await.is_err());
    }

    #[tokio::test]
    async fn test_model_requires_existing_brand_and_category() {
        let fixtures = Fixtures::new().await;
        let repo = SqlxCatalogRepository::new(fixtures.pool.clone());
        let category = fixtures.category("Phones").await;

        let orphan = Model::new("iPhone 13".to_string(), "missing".to_string(), category.id.clone());
        assert!(repo.create_model(&orphan).await.is_err());

        let brand = fixtures.brand("Apple").await;
        let model = Model::new("iPhone 13".to_string(), brand.id.clone(), category.id.clone());
        repo.create_model(&model).await.expect("Failed to create model");

        let found = repo.get_model(&model.id).await.unwrap().expect("Model not found");
        assert_eq!(found.brand_id, brand.id);
        assert_eq!(found.category_id, category.id);
    }
}
