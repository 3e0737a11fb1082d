//! Category repository
//!
//! Database operations for categories and the catalog entries hanging off
//! them (models, brands, product listings).
//!
//! This module provides:
//! - `CategoryRepository` trait defining the interface for category data access
//! - `SqlxCategoryRepository` implementing the trait for SQLite and MySQL

use crate::db::{Backend, DynDatabasePool};
use crate::models::{Brand, Category, Model, ProductWithModel, UpdateCategoryInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, SqlitePool};
use std::sync::Arc;

use super::rows::{self, MODEL_COLUMNS, PRODUCT_COLUMNS, PRODUCT_MODEL_JOINS};

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a new category
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Category>>;

    /// List all categories ordered by name
    async fn list(&self) -> Result<Vec<Category>>;

    /// Apply the present fields of `input`; `None` if the category doesn't exist
    async fn update(&self, id: &str, input: &UpdateCategoryInput) -> Result<Option<Category>>;

    /// Delete a category, returning the deleted row
    async fn delete(&self, id: &str) -> Result<Option<Category>>;

    /// Models filed under the category
    async fn list_models(&self, category_id: &str) -> Result<Vec<Model>>;

    /// Brands with at least one model in the category
    async fn list_brands(&self, category_id: &str) -> Result<Vec<Brand>>;

    /// Listings whose model is filed under the category
    async fn list_products(&self, category_id: &str) -> Result<Vec<ProductWithModel>>;
}

/// SQLx-based category repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_category_sqlite(pool, category).await,
            Backend::Mysql(pool) => create_category_mysql(pool, category).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Category>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_category_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_category_by_id_mysql(pool, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Category>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_categories_sqlite(pool).await,
            Backend::Mysql(pool) => list_categories_mysql(pool).await,
        }
    }

    async fn update(&self, id: &str, input: &UpdateCategoryInput) -> Result<Option<Category>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => update_category_sqlite(pool, id, input).await,
            Backend::Mysql(pool) => update_category_mysql(pool, id, input).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<Option<Category>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => delete_category_sqlite(pool, id).await,
            Backend::Mysql(pool) => delete_category_mysql(pool, id).await,
        }
    }

    async fn list_models(&self, category_id: &str) -> Result<Vec<Model>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_models_sqlite(pool, category_id).await,
            Backend::Mysql(pool) => list_models_mysql(pool, category_id).await,
        }
    }

    async fn list_brands(&self, category_id: &str) -> Result<Vec<Brand>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_brands_sqlite(pool, category_id).await,
            Backend::Mysql(pool) => list_brands_mysql(pool, category_id).await,
        }
    }

    async fn list_products(&self, category_id: &str) -> Result<Vec<ProductWithModel>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_products_sqlite(pool, category_id).await,
            Backend::Mysql(pool) => list_products_mysql(pool, category_id).await,
        }
    }
}

const SELECT_CATEGORY: &str = "SELECT id, name, picture, created_at FROM categories";

const UPDATE_CATEGORY: &str = r#"
    UPDATE categories
    SET name = COALESCE(?, name), picture = COALESCE(?, picture)
    WHERE id = ?
"#;

const SELECT_MODELS_BY_CATEGORY: &str = r#"
    SELECT id, name, brand_id, category_id, created_at
    FROM models
    WHERE category_id = ?
    ORDER BY name, id
"#;

const SELECT_BRANDS_BY_CATEGORY: &str = r#"
    SELECT b.id, b.name, b.created_at
    FROM brands b
    WHERE EXISTS (
        SELECT 1 FROM models m WHERE m.brand_id = b.id AND m.category_id = ?
    )
    ORDER BY b.name, b.id
"#;

fn products_by_category_sql() -> String {
    format!(
        "SELECT {}, {} {} WHERE m.category_id = ? ORDER BY p.created_at DESC, p.id",
        PRODUCT_COLUMNS, MODEL_COLUMNS, PRODUCT_MODEL_JOINS
    )
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Category> {
    sqlx::query("INSERT INTO categories (id, name, picture, created_at) VALUES (?, ?, ?, ?)")
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.picture)
        .bind(category.created_at)
        .execute(pool)
        .await
        .context("Failed to create category")?;

    Ok(category.clone())
}

async fn get_category_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Category>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_CATEGORY))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by ID")?;

    row.as_ref().map(rows::sqlite::category).transpose()
}

async fn list_categories_sqlite(pool: &SqlitePool) -> Result<Vec<Category>> {
    let rows = sqlx::query(&format!("{} ORDER BY name, id", SELECT_CATEGORY))
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    rows.iter().map(rows::sqlite::category).collect()
}

async fn update_category_sqlite(
    pool: &SqlitePool,
    id: &str,
    input: &UpdateCategoryInput,
) -> Result<Option<Category>> {
    sqlx::query(UPDATE_CATEGORY)
        .bind(&input.name)
        .bind(&input.picture)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update category")?;

    get_category_by_id_sqlite(pool, id).await
}

async fn delete_category_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Category>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_CATEGORY))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to get category by ID")?;

    let Some(row) = row else {
        return Ok(None);
    };
    let category = rows::sqlite::category(&row)?;

    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete category")?;

    tx.commit().await.context("Failed to commit category deletion")?;

    Ok(Some(category))
}

async fn list_models_sqlite(pool: &SqlitePool, category_id: &str) -> Result<Vec<Model>> {
    let rows = sqlx::query(SELECT_MODELS_BY_CATEGORY)
        .bind(category_id)
        .fetch_all(pool)
        .await
        .context("Failed to list models by category")?;

    rows.iter().map(rows::sqlite::model).collect()
}

async fn list_brands_sqlite(pool: &SqlitePool, category_id: &str) -> Result<Vec<Brand>> {
    let rows = sqlx::query(SELECT_BRANDS_BY_CATEGORY)
        .bind(category_id)
        .fetch_all(pool)
        .await
        .context("Failed to list brands by category")?;

    rows.iter().map(rows::sqlite::brand).collect()
}

async fn list_products_sqlite(pool: &SqlitePool, category_id: &str) -> Result<Vec<ProductWithModel>> {
    let rows = sqlx::query(&products_by_category_sql())
        .bind(category_id)
        .fetch_all(pool)
        .await
        .context("Failed to list products by category")?;

    rows.iter()
        .map(|row| {
            Ok(ProductWithModel {
                product: rows::sqlite::prefixed_product(row)?,
                model: rows::sqlite::prefixed_model(row)?,
            })
        })
        .collect()
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Category> {
    sqlx::query("INSERT INTO categories (id, name, picture, created_at) VALUES (?, ?, ?, ?)")
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.picture)
        .bind(category.created_at)
        .execute(pool)
        .await
        .context("Failed to create category")?;

    Ok(category.clone())
}

async fn get_category_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Category>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_CATEGORY))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by ID")?;

    row.as_ref().map(rows::mysql::category).transpose()
}

async fn list_categories_mysql(pool: &MySqlPool) -> Result<Vec<Category>> {
    let rows = sqlx::query(&format!("{} ORDER BY name, id", SELECT_CATEGORY))
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    rows.iter().map(rows::mysql::category).collect()
}

async fn update_category_mysql(
    pool: &MySqlPool,
    id: &str,
    input: &UpdateCategoryInput,
) -> Result<Option<Category>> {
    sqlx::query(UPDATE_CATEGORY)
        .bind(&input.name)
        .bind(&input.picture)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update category")?;

    get_category_by_id_mysql(pool, id).await
}

async fn delete_category_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Category>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let row = sqlx::query(&format!("{} WHERE id = ? FOR UPDATE", SELECT_CATEGORY))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to get category by ID")?;

    let Some(row) = row else {
        return Ok(None);
    };
    let category = rows::mysql::category(&row)?;

    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete category")?;

    tx.commit().await.context("Failed to commit category deletion")?;

    Ok(Some(category))
}

async fn list_models_mysql(pool: &MySqlPool, category_id: &str) -> Result<Vec<Model>> {
    let rows = sqlx::query(SELECT_MODELS_BY_CATEGORY)
        .bind(category_id)
        .fetch_all(pool)
        .await
        .context("Failed to list models by category")?;

    rows.iter().map(rows::mysql::model).collect()
}

async fn list_brands_mysql(pool: &MySqlPool, category_id: &str) -> Result<Vec<Brand>> {
    let rows = sqlx::query(SELECT_BRANDS_BY_CATEGORY)
        .bind(category_id)
        .fetch_all(pool)
        .await
        .context("Failed to list brands by category")?;

    rows.iter().map(rows::mysql::brand).collect()
}

async fn list_products_mysql(pool: &MySqlPool, category_id: &str) -> Result<Vec<ProductWithModel>> {
    let rows = sqlx::query(&products_by_category_sql())
        .bind(category_id)
        .fetch_all(pool)
        .await
        .context("Failed to list products by category")?;

    rows.iter()
        .map(|row| {
            Ok(ProductWithModel {
                product: rows::mysql::prefixed_product(row)?,
                model: rows::mysql::prefixed_model(row)?,
            })
        })
        .collect()
}
