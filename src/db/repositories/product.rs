//! Product repository
//!
//! Listings are stored in `products` with their pictures as a JSON array
//! column. Each listing owns a sale room: the room is inserted and removed in
//! the same transaction as the product.

use crate::db::{Backend, DynDatabasePool};
use crate::models::{ListOptions, Product, ProductDetail, ProductWithModel, Room};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, SqlitePool};
use std::sync::Arc;

use super::rows::{
    self, encode_pictures, fold_case, like_pattern, DETAIL_COLUMNS, DETAIL_JOINS, MODEL_COLUMNS,
    PRODUCT_COLUMNS, PRODUCT_MODEL_JOINS,
};

/// Product repository trait
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a listing together with its room
    async fn create(&self, product: &Product, room: &Room) -> Result<Product>;

    /// Get a listing with model, room, owner and buyer resolved
    async fn get_detail(&self, id: &str) -> Result<Option<ProductDetail>>;

    /// List a page of listings
    async fn list(&self, options: &ListOptions) -> Result<Vec<ProductWithModel>>;

    /// Set price and/or pictures; `None` if the listing doesn't exist
    async fn update(
        &self,
        id: &str,
        price: Option<f64>,
        pictures: Option<&[String]>,
    ) -> Result<Option<Product>>;

    /// Delete a listing and its room, returning the deleted listing
    async fn delete(&self, id: &str) -> Result<Option<Product>>;

    /// Listings owned by a user, newest first
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ProductWithModel>>;
}

/// SQLx-based product repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxProductRepository {
    pool: DynDatabasePool,
}

impl SqlxProductRepository {
    /// Create a new SQLx product repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ProductRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ProductRepository for SqlxProductRepository {
    async fn create(&self, product: &Product, room: &Room) -> Result<Product> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_product_sqlite(pool, product, room).await,
            Backend::Mysql(pool) => create_product_mysql(pool, product, room).await,
        }
    }

    async fn get_detail(&self, id: &str) -> Result<Option<ProductDetail>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_product_detail_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_product_detail_mysql(pool, id).await,
        }
    }

    async fn list(&self, options: &ListOptions) -> Result<Vec<ProductWithModel>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_products_sqlite(pool, options).await,
            Backend::Mysql(pool) => list_products_mysql(pool, options).await,
        }
    }

    async fn update(
        &self,
        id: &str,
        price: Option<f64>,
        pictures: Option<&[String]>,
    ) -> Result<Option<Product>> {
        let pictures = pictures.map(encode_pictures).transpose()?;
        match self.pool.backend() {
            Backend::Sqlite(pool) => update_product_sqlite(pool, id, price, pictures).await,
            Backend::Mysql(pool) => update_product_mysql(pool, id, price, pictures).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<Option<Product>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => delete_product_sqlite(pool, id).await,
            Backend::Mysql(pool) => delete_product_mysql(pool, id).await,
        }
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ProductWithModel>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_products_by_owner_sqlite(pool, owner_id).await,
            Backend::Mysql(pool) => list_products_by_owner_mysql(pool, owner_id).await,
        }
    }
}

const INSERT_ROOM: &str = "INSERT INTO rooms (id, duration, created_at) VALUES (?, ?, ?)";

const INSERT_PRODUCT: &str = r#"
    INSERT INTO products (id, model_id, owner_id, buyer_id, room_id, price, description, pictures, created_at, updated_at, description_lower)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const SELECT_PRODUCT: &str = r#"
    SELECT id, model_id, owner_id, buyer_id, room_id, price, description, pictures, created_at, updated_at
    FROM products
    WHERE id = ?
"#;

const UPDATE_PRODUCT: &str = r#"
    UPDATE products
    SET price = COALESCE(?, price), pictures = COALESCE(?, pictures), updated_at = ?
    WHERE id = ?
"#;

fn detail_sql() -> String {
    format!(
        "SELECT {}, {}, {} {} {} WHERE p.id = ?",
        PRODUCT_COLUMNS, MODEL_COLUMNS, DETAIL_COLUMNS, PRODUCT_MODEL_JOINS, DETAIL_JOINS
    )
}

/// `like_clause` differs per dialect: SQLite needs an explicit ESCAPE,
/// MySQL already treats `\` as the LIKE escape.
fn list_sql(options: &ListOptions, like_clause: &str) -> String {
    let filter = if options.search.is_some() {
        format!(" WHERE p.description_lower {}", like_clause)
    } else {
        String::new()
    };

    format!(
        "SELECT {}, {} {}{} ORDER BY {} LIMIT ? OFFSET ?",
        PRODUCT_COLUMNS,
        MODEL_COLUMNS,
        PRODUCT_MODEL_JOINS,
        filter,
        options.sort.order_by()
    )
}

fn by_owner_sql() -> String {
    format!(
        "SELECT {}, {} {} WHERE p.owner_id = ? ORDER BY p.created_at DESC, p.id",
        PRODUCT_COLUMNS, MODEL_COLUMNS, PRODUCT_MODEL_JOINS
    )
}

const SQLITE_LIKE: &str = "LIKE ? ESCAPE '\\'";
const MYSQL_LIKE: &str = "LIKE ?";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_product_sqlite(pool: &SqlitePool, product: &Product, room: &Room) -> Result<Product> {
    let pictures = encode_pictures(&product.pictures)?;
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(INSERT_ROOM)
        .bind(&room.id)
        .bind(room.duration)
        .bind(room.created_at)
        .execute(&mut *tx)
        .await
        .context("Failed to create room")?;

    sqlx::query(INSERT_PRODUCT)
        .bind(&product.id)
        .bind(&product.model_id)
        .bind(&product.owner_id)
        .bind(&product.buyer_id)
        .bind(&room.id)
        .bind(product.price)
        .bind(&product.description)
        .bind(&pictures)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(fold_case(&product.description))
        .execute(&mut *tx)
        .await
        .context("Failed to create product")?;

    tx.commit().await.context("Failed to commit product creation")?;

    Ok(Product {
        room_id: Some(room.id.clone()),
        ..product.clone()
    })
}

async fn get_product_detail_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<ProductDetail>> {
    let row = sqlx::query(&detail_sql())
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get product by ID")?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(ProductDetail {
        product: rows::sqlite::prefixed_product(&row)?,
        model: rows::sqlite::prefixed_model(&row)?,
        room: rows::sqlite::prefixed_room(&row)?,
        owner: rows::sqlite::prefixed_user(&row, "o")?
            .ok_or_else(|| anyhow!("Product {} has no owner", id))?,
        buyer: rows::sqlite::prefixed_user(&row, "u")?,
    }))
}

async fn list_products_sqlite(pool: &SqlitePool, options: &ListOptions) -> Result<Vec<ProductWithModel>> {
    let sql = list_sql(options, SQLITE_LIKE);
    let mut query = sqlx::query(&sql);
    if let Some(search) = &options.search {
        query = query.bind(like_pattern(search));
    }

    let rows = query
        .bind(options.limit())
        .bind(options.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list products")?;

    rows.iter()
        .map(|row| {
            Ok(ProductWithModel {
                product: rows::sqlite::prefixed_product(row)?,
                model: rows::sqlite::prefixed_model(row)?,
            })
        })
        .collect()
}

async fn update_product_sqlite(
    pool: &SqlitePool,
    id: &str,
    price: Option<f64>,
    pictures: Option<String>,
) -> Result<Option<Product>> {
    sqlx::query(UPDATE_PRODUCT)
        .bind(price)
        .bind(pictures)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update product")?;

    let row = sqlx::query(SELECT_PRODUCT)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get product by ID")?;

    row.as_ref().map(rows::sqlite::product).transpose()
}

async fn delete_product_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Product>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let row = sqlx::query(SELECT_PRODUCT)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to get product by ID")?;

    let Some(row) = row else {
        return Ok(None);
    };
    let product = rows::sqlite::product(&row)?;

    sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete product")?;

    if let Some(room_id) = &product.room_id {
        sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(room_id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete room")?;
    }

    tx.commit().await.context("Failed to commit product deletion")?;

    Ok(Some(product))
}

async fn list_products_by_owner_sqlite(pool: &SqlitePool, owner_id: &str) -> Result<Vec<ProductWithModel>> {
    let rows = sqlx::query(&by_owner_sql())
        .bind(owner_id)
        .fetch_all(pool)
        .await
        .context("Failed to list products by owner")?;

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

async fn create_product_mysql(pool: &MySqlPool, product: &Product, room: &Room) -> Result<Product> {
    let pictures = encode_pictures(&product.pictures)?;
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(INSERT_ROOM)
        .bind(&room.id)
        .bind(room.duration)
        .bind(room.created_at)
        .execute(&mut *tx)
        .await
        .context("Failed to create room")?;

    sqlx::query(INSERT_PRODUCT)
        .bind(&product.id)
        .bind(&product.model_id)
        .bind(&product.owner_id)
        .bind(&product.buyer_id)
        .bind(&room.id)
        .bind(product.price)
        .bind(&product.description)
        .bind(&pictures)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(fold_case(&product.description))
        .execute(&mut *tx)
        .await
        .context("Failed to create product")?;

    tx.commit().await.context("Failed to commit product creation")?;

    Ok(Product {
        room_id: Some(room.id.clone()),
        ..product.clone()
    })
}

async fn get_product_detail_mysql(pool: &MySqlPool, id: &str) -> Result<Option<ProductDetail>> {
    let row = sqlx::query(&detail_sql())
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get product by ID")?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(ProductDetail {
        product: rows::mysql::prefixed_product(&row)?,
        model: rows::mysql::prefixed_model(&row)?,
        room: rows::mysql::prefixed_room(&row)?,
        owner: rows::mysql::prefixed_user(&row, "o")?
            .ok_or_else(|| anyhow!("Product {} has no owner", id))?,
        buyer: rows::mysql::prefixed_user(&row, "u")?,
    }))
}

async fn list_products_mysql(pool: &MySqlPool, options: &ListOptions) -> Result<Vec<ProductWithModel>> {
    let sql = list_sql(options, MYSQL_LIKE);
    let mut query = sqlx::query(&sql);
    if let Some(search) = &options.search {
        query = query.bind(like_pattern(search));
    }

    let rows = query
        .bind(options.limit())
        .bind(options.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list products")?;

    rows.iter()
        .map(|row| {
            Ok(ProductWithModel {
                product: rows::mysql::prefixed_product(row)?,
                model: rows::mysql::prefixed_model(row)?,
            })
        })
        .collect()
}

async fn update_product_mysql(
    pool: &MySqlPool,
    id: &str,
    price: Option<f64>,
    pictures: Option<String>,
) -> Result<Option<Product>> {
    sqlx::query(UPDATE_PRODUCT)
        .bind(price)
        .bind(pictures)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update product")?;

    let row = sqlx::query(SELECT_PRODUCT)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get product by ID")?;

    row.as_ref().map(rows::mysql::product).transpose()
}

async fn delete_product_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Product>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let row = sqlx::query(&format!("{} FOR UPDATE", SELECT_PRODUCT.trim_end()))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to get product by ID")?;

    let Some(row) = row else {
        return Ok(None);
    };
    let product = rows::mysql::product(&row)?;

    sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete product")?;

    if let Some(room_id) = &product.room_id {
        sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(room_id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete room")?;
    }

    tx.commit().await.context("Failed to commit product deletion")?;

    Ok(Some(product))
}

async fn list_products_by_owner_mysql(pool: &MySqlPool, owner_id: &str) -> Result<Vec<ProductWithModel>> {
    let rows = sqlx::query(&by_owner_sql())
        .bind(owner_id)
        .fetch_all(pool)
        .await
        .context("Failed to list products by owner")?;

    rows.iter()
        .map(|row| {
            Ok(ProductWithModel {
                product: rows::mysql::prefixed_product(row)?,
                model: rows::mysql::prefixed_model(row)?,
            })
        })
        .collect()
}
