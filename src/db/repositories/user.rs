//! User repository
//!
//! This module provides:
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite and MySQL

use crate::db::{Backend, DynDatabasePool};
use crate::models::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, SqlitePool};
use std::sync::Arc;

use super::rows::{self, fold_case, like_pattern};

/// Maximum number of users returned by a search
pub const SEARCH_LIMIT: i64 = 50;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Get user by email (exact, case-insensitive)
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Users whose name or email contains `query`, ordered by name
    async fn search(&self, query: &str) -> Result<Vec<User>>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_user_sqlite(pool, user).await,
            Backend::Mysql(pool) => create_user_mysql(pool, user).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_user_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_user_by_id_mysql(pool, id).await,
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_user_by_email_sqlite(pool, email).await,
            Backend::Mysql(pool) => get_user_by_email_mysql(pool, email).await,
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<User>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => search_users_sqlite(pool, query).await,
            Backend::Mysql(pool) => search_users_mysql(pool, query).await,
        }
    }
}

const INSERT_USER: &str = r#"
    INSERT INTO users (id, name, email, image, created_at, name_lower, email_lower)
    VALUES (?, ?, ?, ?, ?, ?, ?)
"#;
const SELECT_USER: &str = "SELECT id, name, email, image, created_at FROM users";

const SEARCH_USERS_SQLITE: &str = r#"
    SELECT id, name, email, image, created_at FROM users
    WHERE name_lower LIKE ? ESCAPE '\' OR email_lower LIKE ? ESCAPE '\'
    ORDER BY name, id
    LIMIT ?
"#;

const SEARCH_USERS_MYSQL: &str = r#"
    SELECT id, name, email, image, created_at FROM users
    WHERE name_lower LIKE ? OR email_lower LIKE ?
    ORDER BY name, id
    LIMIT ?
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    sqlx::query(INSERT_USER)
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.image)
        .bind(user.created_at)
        .bind(fold_case(&user.name))
        .bind(fold_case(&user.email))
        .execute(pool)
        .await
        .context("Failed to create user")?;

    Ok(user.clone())
}

async fn get_user_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_USER))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.as_ref().map(rows::sqlite::user).transpose()
}

async fn get_user_by_email_sqlite(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("{} WHERE email_lower = ?", SELECT_USER))
        .bind(fold_case(email))
        .fetch_optional(pool)
        .await
        .context("Failed to get user by email")?;

    row.as_ref().map(rows::sqlite::user).transpose()
}

async fn search_users_sqlite(pool: &SqlitePool, query: &str) -> Result<Vec<User>> {
    let pattern = like_pattern(query);
    let rows = sqlx::query(SEARCH_USERS_SQLITE)
        .bind(&pattern)
        .bind(&pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(pool)
        .await
        .context("Failed to search users")?;

    rows.iter().map(rows::sqlite::user).collect()
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    sqlx::query(INSERT_USER)
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.image)
        .bind(user.created_at)
        .bind(fold_case(&user.name))
        .bind(fold_case(&user.email))
        .execute(pool)
        .await
        .context("Failed to create user")?;

    Ok(user.clone())
}

async fn get_user_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_USER))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.as_ref().map(rows::mysql::user).transpose()
}

async fn get_user_by_email_mysql(pool: &MySqlPool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("{} WHERE email_lower = ?", SELECT_USER))
        .bind(fold_case(email))
        .fetch_optional(pool)
        .await
        .context("Failed to get user by email")?;

    row.as_ref().map(rows::mysql::user).transpose()
}

async fn search_users_mysql(pool: &MySqlPool, query: &str) -> Result<Vec<User>> {
    let pattern = like_pattern(query);
    let rows = sqlx::query(SEARCH_USERS_MYSQL)
        .bind(&pattern)
        .bind(&pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(pool)
        .await
        .context("Failed to search users")?;

    rows.iter().map(rows::mysql::user).collect()
}
