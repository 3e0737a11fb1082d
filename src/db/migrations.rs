//! Database migrations module
//!
//! Migrations are embedded in the binary as SQL strings, one variant per
//! supported driver, and tracked in the `_migrations` table.
//!
//! # Usage
//!
//! ```ignore
//! use marketplace::db::{create_pool, migrations};
//!
//! let pool = create_pool(&config).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

use anyhow::{Context, Result};
use sqlx::{MySqlPool, SqlitePool};

use super::{Backend, DynDatabasePool};
use crate::config::DatabaseDriver;

/// A database migration with SQL for both SQLite and MySQL
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements for SQLite
    pub up_sqlite: &'static str,
    /// SQL statements for MySQL
    pub up_mysql: &'static str,
}

/// All schema migrations, in application order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS users (
                id VARCHAR(36) PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                image TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_name ON users(name);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id VARCHAR(36) PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                image TEXT,
                created_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6)
            );
            CREATE INDEX idx_users_name ON users(name);
        "#,
    },
    Migration {
        version: 2,
        name: "create_categories",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS categories (
                id VARCHAR(36) PRIMARY KEY,
                name VARCHAR(100) NOT NULL UNIQUE,
                picture TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS categories (
                id VARCHAR(36) PRIMARY KEY,
                name VARCHAR(100) NOT NULL UNIQUE,
                picture TEXT,
                created_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6)
            );
        "#,
    },
    Migration {
        version: 3,
        name: "create_brands_and_models",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS brands (
                id VARCHAR(36) PRIMARY KEY,
                name VARCHAR(100) NOT NULL UNIQUE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS models (
                id VARCHAR(36) PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                brand_id VARCHAR(36) NOT NULL,
                category_id VARCHAR(36) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (brand_id) REFERENCES brands(id) ON DELETE RESTRICT,
                FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE RESTRICT
            );
            CREATE INDEX IF NOT EXISTS idx_models_brand_id ON models(brand_id);
            CREATE INDEX IF NOT EXISTS idx_models_category_id ON models(category_id);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS brands (
                id VARCHAR(36) PRIMARY KEY,
                name VARCHAR(100) NOT NULL UNIQUE,
                created_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6)
            );
            CREATE TABLE IF NOT EXISTS models (
                id VARCHAR(36) PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                brand_id VARCHAR(36) NOT NULL,
                category_id VARCHAR(36) NOT NULL,
                created_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
                FOREIGN KEY (brand_id) REFERENCES brands(id) ON DELETE RESTRICT,
                FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE RESTRICT
            );
        "#,
    },
    Migration {
        version: 4,
        name: "create_rooms_and_products",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS rooms (
                id VARCHAR(36) PRIMARY KEY,
                duration INTEGER NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS products (
                id VARCHAR(36) PRIMARY KEY,
                model_id VARCHAR(36) NOT NULL,
                owner_id VARCHAR(36) NOT NULL,
                buyer_id VARCHAR(36),
                room_id VARCHAR(36),
                price REAL NOT NULL,
                description TEXT NOT NULL,
                pictures TEXT NOT NULL DEFAULT '[]',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (model_id) REFERENCES models(id) ON DELETE RESTRICT,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE RESTRICT,
                FOREIGN KEY (buyer_id) REFERENCES users(id) ON DELETE SET NULL,
                FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_products_model_id ON products(model_id);
            CREATE INDEX IF NOT EXISTS idx_products_owner_id ON products(owner_id);
            CREATE INDEX IF NOT EXISTS idx_products_created_at ON products(created_at);
            CREATE INDEX IF NOT EXISTS idx_products_price ON products(price);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS rooms (
                id VARCHAR(36) PRIMARY KEY,
                duration BIGINT NOT NULL,
                created_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6)
            );
            CREATE TABLE IF NOT EXISTS products (
                id VARCHAR(36) PRIMARY KEY,
                model_id VARCHAR(36) NOT NULL,
                owner_id VARCHAR(36) NOT NULL,
                buyer_id VARCHAR(36),
                room_id VARCHAR(36),
                price DOUBLE NOT NULL,
                description TEXT NOT NULL,
                pictures TEXT NOT NULL,
                created_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
                updated_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
                FOREIGN KEY (model_id) REFERENCES models(id) ON DELETE RESTRICT,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE RESTRICT,
                FOREIGN KEY (buyer_id) REFERENCES users(id) ON DELETE SET NULL,
                FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE SET NULL
            );
            CREATE INDEX idx_products_created_at ON products(created_at);
            CREATE INDEX idx_products_price ON products(price);
        "#,
    },
    // Lowercased copies of the searchable text, written by the repositories.
    // SQLite's LOWER() and LIKE only fold ASCII, so folding happens in Rust.
    Migration {
        version: 5,
        name: "add_search_columns",
        up_sqlite: r#"
            ALTER TABLE users ADD COLUMN name_lower VARCHAR(100) NOT NULL DEFAULT '';
            ALTER TABLE users ADD COLUMN email_lower VARCHAR(255) NOT NULL DEFAULT '';
            ALTER TABLE products ADD COLUMN description_lower TEXT NOT NULL DEFAULT '';
            UPDATE users SET name_lower = LOWER(name), email_lower = LOWER(email);
            UPDATE products SET description_lower = LOWER(description);
            CREATE INDEX IF NOT EXISTS idx_users_email_lower ON users(email_lower);
        "#,
        up_mysql: r#"
            ALTER TABLE users ADD COLUMN name_lower VARCHAR(100) NOT NULL DEFAULT '';
            ALTER TABLE users ADD COLUMN email_lower VARCHAR(255) NOT NULL DEFAULT '';
            ALTER TABLE products ADD COLUMN description_lower TEXT;
            UPDATE users SET name_lower = LOWER(name), email_lower = LOWER(email);
            UPDATE products SET description_lower = LOWER(description);
            CREATE INDEX idx_users_email_lower ON users(email_lower);
        "#,
    },
];

/// Run all pending migrations.
///
/// # Returns
///
/// Number of migrations applied
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied_versions = get_applied_versions(pool).await?;

    let mut count = 0;

    for migration in MIGRATIONS {
        if !applied_versions.contains(&(migration.version as i64)) {
            tracing::info!(
                "Applying migration {}: {}",
                migration.version,
                migration.name
            );
            apply_migration(pool, migration)
                .await
                .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

async fn create_migrations_table(pool: &DynDatabasePool) -> Result<()> {
    let sql = match pool.driver() {
        DatabaseDriver::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
        DatabaseDriver::Mysql => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INT PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
    };

    pool.execute(sql).await?;
    Ok(())
}

async fn get_applied_versions(pool: &DynDatabasePool) -> Result<Vec<i64>> {
    match pool.backend() {
        Backend::Sqlite(pool) => get_applied_versions_sqlite(pool).await,
        Backend::Mysql(pool) => get_applied_versions_mysql(pool).await,
    }
}

async fn get_applied_versions_sqlite(pool: &SqlitePool) -> Result<Vec<i64>> {
    sqlx::query_scalar("SELECT version FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")
}

async fn get_applied_versions_mysql(pool: &MySqlPool) -> Result<Vec<i64>> {
    let versions: Vec<i32> = sqlx::query_scalar("SELECT version FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;

    Ok(versions.into_iter().map(i64::from).collect())
}

async fn apply_migration(pool: &DynDatabasePool, migration: &Migration) -> Result<()> {
    match pool.backend() {
        Backend::Sqlite(pool) => apply_migration_sqlite(pool, migration).await,
        Backend::Mysql(pool) => apply_migration_mysql(pool, migration).await,
    }
}

async fn apply_migration_sqlite(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin migration transaction")?;

    for statement in split_sql_statements(migration.up_sqlite) {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await
        .context("Failed to record migration")?;

    tx.commit().await.context("Failed to commit migration")?;

    Ok(())
}

// MySQL commits DDL implicitly, so statements run one by one without a transaction.
async fn apply_migration_mysql(pool: &MySqlPool, migration: &Migration) -> Result<()> {
    for statement in split_sql_statements(migration.up_mysql) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await
        .context("Failed to record migration")?;

    Ok(())
}

/// Truncate SQL for error messages
fn truncate_sql(sql: &str) -> String {
    match sql.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

/// Split SQL into individual statements, skipping comment-only fragments
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty() && !is_comment_only(stmt))
        .collect()
}

fn is_comment_only(s: &str) -> bool {
    s.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}

/// Check if migrations are up to date
pub async fn is_up_to_date(pool: &DynDatabasePool) -> Result<bool> {
    Ok(pending_count(pool).await? == 0)
}

/// Get pending migrations count
pub async fn pending_count(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = get_applied_versions(pool).await?;
    Ok(MIGRATIONS.len().saturating_sub(applied.len()))
}
