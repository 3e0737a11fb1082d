//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the queries for one aggregate and returns
//! `anyhow::Result`; services turn failures into HTTP errors.

pub mod catalog;
pub mod category;
pub mod product;
pub(crate) mod rows;
pub mod user;

pub use catalog::{CatalogRepository, SqlxCatalogRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use product::{ProductRepository, SqlxProductRepository};
pub use user::{SqlxUserRepository, UserRepository};
