//! Data models
//!
//! Entities stored by the marketplace (Category, Brand, Model, Product, Room,
//! User), the joined views returned by the API, and the inputs accepted by
//! the services.

mod catalog;
mod category;
mod product;
mod user;

pub use catalog::{Brand, Model, ModelWithRelations};
pub use category::{Category, CreateCategoryInput, UpdateCategoryInput};
pub use product::{
    CreateProductInput, ListOptions, ListQuery, Product, ProductDetail, ProductSort,
    ProductWithModel, Room, UpdateProductInput, DEFAULT_ROOM_DURATION_SECS,
};
pub use user::{CreateUserInput, User};
