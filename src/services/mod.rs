//! Services layer - Business logic
//!
//! Services are responsible for:
//! - Validating input before any database access
//! - Calling the repositories
//! - Turning missing rows and database failures into [`ServerError`]s
//!
//! [`ServerError`]: crate::error::ServerError

pub mod category;
pub mod product;
pub mod user;

pub use category::CategoryService;
pub use product::{parse_list_options, ProductService};
pub use user::UserService;
