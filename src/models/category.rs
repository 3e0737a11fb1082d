//! Category model
//!
//! Top-level grouping for product models (e.g. "Phones", "Laptops").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier (UUID)
    pub id: String,
    /// Display name, unique across categories
    pub name: String,
    /// Cover picture URL
    pub picture: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category with a freshly generated ID.
    pub fn new(name: String, picture: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            picture,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a new category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Input for updating a category; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "pictures")]
    pub picture: Option<String>,
}

impl UpdateCategoryInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.picture.is_none()
    }
}
