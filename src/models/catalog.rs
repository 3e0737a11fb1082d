//! Brand and model entities
//!
//! A model ("iPhone 13") belongs to exactly one brand and one category, and
//! every product listing points at a model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Category;

/// Manufacturer brand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Brand {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: Utc::now(),
        }
    }
}

/// Product model, linking a brand to a category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: String,
    pub name: String,
    pub brand_id: String,
    pub category_id: String,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn new(name: String, brand_id: String, category_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            brand_id,
            category_id,
            created_at: Utc::now(),
        }
    }
}

/// Model with its brand and category resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelWithRelations {
    #[serde(flatten)]
    pub model: Model,
    pub brand: Brand,
    pub category: Category,
}
