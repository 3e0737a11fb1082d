//! User model
//!
//! Users own product listings and may appear as the buyer of one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (UUID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address (unique)
    pub email: String,
    /// Avatar URL
    pub image: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, image: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            image,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image: Option<String>,
}
