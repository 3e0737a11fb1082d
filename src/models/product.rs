//! Product model
//!
//! A product is a single listing: one physical item of a given model, put up
//! for sale by its owner inside a time-boxed room.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{ModelWithRelations, User};

/// Default room duration when a listing does not specify one (7 days)
pub const DEFAULT_ROOM_DURATION_SECS: i64 = 7 * 24 * 60 * 60;

/// Product listing entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub model_id: String,
    pub owner_id: String,
    pub buyer_id: Option<String>,
    pub room_id: Option<String>,
    pub price: f64,
    pub description: String,
    pub pictures: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// New unsold listing without a room; the room is attached on insert
    pub fn new(
        model_id: String,
        owner_id: String,
        price: f64,
        description: String,
        pictures: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            model_id,
            owner_id,
            buyer_id: None,
            room_id: None,
            price,
            description,
            pictures,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Sale room attached to a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    /// Room lifetime in seconds
    pub duration: i64,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(duration: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            duration,
            created_at: Utc::now(),
        }
    }

    /// When the room stops accepting offers
    pub fn closes_at(&self) -> DateTime<Utc> {
        self.created_at + chrono::Duration::seconds(self.duration)
    }
}

/// Product with its model, brand and category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductWithModel {
    #[serde(flatten)]
    pub product: Product,
    pub model: ModelWithRelations,
}

/// Product with every relation resolved, as returned by the detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub model: ModelWithRelations,
    pub room: Option<Room>,
    pub owner: User,
    pub buyer: Option<User>,
}

/// Input for creating a listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub user_id: String,
    pub model_id: String,
    pub price: f64,
    pub description: String,
    pub pictures: Vec<String>,
    /// Room duration in seconds; defaults to [`DEFAULT_ROOM_DURATION_SECS`]
    #[serde(default)]
    pub duration: Option<i64>,
}

/// Input for updating a listing; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, alias = "images")]
    pub pictures: Option<Vec<String>>,
}

impl UpdateProductInput {
    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.pictures.is_none()
    }
}

/// Ordering applied when listing products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
}

impl ProductSort {
    /// ORDER BY clause for the `products` table aliased as `p`
    pub fn order_by(&self) -> &'static str {
        match self {
            ProductSort::Newest => "p.created_at DESC, p.id",
            ProductSort::Oldest => "p.created_at ASC, p.id",
            ProductSort::PriceAsc => "p.price ASC, p.id",
            ProductSort::PriceDesc => "p.price DESC, p.id",
        }
    }
}

impl fmt::Display for ProductSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductSort::Newest => write!(f, "newest"),
            ProductSort::Oldest => write!(f, "oldest"),
            ProductSort::PriceAsc => write!(f, "price_asc"),
            ProductSort::PriceDesc => write!(f, "price_desc"),
        }
    }
}

impl FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(ProductSort::Newest),
            "oldest" => Ok(ProductSort::Oldest),
            "price_asc" => Ok(ProductSort::PriceAsc),
            "price_desc" => Ok(ProductSort::PriceDesc),
            _ => Err(format!("Invalid sort order: {}", s)),
        }
    }
}

/// Raw listing options as they arrive in the query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default, alias = "per_page")]
    pub per_page: Option<i64>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default, alias = "query")]
    pub search: Option<String>,
}

/// Validated listing options
#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
    pub sort: ProductSort,
    /// Case-insensitive substring matched against the description
    pub search: Option<String>,
}

impl ListOptions {
    pub const DEFAULT_PER_PAGE: u32 = 20;
    pub const MAX_PER_PAGE: u32 = 100;

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.per_page as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
            sort: ProductSort::default(),
            search: None,
        }
    }
}
