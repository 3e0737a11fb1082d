//! Row mapping shared by the repositories
//!
//! Joined queries alias every column with a table prefix (`p_`, `m_`, `b_`,
//! `c_`, `r_`, `o_`, `u_`) so one mapper serves every query that selects the
//! same fragment. The mappers are generated once per driver row type.

use anyhow::{Context, Result};

use crate::models::{Brand, Category, Model, ModelWithRelations, Product, Room, User};

pub(crate) const PRODUCT_COLUMNS: &str = "\
    p.id AS p_id, p.model_id AS p_model_id, p.owner_id AS p_owner_id, \
    p.buyer_id AS p_buyer_id, p.room_id AS p_room_id, p.price AS p_price, \
    p.description AS p_description, p.pictures AS p_pictures, \
    p.created_at AS p_created_at, p.updated_at AS p_updated_at";

pub(crate) const MODEL_COLUMNS: &str = "\
    m.id AS m_id, m.name AS m_name, m.brand_id AS m_brand_id, \
    m.category_id AS m_category_id, m.created_at AS m_created_at, \
    b.id AS b_id, b.name AS b_name, b.created_at AS b_created_at, \
    c.id AS c_id, c.name AS c_name, c.picture AS c_picture, c.created_at AS c_created_at";

pub(crate) const DETAIL_COLUMNS: &str = "\
    r.id AS r_id, r.duration AS r_duration, r.created_at AS r_created_at, \
    o.id AS o_id, o.name AS o_name, o.email AS o_email, o.image AS o_image, \
    o.created_at AS o_created_at, \
    u.id AS u_id, u.name AS u_name, u.email AS u_email, u.image AS u_image, \
    u.created_at AS u_created_at";

/// products → models → brands/categories
pub(crate) const PRODUCT_MODEL_JOINS: &str = "\
    FROM products p \
    INNER JOIN models m ON m.id = p.model_id \
    INNER JOIN brands b ON b.id = m.brand_id \
    INNER JOIN categories c ON c.id = m.category_id";

/// rooms, owner and buyer on top of [`PRODUCT_MODEL_JOINS`]
pub(crate) const DETAIL_JOINS: &str = "\
    LEFT JOIN rooms r ON r.id = p.room_id \
    INNER JOIN users o ON o.id = p.owner_id \
    LEFT JOIN users u ON u.id = p.buyer_id";

pub(crate) fn encode_pictures(pictures: &[String]) -> Result<String> {
    serde_json::to_string(pictures).context("Failed to encode pictures")
}

pub(crate) fn decode_pictures(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).with_context(|| format!("Invalid pictures column: {}", raw))
}

/// Case-folded copy stored in the `*_lower` search columns
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// LIKE pattern matching `term` anywhere in a `*_lower` column, with
/// wildcards escaped by `\`
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in fold_case(term).chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

macro_rules! row_mappers {
    ($module:ident, $row:ty) => {
        pub(crate) mod $module {
            use super::*;
            use sqlx::Row;

            pub(crate) fn category(row: &$row) -> Result<Category> {
                Ok(Category {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    picture: row.try_get("picture")?,
                    created_at: row.try_get("created_at")?,
                })
            }

            pub(crate) fn brand(row: &$row) -> Result<Brand> {
                Ok(Brand {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    created_at: row.try_get("created_at")?,
                })
            }

            pub(crate) fn model(row: &$row) -> Result<Model> {
                Ok(Model {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    brand_id: row.try_get("brand_id")?,
                    category_id: row.try_get("category_id")?,
                    created_at: row.try_get("created_at")?,
                })
            }

            pub(crate) fn user(row: &$row) -> Result<User> {
                Ok(User {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    image: row.try_get("image")?,
                    created_at: row.try_get("created_at")?,
                })
            }

            pub(crate) fn product(row: &$row) -> Result<Product> {
                let pictures: String = row.try_get("pictures")?;
                Ok(Product {
                    id: row.try_get("id")?,
                    model_id: row.try_get("model_id")?,
                    owner_id: row.try_get("owner_id")?,
                    buyer_id: row.try_get("buyer_id")?,
                    room_id: row.try_get("room_id")?,
                    price: row.try_get("price")?,
                    description: row.try_get("description")?,
                    pictures: decode_pictures(&pictures)?,
                    created_at: row.try_get("created_at")?,
                    updated_at: row.try_get("updated_at")?,
                })
            }

            /// Product selected through [`PRODUCT_COLUMNS`]
            pub(crate) fn prefixed_product(row: &$row) -> Result<Product> {
                let pictures: String = row.try_get("p_pictures")?;
                Ok(Product {
                    id: row.try_get("p_id")?,
                    model_id: row.try_get("p_model_id")?,
                    owner_id: row.try_get("p_owner_id")?,
                    buyer_id: row.try_get("p_buyer_id")?,
                    room_id: row.try_get("p_room_id")?,
                    price: row.try_get("p_price")?,
                    description: row.try_get("p_description")?,
                    pictures: decode_pictures(&pictures)?,
                    created_at: row.try_get("p_created_at")?,
                    updated_at: row.try_get("p_updated_at")?,
                })
            }

            /// Model, brand and category selected through [`MODEL_COLUMNS`]
            pub(crate) fn prefixed_model(row: &$row) -> Result<ModelWithRelations> {
                Ok(ModelWithRelations {
                    model: Model {
                        id: row.try_get("m_id")?,
                        name: row.try_get("m_name")?,
                        brand_id: row.try_get("m_brand_id")?,
                        category_id: row.try_get("m_category_id")?,
                        created_at: row.try_get("m_created_at")?,
                    },
                    brand: Brand {
                        id: row.try_get("b_id")?,
                        name: row.try_get("b_name")?,
                        created_at: row.try_get("b_created_at")?,
                    },
                    category: Category {
                        id: row.try_get("c_id")?,
                        name: row.try_get("c_name")?,
                        picture: row.try_get("c_picture")?,
                        created_at: row.try_get("c_created_at")?,
                    },
                })
            }

            /// Room from a LEFT JOIN; `None` when the product has no room
            pub(crate) fn prefixed_room(row: &$row) -> Result<Option<Room>> {
                let id: Option<String> = row.try_get("r_id")?;
                let Some(id) = id else {
                    return Ok(None);
                };
                Ok(Some(Room {
                    id,
                    duration: row.try_get("r_duration")?,
                    created_at: row.try_get("r_created_at")?,
                }))
            }

            /// User from a join aliased with `prefix` (`o` or `u`)
            pub(crate) fn prefixed_user(row: &$row, prefix: &str) -> Result<Option<User>> {
                let id: Option<String> = row.try_get(format!("{}_id", prefix).as_str())?;
                let Some(id) = id else {
                    return Ok(None);
                };
                Ok(Some(User {
                    id,
                    name: row.try_get(format!("{}_name", prefix).as_str())?,
                    email: row.try_get(format!("{}_email", prefix).as_str())?,
                    image: row.try_get(format!("{}_image", prefix).as_str())?,
                    created_at: row.try_get(format!("{}_created_at", prefix).as_str())?,
                }))
            }
        }
    };
}

row_mappers!(sqlite, sqlx::sqlite::SqliteRow);
row_mappers!(mysql, sqlx::mysql::MySqlRow);
