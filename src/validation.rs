//! Input validation
//!
//! Schema checks run by the services before touching the database. Every
//! failure is a 400 [`ServerError`] whose message names the offending field,
//! e.g. `"price" must be a positive number`.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::error::ServerError;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MAX_PICTURES: usize = 10;
pub const MAX_PICTURE_LEN: usize = 2048;
pub const MAX_QUERY_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 255;

/// Shortest sale room, one hour
pub const MIN_DURATION_SECS: i64 = 60 * 60;
/// Longest sale room, thirty days
pub const MAX_DURATION_SECS: i64 = 30 * 24 * 60 * 60;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

type ValidationResult<T = ()> = Result<T, ServerError>;

fn invalid(field: &str, rule: &str) -> ServerError {
    ServerError::bad_request(format!("\"{}\" {}", field, rule))
}

/// Identifiers are UUID strings generated on insert.
pub fn validate_id(field: &str, value: &str) -> ValidationResult {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| invalid(field, "must be a valid id"))
}

/// Returns the trimmed name.
pub fn validate_name(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(field, "is not allowed to be empty"));
    }
    if trimmed.chars().count() > max {
        return Err(invalid(
            field,
            &format!("length must be less than or equal to {} characters long", max),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_price(value: f64) -> ValidationResult {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("price", "must be a positive number"));
    }
    Ok(())
}

pub fn validate_description(value: &str) -> ValidationResult<String> {
    validate_name("description", value, MAX_DESCRIPTION_LEN)
}

/// Picture URLs or storage keys; at least one, at most [`MAX_PICTURES`].
pub fn validate_pictures(field: &str, values: &[String]) -> ValidationResult {
    if values.is_empty() {
        return Err(invalid(field, "must contain at least 1 items"));
    }
    if values.len() > MAX_PICTURES {
        return Err(invalid(
            field,
            &format!("must contain less than or equal to {} items", MAX_PICTURES),
        ));
    }
    for (index, picture) in values.iter().enumerate() {
        validate_picture(&format!("{}[{}]", field, index), picture)?;
    }
    Ok(())
}

pub fn validate_picture(field: &str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(invalid(field, "is not allowed to be empty"));
    }
    if value.chars().count() > MAX_PICTURE_LEN {
        return Err(invalid(
            field,
            &format!("length must be less than or equal to {} characters long", MAX_PICTURE_LEN),
        ));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> ValidationResult {
    if value.chars().count() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(value) {
        return Err(invalid("email", "must be a valid email"));
    }
    Ok(())
}

pub fn validate_duration(value: i64) -> ValidationResult {
    if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&value) {
        return Err(invalid(
            "duration",
            &format!(
                "must be between {} and {} seconds",
                MIN_DURATION_SECS, MAX_DURATION_SECS
            ),
        ));
    }
    Ok(())
}

/// Returns the trimmed query.
pub fn validate_search_query(value: &str) -> ValidationResult<String> {
    validate_name("query", value, MAX_QUERY_LEN)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn any_uuid_is_a_valid_id(bytes in any::<[u8; 16]>()) {
            let id = Uuid::from_bytes(bytes).to_string();
            prop_assert!(validate_id("id", &id).is_ok());
        }

        #[test]
        fn non_hex_ids_are_rejected(value in "[g-z]{1,36}") {
            prop_assert!(validate_id("id", &value).is_err());
        }

        #[test]
        fn positive_prices_are_accepted(price in 0.01f64..1_000_000.0) {
            prop_assert!(validate_price(price).is_ok());
        }

        #[test]
        fn non_positive_prices_are_rejected(price in -1_000_000.0f64..=0.0) {
            prop_assert!(validate_price(price).is_err());
        }

        #[test]
        fn validated_names_are_trimmed(name in "[ ]{0,3}[A-Za-z0-9]{1,20}[ ]{0,3}") {
            let validated = validate_name("name", &name, MAX_NAME_LEN).unwrap();
            prop_assert_eq!(validated.as_str(), name.trim());
        }
    }
}
