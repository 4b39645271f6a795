//! Catalog entities and their wire shapes.
//!
//! Entities are what the store persists. Each one has a `*Request` DTO
//! (validated client input) and a `*Response` DTO (hex id, RFC 3339 timestamps).

mod brand;
mod product;
mod review;

pub use brand::{Brand, BrandRequest, BrandResponse};
pub use product::{Product, ProductFilter, ProductRequest, ProductResponse, SEARCH_FIELDS};
pub use review::{PetInfo, ProductRating, Review, ReviewRequest, ReviewResponse};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single value in a schema-less attribute map (item dimensions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Flag(value)
    }
}

/// Current time at the store's precision (milliseconds).
///
/// Entities returned from a write compare equal to the same entity read back.
pub fn timestamp_now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

pub(crate) fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_attribute_values_keep_their_json_type() {
        let json = serde_json::json!({
            "weight": "5kg",
            "count": 300,
            "volume": 1.5,
            "resealable": true
        });

        let map: BTreeMap<String, AttributeValue> = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(map["weight"], AttributeValue::Text("5kg".to_string()));
        assert_eq!(map["count"], AttributeValue::Integer(300));
        assert_eq!(map["volume"], AttributeValue::Float(1.5));
        assert_eq!(map["resealable"], AttributeValue::Flag(true));

        assert_eq!(serde_json::to_value(&map).unwrap(), json);
    }

    #[test]
    fn test_timestamp_now_has_millisecond_precision() {
        let ts = timestamp_now();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
