use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{default_true, timestamp_now, AttributeValue};
use crate::store::{Entity, Filter};

/// Fields a product search term is matched against.
pub const SEARCH_FIELDS: [&str; 4] = ["product_name", "description", "category", "brand_name"];

/// Product entity - represents a product stored in MongoDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier (`_id`), absent until inserted
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Business code assigned by the catalog owner
    pub product_id: i64,
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand_id: i64,
    /// Copy of the brand name taken when the product was last written
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub seller_id: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub item_dimensions: BTreeMap<String, AttributeValue>,
    pub price: f64,
    /// Percentage off the list price
    #[serde(default)]
    pub discount: f64,
    /// `false` once the product has been deleted
    #[serde(default = "default_true")]
    pub availability: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Product {
    const COLLECTION: &'static str = "products";
    const NAME: &'static str = "Product";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

/// DTO for creating or fully replacing a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductRequest {
    #[validate(range(min = 1))]
    pub product_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub brand_id: i64,
    /// Leave empty to have it resolved from `brand_id`
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub seller_id: i64,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub item_dimensions: BTreeMap<String, AttributeValue>,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default = "default_true")]
    pub availability: bool,
}

impl ProductRequest {
    /// Build the persisted shape. Timestamps are always server-assigned.
    pub fn into_entity(self, id: Option<ObjectId>) -> Product {
        let now = timestamp_now();
        Product {
            id,
            product_id: self.product_id,
            product_name: self.product_name,
            description: self.description,
            brand_id: self.brand_id,
            brand_name: self.brand_name,
            seller_id: self.seller_id,
            category: self.category,
            item_dimensions: self.item_dimensions,
            price: self.price,
            discount: self.discount,
            availability: self.availability,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Product as returned over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    /// 24-character hex identifier
    pub id: String,
    pub product_id: i64,
    pub product_name: String,
    pub description: String,
    pub brand_id: i64,
    pub brand_name: String,
    pub seller_id: i64,
    pub category: String,
    #[schema(value_type = Object)]
    pub item_dimensions: BTreeMap<String, AttributeValue>,
    pub price: f64,
    pub discount: f64,
    pub availability: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.map(|id| id.to_hex()).unwrap_or_default(),
            product_id: product.product_id,
            product_name: product.product_name,
            description: product.description,
            brand_id: product.brand_id,
            brand_name: product.brand_name,
            seller_id: product.seller_id,
            category: product.category,
            item_dimensions: product.item_dimensions,
            price: product.price,
            discount: product.discount,
            availability: product.availability,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Optional constraints for listing and counting products
#[derive(Debug, Clone, Default, PartialEq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    /// Exact category tag
    pub category: Option<String>,
    /// Only available (`true`) or only deleted (`false`) products
    pub availability: Option<bool>,
    pub brand_id: Option<i64>,
    pub seller_id: Option<i64>,
    /// Minimum price (inclusive)
    pub min_price: Option<f64>,
    /// Maximum price (inclusive)
    pub max_price: Option<f64>,
    /// Case-insensitive substring over name, description, category and brand name
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn available() -> Self {
        Self {
            availability: Some(true),
            ..Default::default()
        }
    }

    pub fn to_filter(&self) -> Filter {
        let mut clauses = Vec::new();

        if let Some(ref category) = self.category {
            clauses.push(Filter::eq("category", category.as_str()));
        }
        if let Some(availability) = self.availability {
            clauses.push(Filter::eq("availability", availability));
        }
        if let Some(brand_id) = self.brand_id {
            clauses.push(Filter::eq("brand_id", brand_id));
        }
        if let Some(seller_id) = self.seller_id {
            clauses.push(Filter::eq("seller_id", seller_id));
        }
        if let Some(min) = self.min_price {
            clauses.push(Filter::gte("price", min));
        }
        if let Some(max) = self.max_price {
            clauses.push(Filter::lte("price", max));
        }
        if let Some(ref term) = self.search {
            clauses.push(Filter::contains_any(&SEARCH_FIELDS, term));
        }

        Filter::and(clauses)
    }
}
