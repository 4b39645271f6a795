use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{default_true, timestamp_now};
use crate::store::Entity;

/// Brand entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Business code, referenced by `Product::brand_id`
    pub brand_id: i64,
    pub brand_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub established_year: i32,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Brand {
    const COLLECTION: &'static str = "brands";
    const NAME: &'static str = "Brand";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BrandRequest {
    #[validate(range(min = 1))]
    pub brand_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub brand_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub country: String,
    #[validate(range(min = 0, max = 9999))]
    #[serde(default)]
    pub established_year: i32,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl BrandRequest {
    pub fn into_entity(self, id: Option<ObjectId>) -> Brand {
        let now = timestamp_now();
        Brand {
            id,
            brand_id: self.brand_id,
            brand_name: self.brand_name,
            description: self.description,
            logo_url: self.logo_url,
            website: self.website,
            country: self.country,
            established_year: self.established_year,
            categories: dedup_tags(self.categories),
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Drop blank and repeated tags, keeping first-seen order.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !unique.iter().any(|t| t == tag) {
            unique.push(tag.to_string());
        }
    }
    unique
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BrandResponse {
    pub id: String,
    pub brand_id: i64,
    pub brand_name: String,
    pub description: String,
    pub logo_url: String,
    pub website: String,
    pub country: String,
    pub established_year: i32,
    pub categories: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Brand> for BrandResponse {
    fn from(brand: Brand) -> Self {
        Self {
            id: brand.id.map(|id| id.to_hex()).unwrap_or_default(),
            brand_id: brand.brand_id,
            brand_name: brand.brand_name,
            description: brand.description,
            logo_url: brand.logo_url,
            website: brand.website,
            country: brand.country,
            established_year: brand.established_year,
            categories: brand.categories,
            is_active: brand.is_active,
            created_at: brand.created_at,
            updated_at: brand.updated_at,
        }
    }
}
