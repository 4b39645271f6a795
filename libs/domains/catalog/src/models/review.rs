use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::Validate;

use super::timestamp_now;
use crate::store::Entity;

/// Pet profile attached to a review
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct PetInfo {
    #[serde(default)]
    pub pet_type: String,
    #[serde(default)]
    pub pet_breed: String,
    /// Age in years
    #[validate(range(min = 0, max = 100))]
    #[serde(default)]
    pub pet_age: i32,
    #[serde(default)]
    pub pet_size: String,
}

/// Customer review entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Business code of the reviewed product
    pub product_id: i64,
    /// Numeric customer code
    pub customer_id: i64,
    #[serde(default)]
    pub customer_name: String,
    pub rating: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub verified_purchase: bool,
    /// Only ever incremented
    #[serde(default)]
    pub helpful_votes: i64,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    #[serde(default)]
    pub pet_info: PetInfo,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Review {
    const COLLECTION: &'static str = "reviews";
    const NAME: &'static str = "Review";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReviewRequest {
    #[validate(range(min = 1))]
    pub product_id: i64,
    #[validate(range(min = 1))]
    pub customer_id: i64,
    #[serde(default)]
    pub customer_name: String,
    /// 1 to 5 stars
    #[validate(range(min = 1.0, max = 5.0))]
    pub rating: f64,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub title: String,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub verified_purchase: bool,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    #[validate(nested)]
    #[serde(default)]
    pub pet_info: PetInfo,
}

impl ReviewRequest {
    pub fn into_entity(self) -> Review {
        let now = timestamp_now();
        Review {
            id: None,
            product_id: self.product_id,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            rating: self.rating,
            title: self.title,
            comment: self.comment,
            images: self.images,
            verified_purchase: self.verified_purchase,
            helpful_votes: 0,
            filters: self.filters,
            pet_info: self.pet_info,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    pub id: String,
    pub product_id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub rating: f64,
    pub title: String,
    pub comment: String,
    pub images: Vec<String>,
    pub verified_purchase: bool,
    pub helpful_votes: i64,
    pub filters: BTreeMap<String, String>,
    pub pet_info: PetInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.map(|id| id.to_hex()).unwrap_or_default(),
            product_id: review.product_id,
            customer_id: review.customer_id,
            customer_name: review.customer_name,
            rating: review.rating,
            title: review.title,
            comment: review.comment,
            images: review.images,
            verified_purchase: review.verified_purchase,
            helpful_votes: review.helpful_votes,
            filters: review.filters,
            pet_info: review.pet_info,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

/// Aggregate rating for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductRating {
    pub product_id: i64,
    /// Mean rating, `0.0` when there are no reviews
    pub average_rating: f64,
    pub review_count: u64,
}
