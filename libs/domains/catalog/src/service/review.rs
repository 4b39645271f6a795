use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::CatalogResult;
use crate::models::{ProductRating, Review, ReviewRequest};
use crate::repository::ReviewRepository;

pub struct ReviewService<R: ReviewRepository> {
    reviews: Arc<R>,
}

impl<R: ReviewRepository> Clone for ReviewService<R> {
    fn clone(&self) -> Self {
        Self {
            reviews: Arc::clone(&self.reviews),
        }
    }
}

impl<R: ReviewRepository> ReviewService<R> {
    pub fn new(reviews: R) -> Self {
        Self {
            reviews: Arc::new(reviews),
        }
    }

    #[instrument(skip(self, request), fields(product_id = request.product_id))]
    pub async fn create_review(&self, request: ReviewRequest) -> CatalogResult<Review> {
        request.validate()?;
        self.reviews.create(request.into_entity()).await
    }

    #[instrument(skip(self))]
    pub async fn get_review(&self, id: &str) -> CatalogResult<Review> {
        self.reviews.find_by_id(id).await
    }

    /// Reviews of a product.
    ///
    /// With `min_rating` the result is ordered by helpful votes, otherwise newest first.
    /// `verified_only` narrows either listing to verified purchases.
    #[instrument(skip(self))]
    pub async fn list_for_product(
        &self,
        product_id: i64,
        min_rating: Option<f64>,
        verified_only: bool,
    ) -> CatalogResult<Vec<Review>> {
        match (min_rating, verified_only) {
            (Some(min), verified_only) => {
                let mut reviews = self.reviews.find_by_min_rating(product_id, min).await?;
                if verified_only {
                    reviews.retain(|r| r.verified_purchase);
                }
                Ok(reviews)
            }
            (None, true) => self.reviews.find_verified(product_id).await,
            (None, false) => self.reviews.find_by_product(product_id).await,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_for_customer(&self, customer_id: i64) -> CatalogResult<Vec<Review>> {
        self.reviews.find_by_customer(customer_id).await
    }

    /// Add a helpful vote and return the review as stored
    #[instrument(skip(self))]
    pub async fn mark_helpful(&self, id: &str) -> CatalogResult<Review> {
        self.reviews.increment_helpful_votes(id).await?;
        self.reviews.find_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_review(&self, id: &str) -> CatalogResult<()> {
        self.reviews.delete(id).await
    }

    #[instrument(skip(self))]
    pub async fn product_rating(&self, product_id: i64) -> CatalogResult<ProductRating> {
        let average_rating = self.reviews.average_rating(product_id).await?;
        let review_count = self.reviews.count_for_product(product_id).await?;
        Ok(ProductRating {
            product_id,
            average_rating,
            review_count,
        })
    }
}
