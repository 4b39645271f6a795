use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Database, IndexModel};
use std::time::Duration;
use tracing::instrument;

use super::{expect_match, load, parse_object_id, ReviewRepository};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{timestamp_now, Review};
use crate::store::{EntityStore, FieldUpdate, Filter, FindOptions, MemoryStore, MongoStore};

/// ReviewRepository over any entity store
pub struct StoreReviewRepository<S> {
    store: S,
}

pub type MongoReviewRepository = StoreReviewRepository<MongoStore<Review>>;
pub type MemoryReviewRepository = StoreReviewRepository<MemoryStore<Review>>;

impl<S: EntityStore<Review>> StoreReviewRepository<S> {
    pub fn with_store(store: S) -> Self {
        Self { store }
    }
}

impl StoreReviewRepository<MongoStore<Review>> {
    pub fn new(db: &Database) -> Self {
        Self::with_store(MongoStore::new(db))
    }

    pub fn with_timeout(db: &Database, operation_timeout: Duration) -> Self {
        Self::with_store(MongoStore::with_timeout(db, operation_timeout))
    }

    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "product_id": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_product_created".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "customer_id": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_customer_created".to_string())
                        .build(),
                )
                .build(),
        ];

        self.store
            .collection()
            .create_indexes(indexes)
            .await
            .map_err(|e| CatalogError::from(e).context("reviews.init_indexes"))?;
        tracing::info!("Review indexes created successfully");
        Ok(())
    }
}

impl StoreReviewRepository<MemoryStore<Review>> {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for StoreReviewRepository<MemoryStore<Review>> {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first() -> FindOptions {
    FindOptions::new().sort_desc("created_at").sort_desc("_id")
}

fn for_product(product_id: i64) -> Filter {
    Filter::eq("product_id", product_id)
}

#[async_trait]
impl<S: EntityStore<Review>> ReviewRepository for StoreReviewRepository<S> {
    #[instrument(skip(self, review), fields(product_id = review.product_id))]
    async fn create(&self, mut review: Review) -> CatalogResult<Review> {
        let now = timestamp_now();
        review.id = None;
        review.created_at = now;
        review.updated_at = now;

        let id = self
            .store
            .insert(&review)
            .await
            .map_err(|e| e.context("reviews.create"))?;
        review.id = Some(id);

        tracing::info!(id = %id, "Created review");
        Ok(review)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> CatalogResult<Review> {
        let (_, review) = load(&self.store, id).await?;
        Ok(review)
    }

    #[instrument(skip(self))]
    async fn find_by_product(&self, product_id: i64) -> CatalogResult<Vec<Review>> {
        self.store
            .find_many(&for_product(product_id), &newest_first())
            .await
            .map_err(|e| e.context(format_args!("reviews.find_by_product({})", product_id)))
    }

    #[instrument(skip(self))]
    async fn find_by_customer(&self, customer_id: i64) -> CatalogResult<Vec<Review>> {
        self.store
            .find_many(&Filter::eq("customer_id", customer_id), &newest_first())
            .await
            .map_err(|e| e.context("reviews.find_by_customer"))
    }

    #[instrument(skip(self))]
    async fn find_by_min_rating(
        &self,
        product_id: i64,
        min_rating: f64,
    ) -> CatalogResult<Vec<Review>> {
        let filter = Filter::and(vec![
            for_product(product_id),
            Filter::gte("rating", min_rating),
        ]);
        let options = FindOptions::new()
            .sort_desc("helpful_votes")
            .sort_desc("created_at");
        self.store
            .find_many(&filter, &options)
            .await
            .map_err(|e| e.context("reviews.find_by_min_rating"))
    }

    #[instrument(skip(self))]
    async fn find_verified(&self, product_id: i64) -> CatalogResult<Vec<Review>> {
        let filter = Filter::and(vec![
            for_product(product_id),
            Filter::eq("verified_purchase", true),
        ]);
        self.store
            .find_many(&filter, &newest_first())
            .await
            .map_err(|e| e.context("reviews.find_verified"))
    }

    #[instrument(skip(self))]
    async fn increment_helpful_votes(&self, id: &str) -> CatalogResult<()> {
        let oid = parse_object_id(id)?;
        let update = FieldUpdate::new()
            .inc("helpful_votes", 1)
            .touch(timestamp_now());

        let matched = self
            .store
            .update_fields(oid, &update)
            .await
            .map_err(|e| e.context(format_args!("reviews.increment_helpful_votes({})", id)))?;
        expect_match::<Review>(matched, id)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> CatalogResult<()> {
        let oid = parse_object_id(id)?;
        let deleted = self
            .store
            .remove(oid)
            .await
            .map_err(|e| e.context(format_args!("reviews.delete({})", id)))?;
        expect_match::<Review>(deleted, id)?;

        tracing::info!("Deleted review");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn average_rating(&self, product_id: i64) -> CatalogResult<f64> {
        let average = self
            .store
            .average(&for_product(product_id), "rating")
            .await
            .map_err(|e| e.context("reviews.average_rating"))?;
        Ok(average.unwrap_or(0.0))
    }

    #[instrument(skip(self))]
    async fn count_for_product(&self, product_id: i64) -> CatalogResult<u64> {
        self.store
            .count(&for_product(product_id))
            .await
            .map_err(|e| e.context("reviews.count_for_product"))
    }
}
