use async_trait::async_trait;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Database, IndexModel,
};
use std::time::Duration;
use tracing::instrument;

use super::{expect_match, load, parse_object_id, ProductRepository};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{timestamp_now, Product, ProductFilter, SEARCH_FIELDS};
use crate::pagination::PageRequest;
use crate::store::{EntityStore, FieldUpdate, Filter, FindOptions, MemoryStore, MongoStore};

/// ProductRepository over any entity store
pub struct StoreProductRepository<S> {
    store: S,
}

pub type MongoProductRepository = StoreProductRepository<MongoStore<Product>>;
pub type MemoryProductRepository = StoreProductRepository<MemoryStore<Product>>;

impl<S: EntityStore<Product>> StoreProductRepository<S> {
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl StoreProductRepository<MongoStore<Product>> {
    pub fn new(db: &Database) -> Self {
        Self::with_store(MongoStore::new(db))
    }

    pub fn with_timeout(db: &Database, operation_timeout: Duration) -> Self {
        Self::with_store(MongoStore::with_timeout(db, operation_timeout))
    }

    /// Create the indexes product queries rely on
    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "product_id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_product_id_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1, "availability": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category_availability".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "availability": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_availability_created".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "brand_id": 1 })
                .options(IndexOptions::builder().name("idx_brand_id".to_string()).build())
                .build(),
        ];

        self.store
            .collection()
            .create_indexes(indexes)
            .await
            .map_err(|e| CatalogError::from(e).context("products.init_indexes"))?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }
}

impl StoreProductRepository<MemoryStore<Product>> {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for StoreProductRepository<MemoryStore<Product>> {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first() -> FindOptions {
    FindOptions::new().sort_desc("created_at").sort_desc("_id")
}

fn available_only() -> Filter {
    Filter::eq("availability", true)
}

#[async_trait]
impl<S: EntityStore<Product>> ProductRepository for StoreProductRepository<S> {
    #[instrument(skip(self, product), fields(product_id = product.product_id))]
    async fn create(&self, mut product: Product) -> CatalogResult<Product> {
        let now = timestamp_now();
        product.id = None;
        product.created_at = now;
        product.updated_at = now;

        let id = self
            .store
            .insert(&product)
            .await
            .map_err(|e| e.context("products.create"))?;
        product.id = Some(id);

        tracing::info!(id = %id, "Created product");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> CatalogResult<Product> {
        let (_, product) = load(&self.store, id).await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn find_by_product_code(&self, product_id: i64) -> CatalogResult<Product> {
        self.store
            .find_one(&Filter::eq("product_id", product_id))
            .await
            .map_err(|e| e.context(format_args!("products.find_by_product_code({})", product_id)))?
            .ok_or_else(|| CatalogError::not_found("Product", product_id))
    }

    #[instrument(skip(self))]
    async fn find_all(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> CatalogResult<Vec<Product>> {
        let options = newest_first().skip(page.skip()).limit(page.limit());
        self.store
            .find_many(&filter.to_filter(), &options)
            .await
            .map_err(|e| e.context("products.find_all"))
    }

    #[instrument(skip(self))]
    async fn find_available(&self, page: PageRequest) -> CatalogResult<(Vec<Product>, u64)> {
        let filter = available_only();
        let options = newest_first().skip(page.skip()).limit(page.limit());

        let items = self
            .store
            .find_many(&filter, &options)
            .await
            .map_err(|e| e.context("products.find_available"))?;
        let total = self
            .store
            .count(&filter)
            .await
            .map_err(|e| e.context("products.find_available.count"))?;

        Ok((items, total))
    }

    #[instrument(skip(self))]
    async fn find_by_category(&self, category: &str) -> CatalogResult<Vec<Product>> {
        let filter = Filter::and(vec![Filter::eq("category", category), available_only()]);
        self.store
            .find_many(&filter, &FindOptions::new())
            .await
            .map_err(|e| e.context(format_args!("products.find_by_category({})", category)))
    }

    #[instrument(skip(self))]
    async fn search(&self, term: &str) -> CatalogResult<Vec<Product>> {
        let filter = Filter::and(vec![
            available_only(),
            Filter::contains_any(&SEARCH_FIELDS, term),
        ]);
        self.store
            .find_many(&filter, &FindOptions::new())
            .await
            .map_err(|e| e.context("products.search"))
    }

    #[instrument(skip(self, product), fields(product_id = product.product_id))]
    async fn update(&self, id: &str, product: Product) -> CatalogResult<()> {
        let oid = parse_object_id(id)?;
        let dimensions = to_bson(&product.item_dimensions)?;

        // created_at is never part of the update
        let update = FieldUpdate::new()
            .set("product_id", product.product_id)
            .set("product_name", product.product_name)
            .set("description", product.description)
            .set("brand_id", product.brand_id)
            .set("brand_name", product.brand_name)
            .set("seller_id", product.seller_id)
            .set("category", product.category)
            .set("item_dimensions", dimensions)
            .set("price", product.price)
            .set("discount", product.discount)
            .set("availability", product.availability)
            .touch(timestamp_now());

        let matched = self
            .store
            .update_fields(oid, &update)
            .await
            .map_err(|e| e.context(format_args!("products.update({})", id)))?;
        expect_match::<Product>(matched, id)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> CatalogResult<()> {
        let oid = parse_object_id(id)?;
        let update = FieldUpdate::new()
            .set("availability", false)
            .touch(timestamp_now());

        let matched = self
            .store
            .update_fields(oid, &update)
            .await
            .map_err(|e| e.context(format_args!("products.delete({})", id)))?;
        expect_match::<Product>(matched, id)?;

        tracing::info!("Soft-deleted product");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: ProductFilter) -> CatalogResult<u64> {
        self.store
            .count(&filter.to_filter())
            .await
            .map_err(|e| e.context("products.count"))
    }

    #[instrument(skip(self))]
    async fn exists_by_product_code(&self, product_id: i64) -> CatalogResult<bool> {
        let count = self
            .store
            .count(&Filter::eq("product_id", product_id))
            .await
            .map_err(|e| e.context("products.exists_by_product_code"))?;
        Ok(count > 0)
    }
}
