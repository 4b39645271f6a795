use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Database, IndexModel};
use std::time::Duration;
use tracing::instrument;

use super::{expect_match, load, parse_object_id, BrandRepository};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{timestamp_now, Brand};
use crate::pagination::PageRequest;
use crate::store::{EntityStore, FieldUpdate, Filter, FindOptions, MemoryStore, MongoStore};

/// BrandRepository over any entity store
pub struct StoreBrandRepository<S> {
    store: S,
}

pub type MongoBrandRepository = StoreBrandRepository<MongoStore<Brand>>;
pub type MemoryBrandRepository = StoreBrandRepository<MemoryStore<Brand>>;

impl<S: EntityStore<Brand>> StoreBrandRepository<S> {
    pub fn with_store(store: S) -> Self {
        Self { store }
    }
}

impl StoreBrandRepository<MongoStore<Brand>> {
    pub fn new(db: &Database) -> Self {
        Self::with_store(MongoStore::new(db))
    }

    pub fn with_timeout(db: &Database, operation_timeout: Duration) -> Self {
        Self::with_store(MongoStore::with_timeout(db, operation_timeout))
    }

    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "brand_id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_brand_id_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "is_active": 1, "brand_name": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_active_name".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "categories": 1 })
                .options(IndexOptions::builder().name("idx_categories".to_string()).build())
                .build(),
        ];

        self.store
            .collection()
            .create_indexes(indexes)
            .await
            .map_err(|e| CatalogError::from(e).context("brands.init_indexes"))?;
        tracing::info!("Brand indexes created successfully");
        Ok(())
    }
}

impl StoreBrandRepository<MemoryStore<Brand>> {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for StoreBrandRepository<MemoryStore<Brand>> {
    fn default() -> Self {
        Self::new()
    }
}

fn active_only() -> Filter {
    Filter::eq("is_active", true)
}

#[async_trait]
impl<S: EntityStore<Brand>> BrandRepository for StoreBrandRepository<S> {
    #[instrument(skip(self, brand), fields(brand_id = brand.brand_id))]
    async fn create(&self, mut brand: Brand) -> CatalogResult<Brand> {
        let now = timestamp_now();
        brand.id = None;
        brand.created_at = now;
        brand.updated_at = now;

        let id = self
            .store
            .insert(&brand)
            .await
            .map_err(|e| e.context("brands.create"))?;
        brand.id = Some(id);

        tracing::info!(id = %id, "Created brand");
        Ok(brand)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> CatalogResult<Brand> {
        let (_, brand) = load(&self.store, id).await?;
        Ok(brand)
    }

    #[instrument(skip(self))]
    async fn find_by_brand_code(&self, brand_id: i64) -> CatalogResult<Brand> {
        self.store
            .find_one(&Filter::eq("brand_id", brand_id))
            .await
            .map_err(|e| e.context(format_args!("brands.find_by_brand_code({})", brand_id)))?
            .ok_or_else(|| CatalogError::not_found("Brand", brand_id))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, page: PageRequest) -> CatalogResult<Vec<Brand>> {
        let options = FindOptions::new()
            .sort_desc("created_at")
            .sort_desc("_id")
            .skip(page.skip())
            .limit(page.limit());
        self.store
            .find_many(&Filter::All, &options)
            .await
            .map_err(|e| e.context("brands.find_all"))
    }

    #[instrument(skip(self))]
    async fn find_active(&self) -> CatalogResult<Vec<Brand>> {
        self.store
            .find_many(&active_only(), &FindOptions::new().sort_asc("brand_name"))
            .await
            .map_err(|e| e.context("brands.find_active"))
    }

    #[instrument(skip(self))]
    async fn find_by_category(&self, category: &str) -> CatalogResult<Vec<Brand>> {
        let filter = Filter::and(vec![active_only(), Filter::is_in("categories", [category])]);
        self.store
            .find_many(&filter, &FindOptions::new().sort_asc("brand_name"))
            .await
            .map_err(|e| e.context(format_args!("brands.find_by_category({})", category)))
    }

    #[instrument(skip(self))]
    async fn search(&self, term: &str) -> CatalogResult<Vec<Brand>> {
        let filter = Filter::and(vec![
            active_only(),
            Filter::contains_any(&["brand_name", "description"], term),
        ]);
        self.store
            .find_many(&filter, &FindOptions::new())
            .await
            .map_err(|e| e.context("brands.search"))
    }

    #[instrument(skip(self, brand), fields(brand_id = brand.brand_id))]
    async fn update(&self, id: &str, brand: Brand) -> CatalogResult<()> {
        let oid = parse_object_id(id)?;
        let update = FieldUpdate::new()
            .set("brand_id", brand.brand_id)
            .set("brand_name", brand.brand_name)
            .set("description", brand.description)
            .set("logo_url", brand.logo_url)
            .set("website", brand.website)
            .set("country", brand.country)
            .set("established_year", brand.established_year)
            .set("categories", brand.categories)
            .set("is_active", brand.is_active)
            .touch(timestamp_now());

        let matched = self
            .store
            .update_fields(oid, &update)
            .await
            .map_err(|e| e.context(format_args!("brands.update({})", id)))?;
        expect_match::<Brand>(matched, id)
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, id: &str) -> CatalogResult<()> {
        let oid = parse_object_id(id)?;
        let update = FieldUpdate::new()
            .set("is_active", false)
            .touch(timestamp_now());

        let matched = self
            .store
            .update_fields(oid, &update)
            .await
            .map_err(|e| e.context(format_args!("brands.deactivate({})", id)))?;
        expect_match::<Brand>(matched, id)?;

        tracing::info!("Deactivated brand");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> CatalogResult<u64> {
        self.store
            .count(&Filter::All)
            .await
            .map_err(|e| e.context("brands.count"))
    }

    #[instrument(skip(self))]
    async fn exists_by_brand_code(&self, brand_id: i64) -> CatalogResult<bool> {
        let count = self
            .store
            .count(&Filter::eq("brand_id", brand_id))
            .await
            .map_err(|e| e.context("brands.exists_by_brand_code"))?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BrandRequest;

    fn brand(code: i64, name: &str, categories: &[&str]) -> Brand {
        serde_json::from_value::<BrandRequest>(serde_json::json!({
            "brand_id": code,
            "brand_name": name,
            "description": format!("{} pet supplies", name),
            "categories": categories,
        }))
        .unwrap()
        .into_entity(None)
    }

    #[tokio::test]
    async fn test_active_brands_sorted_by_name() {
        let repo = MemoryBrandRepository::new();
        repo.create(brand(1, "Zoomies", &["dog"])).await.unwrap();
        repo.create(brand(2, "AquaLife", &["fish"])).await.unwrap();
        let hidden = repo.create(brand(3, "Meow", &["cat"])).await.unwrap();
        repo.deactivate(&hidden.id.unwrap().to_hex()).await.unwrap();

        let names: Vec<String> = repo
            .find_active()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.brand_name)
            .collect();
        assert_eq!(names, vec!["AquaLife", "Zoomies"]);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_find_by_category_matches_array_membership() {
        let repo = MemoryBrandRepository::new();
        repo.create(brand(1, "PetCo", &["dog", "cat"])).await.unwrap();
        repo.create(brand(2, "AquaLife", &["fish"])).await.unwrap();

        let cat_brands = repo.find_by_category("cat").await.unwrap();
        assert_eq!(cat_brands.len(), 1);
        assert_eq!(cat_brands[0].brand_id, 1);
        assert!(repo.find_by_category("bird").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_and_lookup_by_code() {
        let repo = MemoryBrandRepository::new();
        repo.create(brand(7, "AquaLife", &["fish"])).await.unwrap();

        assert_eq!(repo.search("AQUA").await.unwrap().len(), 1);
        assert_eq!(repo.search("supplies").await.unwrap().len(), 1);
        assert_eq!(repo.find_by_brand_code(7).await.unwrap().brand_name, "AquaLife");
        assert!(repo.find_by_brand_code(8).await.unwrap_err().is_not_found());
        assert!(repo.exists_by_brand_code(7).await.unwrap());
    }
}
