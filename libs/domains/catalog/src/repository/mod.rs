//! Repository traits for catalog persistence.
//!
//! Each trait has one implementation generic over an [`EntityStore`], so the
//! same query logic runs against MongoDB and the in-memory store.

mod brand;
mod product;
mod review;

pub use brand::{MemoryBrandRepository, MongoBrandRepository, StoreBrandRepository};
pub use product::{MemoryProductRepository, MongoProductRepository, StoreProductRepository};
pub use review::{MemoryReviewRepository, MongoReviewRepository, StoreReviewRepository};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Brand, Product, ProductFilter, Review};
use crate::pagination::PageRequest;
use crate::store::{Entity, EntityStore, Filter};

/// Data access for products
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product with fresh timestamps and return it with its id
    async fn create(&self, product: Product) -> CatalogResult<Product>;

    async fn find_by_id(&self, id: &str) -> CatalogResult<Product>;

    /// Lookup by business code
    async fn find_by_product_code(&self, product_id: i64) -> CatalogResult<Product>;

    /// One page of products matching `filter`, newest first
    async fn find_all(&self, filter: ProductFilter, page: PageRequest)
        -> CatalogResult<Vec<Product>>;

    /// One page of available products and the total number of available products
    async fn find_available(&self, page: PageRequest) -> CatalogResult<(Vec<Product>, u64)>;

    /// Every available product in `category`
    async fn find_by_category(&self, category: &str) -> CatalogResult<Vec<Product>>;

    /// Available products with `term` in any search field
    async fn search(&self, term: &str) -> CatalogResult<Vec<Product>>;

    /// Replace the mutable fields of the product with `id`
    async fn update(&self, id: &str, product: Product) -> CatalogResult<()>;

    /// Soft delete: the product stays stored with `availability = false`
    async fn delete(&self, id: &str) -> CatalogResult<()>;

    async fn count(&self, filter: ProductFilter) -> CatalogResult<u64>;

    async fn exists_by_product_code(&self, product_id: i64) -> CatalogResult<bool>;
}

/// Data access for brands
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrandRepository: Send + Sync {
    async fn create(&self, brand: Brand) -> CatalogResult<Brand>;

    async fn find_by_id(&self, id: &str) -> CatalogResult<Brand>;

    /// Lookup by business code, used to enrich products
    async fn find_by_brand_code(&self, brand_id: i64) -> CatalogResult<Brand>;

    async fn find_all(&self, page: PageRequest) -> CatalogResult<Vec<Brand>>;

    /// Active brands ordered by name
    async fn find_active(&self) -> CatalogResult<Vec<Brand>>;

    /// Active brands tagged with `category`
    async fn find_by_category(&self, category: &str) -> CatalogResult<Vec<Brand>>;

    /// Active brands with `term` in their name or description
    async fn search(&self, term: &str) -> CatalogResult<Vec<Brand>>;

    async fn update(&self, id: &str, brand: Brand) -> CatalogResult<()>;

    /// Soft delete: `is_active = false`
    async fn deactivate(&self, id: &str) -> CatalogResult<()>;

    async fn count(&self) -> CatalogResult<u64>;

    async fn exists_by_brand_code(&self, brand_id: i64) -> CatalogResult<bool>;
}

/// Data access for reviews
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, review: Review) -> CatalogResult<Review>;

    async fn find_by_id(&self, id: &str) -> CatalogResult<Review>;

    /// Reviews of a product, newest first
    async fn find_by_product(&self, product_id: i64) -> CatalogResult<Vec<Review>>;

    /// Reviews written by a customer, newest first
    async fn find_by_customer(&self, customer_id: i64) -> CatalogResult<Vec<Review>>;

    /// Reviews rated at least `min_rating`, most helpful first
    async fn find_by_min_rating(&self, product_id: i64, min_rating: f64)
        -> CatalogResult<Vec<Review>>;

    /// Verified-purchase reviews, newest first
    async fn find_verified(&self, product_id: i64) -> CatalogResult<Vec<Review>>;

    /// Atomically add one helpful vote
    async fn increment_helpful_votes(&self, id: &str) -> CatalogResult<()>;

    /// Physically remove the review
    async fn delete(&self, id: &str) -> CatalogResult<()>;

    /// Mean rating, `0.0` for a product without reviews
    async fn average_rating(&self, product_id: i64) -> CatalogResult<f64>;

    async fn count_for_product(&self, product_id: i64) -> CatalogResult<u64>;
}

/// Parse a 24-hex-character ObjectId
pub fn parse_object_id(id: &str) -> CatalogResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| CatalogError::InvalidIdentifier(id.to_string()))
}

/// Load an entity by its hex id
pub(crate) async fn load<T, S>(store: &S, id: &str) -> CatalogResult<(ObjectId, T)>
where
    T: Entity,
    S: EntityStore<T> + ?Sized,
{
    let oid = parse_object_id(id)?;
    let entity = store
        .find_one(&Filter::eq("_id", oid))
        .await
        .map_err(|e| e.context(format_args!("{}.find_by_id({})", T::COLLECTION, id)))?
        .ok_or_else(|| CatalogError::not_found(T::NAME, id))?;
    Ok((oid, entity))
}

/// Map a zero matched/deleted count to `NotFound`
pub(crate) fn expect_match<T: Entity>(affected: u64, id: &str) -> CatalogResult<()> {
    if affected == 0 {
        return Err(CatalogError::not_found(T::NAME, id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id() {
        let oid = ObjectId::new();
        assert_eq!(parse_object_id(&oid.to_hex()).unwrap(), oid);

        for bad in ["", "123", "not-an-object-id", "zzzzzzzzzzzzzzzzzzzzzzzz"] {
            match parse_object_id(bad) {
                Err(CatalogError::InvalidIdentifier(id)) => assert_eq!(id, bad),
                other => panic!("expected InvalidIdentifier, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_expect_match() {
        assert!(expect_match::<Product>(1, "x").is_ok());
        assert!(expect_match::<Product>(0, "x").unwrap_err().is_not_found());
    }
}
