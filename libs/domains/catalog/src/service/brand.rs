use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use super::require_term;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{Brand, BrandRequest};
use crate::pagination::{PageParams, PageRequest, PaginatedResponse};
use crate::repository::BrandRepository;

pub struct BrandService<B: BrandRepository> {
    brands: Arc<B>,
}

impl<B: BrandRepository> Clone for BrandService<B> {
    fn clone(&self) -> Self {
        Self {
            brands: Arc::clone(&self.brands),
        }
    }
}

fn duplicate_code(brand_id: i64) -> CatalogError {
    CatalogError::Conflict(format!("Brand with brand_id {} already exists", brand_id))
}

impl<B: BrandRepository> BrandService<B> {
    pub fn new(brands: B) -> Self {
        Self::from_shared(Arc::new(brands))
    }

    pub fn from_shared(brands: Arc<B>) -> Self {
        Self { brands }
    }

    #[instrument(skip(self, request), fields(brand_id = request.brand_id))]
    pub async fn create_brand(&self, request: BrandRequest) -> CatalogResult<Brand> {
        request.validate()?;

        if self.brands.exists_by_brand_code(request.brand_id).await? {
            return Err(duplicate_code(request.brand_id));
        }

        self.brands.create(request.into_entity(None)).await
    }

    #[instrument(skip(self))]
    pub async fn get_brand(&self, id: &str) -> CatalogResult<Brand> {
        self.brands.find_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_brand_code(&self, brand_id: i64) -> CatalogResult<Brand> {
        self.brands.find_by_brand_code(brand_id).await
    }

    #[instrument(skip(self))]
    pub async fn list_brands(&self, params: PageParams) -> CatalogResult<PaginatedResponse<Brand>> {
        let page = PageRequest::from(params);
        let items = self.brands.find_all(page).await?;
        let total = self.brands.count().await?;
        Ok(PaginatedResponse::new(items, total, page))
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self) -> CatalogResult<Vec<Brand>> {
        self.brands.find_active().await
    }

    #[instrument(skip(self))]
    pub async fn list_by_category(&self, category: &str) -> CatalogResult<Vec<Brand>> {
        self.brands.find_by_category(category).await
    }

    #[instrument(skip(self))]
    pub async fn search_brands(&self, term: &str) -> CatalogResult<Vec<Brand>> {
        let term = require_term(term)?;
        self.brands.search(term).await
    }

    #[instrument(skip(self, request), fields(brand_id = request.brand_id))]
    pub async fn update_brand(&self, id: &str, request: BrandRequest) -> CatalogResult<Brand> {
        request.validate()?;

        let existing = self.brands.find_by_id(id).await?;
        if existing.brand_id != request.brand_id
            && self.brands.exists_by_brand_code(request.brand_id).await?
        {
            return Err(duplicate_code(request.brand_id));
        }

        self.brands.update(id, request.into_entity(existing.id)).await?;
        self.brands.find_by_id(id).await
    }

    /// Soft delete
    #[instrument(skip(self))]
    pub async fn deactivate_brand(&self, id: &str) -> CatalogResult<()> {
        self.brands.deactivate(id).await
    }
}
