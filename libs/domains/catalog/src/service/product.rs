//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use super::require_term;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{Product, ProductFilter, ProductRequest};
use crate::pagination::{PageParams, PageRequest, PaginatedResponse};
use crate::repository::{BrandRepository, ProductRepository};

/// Product operations, including brand-name enrichment on writes.
///
/// Page parameters are normalized here and nowhere else.
pub struct ProductService<P: ProductRepository, B: BrandRepository> {
    products: Arc<P>,
    brands: Arc<B>,
}

impl<P: ProductRepository, B: BrandRepository> Clone for ProductService<P, B> {
    fn clone(&self) -> Self {
        Self {
            products: Arc::clone(&self.products),
            brands: Arc::clone(&self.brands),
        }
    }
}

impl<P: ProductRepository, B: BrandRepository> ProductService<P, B> {
    pub fn new(products: P, brands: B) -> Self {
        Self::from_shared(Arc::new(products), Arc::new(brands))
    }

    /// Build from repositories shared with other services
    pub fn from_shared(products: Arc<P>, brands: Arc<B>) -> Self {
        Self { products, brands }
    }

    /// Fill an empty brand name from the brand's business code.
    ///
    /// Lookup failures are logged and ignored; the product is written without a brand name.
    async fn resolve_brand_name(&self, request: &mut ProductRequest) {
        if request.brand_id <= 0 || !request.brand_name.is_empty() {
            return;
        }

        match self.brands.find_by_brand_code(request.brand_id).await {
            Ok(brand) => request.brand_name = brand.brand_name,
            Err(e) => {
                tracing::warn!(
                    brand_id = request.brand_id,
                    error = %e,
                    "Could not resolve brand name, storing product without it"
                );
            }
        }
    }

    /// Create a new product
    #[instrument(skip(self, request), fields(product_id = request.product_id))]
    pub async fn create_product(&self, mut request: ProductRequest) -> CatalogResult<Product> {
        request.validate()?;

        if self
            .products
            .exists_by_product_code(request.product_id)
            .await?
        {
            return Err(CatalogError::Conflict(format!(
                "Product with product_id {} already exists",
                request.product_id
            )));
        }

        self.resolve_brand_name(&mut request).await;
        self.products.create(request.into_entity(None)).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> CatalogResult<Product> {
        self.products.find_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_product_code(&self, product_id: i64) -> CatalogResult<Product> {
        self.products.find_by_product_code(product_id).await
    }

    /// Paginated listing over all products, deleted ones included
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        params: PageParams,
    ) -> CatalogResult<PaginatedResponse<Product>> {
        let page = PageRequest::from(params);
        let items = self.products.find_all(filter.clone(), page).await?;
        let total = self.products.count(filter).await?;
        Ok(PaginatedResponse::new(items, total, page))
    }

    /// Every available product in a category, unpaged
    #[instrument(skip(self))]
    pub async fn list_by_category(&self, category: &str) -> CatalogResult<Vec<Product>> {
        self.products.find_by_category(category).await
    }

    #[instrument(skip(self))]
    pub async fn list_available(
        &self,
        params: PageParams,
    ) -> CatalogResult<PaginatedResponse<Product>> {
        let page = PageRequest::from(params);
        let (items, total) = self.products.find_available(page).await?;
        Ok(PaginatedResponse::new(items, total, page))
    }

    #[instrument(skip(self))]
    pub async fn search_products(&self, term: &str) -> CatalogResult<Vec<Product>> {
        let term = require_term(term)?;
        self.products.search(term).await
    }

    /// Replace a product and return it as stored
    #[instrument(skip(self, request), fields(product_id = request.product_id))]
    pub async fn update_product(
        &self,
        id: &str,
        mut request: ProductRequest,
    ) -> CatalogResult<Product> {
        request.validate()?;

        let existing = self.products.find_by_id(id).await?;
        if existing.product_id != request.product_id
            && self
                .products
                .exists_by_product_code(request.product_id)
                .await?
        {
            return Err(CatalogError::Conflict(format!(
                "Product with product_id {} already exists",
                request.product_id
            )));
        }

        self.resolve_brand_name(&mut request).await;
        self.products
            .update(id, request.into_entity(existing.id))
            .await?;
        self.products.find_by_id(id).await
    }

    /// Soft delete
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> CatalogResult<()> {
        self.products.delete(id).await
    }
}
