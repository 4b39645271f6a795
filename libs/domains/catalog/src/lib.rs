//! Catalog Domain
//!
//! Products, brands and product reviews stored in MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, request/response DTOs
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, page normalization, brand enrichment, uniqueness
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Catalog queries (traits + store-backed implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Store     │  ← Filter/sort/update primitives over MongoDB or memory
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     handlers, BrandService, MongoBrandRepository, MongoProductRepository, ProductService,
//! };
//! use mongodb::Client;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("catalog");
//!
//! let brands = Arc::new(MongoBrandRepository::new(&db));
//! let products = Arc::new(MongoProductRepository::new(&db));
//! products.init_indexes().await?;
//!
//! let router = axum::Router::new()
//!     .nest(
//!         "/products",
//!         handlers::products::router(ProductService::from_shared(products, brands.clone())),
//!     )
//!     .nest("/brands", handlers::brands::router(BrandService::from_shared(brands)));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod service;
pub mod store;

pub use error::{CatalogError, CatalogResult};
pub use models::{
    AttributeValue, Brand, BrandRequest, BrandResponse, PetInfo, Product, ProductFilter,
    ProductRating, ProductRequest, ProductResponse, Review, ReviewRequest, ReviewResponse,
};
pub use pagination::{PageParams, PageRequest, PaginatedResponse};
pub use repository::{
    BrandRepository, MemoryBrandRepository, MemoryProductRepository, MemoryReviewRepository,
    MongoBrandRepository, MongoProductRepository, MongoReviewRepository, ProductRepository,
    ReviewRepository,
};
pub use service::{BrandService, ProductService, ReviewService};
