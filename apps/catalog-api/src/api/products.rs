//! Products API routes

use axum::Router;
use domain_catalog::{MongoBrandRepository, MongoProductRepository, ProductService, handlers};

use crate::state::AppState;

/// Create the products router; product writes resolve brand names from the brands collection
pub fn router(state: &AppState) -> Router {
    let timeout = state.config.mongodb.operation_timeout();
    let products = MongoProductRepository::with_timeout(&state.db, timeout);
    let brands = MongoBrandRepository::with_timeout(&state.db, timeout);

    handlers::products::router(ProductService::new(products, brands))
}
