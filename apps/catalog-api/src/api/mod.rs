//! API routes module
//!
//! Wires the catalog domain to HTTP routes over the application's MongoDB database.

pub mod brands;
pub mod health;
pub mod products;
pub mod reviews;

use axum::Router;
use domain_catalog::{MongoBrandRepository, MongoProductRepository, MongoReviewRepository};
use tracing::info;

use crate::state::AppState;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/products", products::router(state))
        .nest("/brands", brands::router(state))
        .nest("/reviews", reviews::router(state))
}

/// Create the catalog collection indexes; safe to run on every start
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    MongoProductRepository::new(&state.db)
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create product indexes: {}", e))?;
    MongoBrandRepository::new(&state.db)
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create brand indexes: {}", e))?;
    MongoReviewRepository::new(&state.db)
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create review indexes: {}", e))?;

    info!("Catalog collection indexes created");
    Ok(())
}
