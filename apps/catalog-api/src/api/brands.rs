//! Brands API routes

use axum::Router;
use domain_catalog::{BrandService, MongoBrandRepository, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository =
        MongoBrandRepository::with_timeout(&state.db, state.config.mongodb.operation_timeout());

    handlers::brands::router(BrandService::new(repository))
}
