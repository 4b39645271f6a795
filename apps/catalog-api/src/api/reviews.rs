//! Reviews API routes

use axum::Router;
use domain_catalog::{MongoReviewRepository, ReviewService, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository =
        MongoReviewRepository::with_timeout(&state.db, state.config.mongodb.operation_timeout());

    handlers::reviews::router(ReviewService::new(repository))
}
