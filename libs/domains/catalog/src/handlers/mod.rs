//! Axum routers for the catalog.
//!
//! Each submodule exposes a `router(service)` with its state applied and an `ApiDoc`
//! describing its paths relative to its mount point.

pub mod brands;
pub mod products;
pub mod reviews;

use serde::Deserialize;
use utoipa::IntoParams;

/// `?q=` for the search endpoints; a missing or blank term is rejected by the service
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring to look for
    pub q: Option<String>,
}

impl SearchQuery {
    pub fn term(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }
}
