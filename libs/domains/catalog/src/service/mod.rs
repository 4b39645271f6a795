//! Catalog services - business rules on top of the repositories

mod brand;
mod product;
mod review;

pub use brand::BrandService;
pub use product::ProductService;
pub use review::ReviewService;

use crate::error::{CatalogError, CatalogResult};

/// Reject blank search terms; returns the trimmed term
pub(crate) fn require_term(term: &str) -> CatalogResult<&str> {
    let term = term.trim();
    if term.is_empty() {
        return Err(CatalogError::InvalidRequest(
            "Search term is required".to_string(),
        ));
    }
    Ok(term)
}
