use axum::http::{HeaderValue, Method, header};
use core_config::CorsConfig;
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// CORS layer for the configured origins.
///
/// An empty origin list yields a permissive layer; `CorsConfig::from_env_for` only
/// allows that outside production.
///
/// # Errors
/// Returns `InvalidInput` when an origin is not a valid header value.
pub fn cors_layer(config: &CorsConfig) -> io::Result<CorsLayer> {
    if config.is_permissive() {
        warn!("CORS_ALLOWED_ORIGIN not set, accepting any origin");
        return Ok(create_permissive_cors_layer());
    }

    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {e}"),
            )
        })?;

    info!(origins = ?config.allowed_origins, "CORS configured");
    Ok(create_cors_layer(origins))
}

/// CORS layer with the methods and headers the catalog API accepts
pub fn create_cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Allows any origin, for local development
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}
