//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the catalog routers
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Pet supply catalog: products, brands and customer reviews on MongoDB",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/products", api = domain_catalog::handlers::products::ApiDoc),
        (path = "/api/brands", api = domain_catalog::handlers::brands::ApiDoc),
        (path = "/api/reviews", api = domain_catalog::handlers::reviews::ApiDoc)
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Brands", description = "Brand endpoints"),
        (name = "Reviews", description = "Product review endpoints")
    )
)]
pub struct ApiDoc;
