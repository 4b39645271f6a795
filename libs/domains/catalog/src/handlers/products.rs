//! HTTP handlers for the products API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestIdentifierResponse, BadRequestResponse, BadRequestValidationResponse,
        ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    },
    ValidatedJson,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use super::SearchQuery;
use crate::error::CatalogResult;
use crate::models::{AttributeValue, ProductFilter, ProductRequest, ProductResponse};
use crate::pagination::{lenient_i64, PageParams, PaginatedResponse};
use crate::repository::{BrandRepository, ProductRepository};
use crate::service::ProductService;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        list_available,
        search_products,
        get_by_product_code,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(ProductRequest, ProductResponse, AttributeValue, PaginatedResponse<ProductResponse>),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdentifierResponse,
            BadRequestResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

type SharedService<P, B> = Arc<ProductService<P, B>>;

/// Products router; mount it at `/products`
pub fn router<P, B>(service: ProductService<P, B>) -> Router
where
    P: ProductRepository + 'static,
    B: BrandRepository + 'static,
{
    Router::new()
        .route("/", get(list_products::<P, B>).post(create_product::<P, B>))
        .route("/available", get(list_available::<P, B>))
        .route("/search", get(search_products::<P, B>))
        .route("/product/{product_id}", get(get_by_product_code::<P, B>))
        .route(
            "/{id}",
            get(get_product::<P, B>)
                .put(update_product::<P, B>)
                .delete(delete_product::<P, B>),
        )
        .with_state(Arc::new(service))
}

/// Listing parameters; `category` switches to the unpaged category view
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// 1-based page, values below 1 mean 1
    #[serde(default, deserialize_with = "lenient_i64")]
    pub page: Option<i64>,
    /// Page size, values below 1 mean 10
    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: Option<i64>,
    /// Return every available product in this category, unpaged
    pub category: Option<String>,
    pub brand_id: Option<i64>,
    pub seller_id: Option<i64>,
    pub availability: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ProductListQuery {
    fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }

    fn filter(&self) -> ProductFilter {
        ProductFilter {
            brand_id: self.brand_id,
            seller_id: self.seller_id,
            availability: self.availability,
            min_price: self.min_price,
            max_price: self.max_price,
            ..Default::default()
        }
    }
}

/// List products
///
/// With `category` the response is a plain array of available products in that category;
/// otherwise a page over all products, deleted ones included.
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Page of products, or an array when filtering by category", body = PaginatedResponse<ProductResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<P: ProductRepository, B: BrandRepository>(
    State(service): State<SharedService<P, B>>,
    Query(query): Query<ProductListQuery>,
) -> CatalogResult<Response> {
    if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
        let products = service.list_by_category(category).await?;
        let body: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
        return Ok(Json(body).into_response());
    }

    let page = service
        .list_products(query.filter(), query.page_params())
        .await?;
    Ok(Json(page.map(ProductResponse::from)).into_response())
}

/// Create a product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<P: ProductRepository, B: BrandRepository>(
    State(service): State<SharedService<P, B>>,
    ValidatedJson(input): ValidatedJson<ProductRequest>,
) -> CatalogResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// Available products, newest first
#[utoipa::path(
    get,
    path = "/available",
    tag = "Products",
    params(PageParams),
    responses(
        (status = 200, description = "Page of available products", body = PaginatedResponse<ProductResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_available<P: ProductRepository, B: BrandRepository>(
    State(service): State<SharedService<P, B>>,
    Query(params): Query<PageParams>,
) -> CatalogResult<Json<PaginatedResponse<ProductResponse>>> {
    let page = service.list_available(params).await?;
    Ok(Json(page.map(ProductResponse::from)))
}

/// Case-insensitive search over name, description, category and brand name
#[utoipa::path(
    get,
    path = "/search",
    tag = "Products",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching available products", body = Vec<ProductResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_products<P: ProductRepository, B: BrandRepository>(
    State(service): State<SharedService<P, B>>,
    Query(query): Query<SearchQuery>,
) -> CatalogResult<Json<Vec<ProductResponse>>> {
    let products = service.search_products(query.term()).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Get a product by its business code
#[utoipa::path(
    get,
    path = "/product/{product_id}",
    tag = "Products",
    params(
        ("product_id" = i64, Path, description = "Business product code")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_by_product_code<P: ProductRepository, B: BrandRepository>(
    State(service): State<SharedService<P, B>>,
    Path(product_id): Path<i64>,
) -> CatalogResult<Json<ProductResponse>> {
    let product = service.get_by_product_code(product_id).await?;
    Ok(Json(product.into()))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product id (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, response = BadRequestIdentifierResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<P: ProductRepository, B: BrandRepository>(
    State(service): State<SharedService<P, B>>,
    Path(id): Path<String>,
) -> CatalogResult<Json<ProductResponse>> {
    let product = service.get_product(&id).await?;
    Ok(Json(product.into()))
}

/// Replace a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product id (24 hex characters)")
    ),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product as stored after the update", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<P: ProductRepository, B: BrandRepository>(
    State(service): State<SharedService<P, B>>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<ProductRequest>,
) -> CatalogResult<Json<ProductResponse>> {
    let product = service.update_product(&id, input).await?;
    Ok(Json(product.into()))
}

/// Mark a product unavailable
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product id (24 hex characters)")
    ),
    responses(
        (status = 204, description = "Product marked unavailable"),
        (status = 400, response = BadRequestIdentifierResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<P: ProductRepository, B: BrandRepository>(
    State(service): State<SharedService<P, B>>,
    Path(id): Path<String>,
) -> CatalogResult<StatusCode> {
    service.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
