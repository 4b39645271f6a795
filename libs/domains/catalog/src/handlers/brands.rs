//! HTTP handlers for the brands API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
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
use std::sync::Arc;
use utoipa::OpenApi;

use super::SearchQuery;
use crate::error::CatalogResult;
use crate::models::{Brand, BrandRequest, BrandResponse};
use crate::pagination::{PageParams, PaginatedResponse};
use crate::repository::BrandRepository;
use crate::service::BrandService;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_brands,
        create_brand,
        list_active,
        search_brands,
        list_by_category,
        get_by_brand_code,
        get_brand,
        update_brand,
        deactivate_brand,
    ),
    components(
        schemas(BrandRequest, BrandResponse, PaginatedResponse<BrandResponse>),
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
        (name = "Brands", description = "Brand endpoints")
    )
)]
pub struct ApiDoc;

type SharedService<B> = Arc<BrandService<B>>;

fn to_responses(brands: Vec<Brand>) -> Json<Vec<BrandResponse>> {
    Json(brands.into_iter().map(BrandResponse::from).collect())
}

/// Brands router; mount it at `/brands`
pub fn router<B: BrandRepository + 'static>(service: BrandService<B>) -> Router {
    Router::new()
        .route("/", get(list_brands::<B>).post(create_brand::<B>))
        .route("/active", get(list_active::<B>))
        .route("/search", get(search_brands::<B>))
        .route("/category/{category}", get(list_by_category::<B>))
        .route("/brand/{brand_id}", get(get_by_brand_code::<B>))
        .route(
            "/{id}",
            get(get_brand::<B>)
                .put(update_brand::<B>)
                .delete(deactivate_brand::<B>),
        )
        .with_state(Arc::new(service))
}

/// List all brands, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Brands",
    params(PageParams),
    responses(
        (status = 200, description = "Page of brands", body = PaginatedResponse<BrandResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_brands<B: BrandRepository>(
    State(service): State<SharedService<B>>,
    Query(params): Query<PageParams>,
) -> CatalogResult<Json<PaginatedResponse<BrandResponse>>> {
    let page = service.list_brands(params).await?;
    Ok(Json(page.map(BrandResponse::from)))
}

/// Create a brand
#[utoipa::path(
    post,
    path = "",
    tag = "Brands",
    request_body = BrandRequest,
    responses(
        (status = 201, description = "Brand created", body = BrandResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_brand<B: BrandRepository>(
    State(service): State<SharedService<B>>,
    ValidatedJson(input): ValidatedJson<BrandRequest>,
) -> CatalogResult<impl IntoResponse> {
    let brand = service.create_brand(input).await?;
    Ok((StatusCode::CREATED, Json(BrandResponse::from(brand))))
}

/// Active brands by name
#[utoipa::path(
    get,
    path = "/active",
    tag = "Brands",
    responses(
        (status = 200, description = "Active brands", body = Vec<BrandResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_active<B: BrandRepository>(
    State(service): State<SharedService<B>>,
) -> CatalogResult<Json<Vec<BrandResponse>>> {
    Ok(to_responses(service.list_active().await?))
}

/// Case-insensitive search over brand name and description
#[utoipa::path(
    get,
    path = "/search",
    tag = "Brands",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching active brands", body = Vec<BrandResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_brands<B: BrandRepository>(
    State(service): State<SharedService<B>>,
    Query(query): Query<SearchQuery>,
) -> CatalogResult<Json<Vec<BrandResponse>>> {
    Ok(to_responses(service.search_brands(query.term()).await?))
}

/// Active brands carrying a category tag
#[utoipa::path(
    get,
    path = "/category/{category}",
    tag = "Brands",
    params(
        ("category" = String, Path, description = "Category tag")
    ),
    responses(
        (status = 200, description = "Brands in the category", body = Vec<BrandResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_by_category<B: BrandRepository>(
    State(service): State<SharedService<B>>,
    Path(category): Path<String>,
) -> CatalogResult<Json<Vec<BrandResponse>>> {
    Ok(to_responses(service.list_by_category(&category).await?))
}

/// Get a brand by its business code
#[utoipa::path(
    get,
    path = "/brand/{brand_id}",
    tag = "Brands",
    params(
        ("brand_id" = i64, Path, description = "Business brand code")
    ),
    responses(
        (status = 200, description = "Brand found", body = BrandResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_by_brand_code<B: BrandRepository>(
    State(service): State<SharedService<B>>,
    Path(brand_id): Path<i64>,
) -> CatalogResult<Json<BrandResponse>> {
    let brand = service.get_by_brand_code(brand_id).await?;
    Ok(Json(brand.into()))
}

/// Get a brand by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Brands",
    params(
        ("id" = String, Path, description = "Brand id (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Brand found", body = BrandResponse),
        (status = 400, response = BadRequestIdentifierResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_brand<B: BrandRepository>(
    State(service): State<SharedService<B>>,
    Path(id): Path<String>,
) -> CatalogResult<Json<BrandResponse>> {
    let brand = service.get_brand(&id).await?;
    Ok(Json(brand.into()))
}

/// Replace a brand
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Brands",
    params(
        ("id" = String, Path, description = "Brand id (24 hex characters)")
    ),
    request_body = BrandRequest,
    responses(
        (status = 200, description = "Brand as stored after the update", body = BrandResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_brand<B: BrandRepository>(
    State(service): State<SharedService<B>>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<BrandRequest>,
) -> CatalogResult<Json<BrandResponse>> {
    let brand = service.update_brand(&id, input).await?;
    Ok(Json(brand.into()))
}

/// Deactivate a brand
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Brands",
    params(
        ("id" = String, Path, description = "Brand id (24 hex characters)")
    ),
    responses(
        (status = 204, description = "Brand deactivated"),
        (status = 400, response = BadRequestIdentifierResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn deactivate_brand<B: BrandRepository>(
    State(service): State<SharedService<B>>,
    Path(id): Path<String>,
) -> CatalogResult<StatusCode> {
    service.deactivate_brand(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
