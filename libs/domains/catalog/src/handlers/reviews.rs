//! HTTP handlers for the reviews API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestIdentifierResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
    ValidatedJson,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::error::CatalogResult;
use crate::models::{PetInfo, ProductRating, Review, ReviewRequest, ReviewResponse};
use crate::repository::ReviewRepository;
use crate::service::ReviewService;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_review,
        get_review,
        delete_review,
        mark_helpful,
        list_for_product,
        product_rating,
        list_for_customer,
    ),
    components(
        schemas(ReviewRequest, ReviewResponse, PetInfo, ProductRating),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdentifierResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Reviews", description = "Product review endpoints")
    )
)]
pub struct ApiDoc;

type SharedService<R> = Arc<ReviewService<R>>;

fn to_responses(reviews: Vec<Review>) -> Json<Vec<ReviewResponse>> {
    Json(reviews.into_iter().map(ReviewResponse::from).collect())
}

/// Reviews router; mount it at `/reviews`
pub fn router<R: ReviewRepository + 'static>(service: ReviewService<R>) -> Router {
    Router::new()
        .route("/", post(create_review::<R>))
        .route("/product/{product_id}", get(list_for_product::<R>))
        .route("/product/{product_id}/rating", get(product_rating::<R>))
        .route("/customer/{customer_id}", get(list_for_customer::<R>))
        .route("/{id}", get(get_review::<R>).delete(delete_review::<R>))
        .route("/{id}/helpful", post(mark_helpful::<R>))
        .with_state(Arc::new(service))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewQuery {
    /// Only reviews rated at least this much, most helpful first
    pub min_rating: Option<f64>,
    /// Only verified purchases
    #[serde(default)]
    pub verified_only: bool,
}

/// Create a review
#[utoipa::path(
    post,
    path = "",
    tag = "Reviews",
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_review<R: ReviewRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<ReviewRequest>,
) -> CatalogResult<impl IntoResponse> {
    let review = service.create_review(input).await?;
    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Reviews",
    params(
        ("id" = String, Path, description = "Review id (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Review found", body = ReviewResponse),
        (status = 400, response = BadRequestIdentifierResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_review<R: ReviewRepository>(
    State(service): State<SharedService<R>>,
    Path(id): Path<String>,
) -> CatalogResult<Json<ReviewResponse>> {
    let review = service.get_review(&id).await?;
    Ok(Json(review.into()))
}

/// Remove a review permanently
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Reviews",
    params(
        ("id" = String, Path, description = "Review id (24 hex characters)")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 400, response = BadRequestIdentifierResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_review<R: ReviewRepository>(
    State(service): State<SharedService<R>>,
    Path(id): Path<String>,
) -> CatalogResult<StatusCode> {
    service.delete_review(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add one helpful vote
#[utoipa::path(
    post,
    path = "/{id}/helpful",
    tag = "Reviews",
    params(
        ("id" = String, Path, description = "Review id (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Review with the updated vote count", body = ReviewResponse),
        (status = 400, response = BadRequestIdentifierResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn mark_helpful<R: ReviewRepository>(
    State(service): State<SharedService<R>>,
    Path(id): Path<String>,
) -> CatalogResult<Json<ReviewResponse>> {
    let review = service.mark_helpful(&id).await?;
    Ok(Json(review.into()))
}

/// Reviews of a product
#[utoipa::path(
    get,
    path = "/product/{product_id}",
    tag = "Reviews",
    params(
        ("product_id" = i64, Path, description = "Business product code"),
        ReviewQuery
    ),
    responses(
        (status = 200, description = "Reviews, newest first unless min_rating is set", body = Vec<ReviewResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_for_product<R: ReviewRepository>(
    State(service): State<SharedService<R>>,
    Path(product_id): Path<i64>,
    Query(query): Query<ReviewQuery>,
) -> CatalogResult<Json<Vec<ReviewResponse>>> {
    let reviews = service
        .list_for_product(product_id, query.min_rating, query.verified_only)
        .await?;
    Ok(to_responses(reviews))
}

/// Average rating and review count of a product
#[utoipa::path(
    get,
    path = "/product/{product_id}/rating",
    tag = "Reviews",
    params(
        ("product_id" = i64, Path, description = "Business product code")
    ),
    responses(
        (status = 200, description = "Rating summary", body = ProductRating),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn product_rating<R: ReviewRepository>(
    State(service): State<SharedService<R>>,
    Path(product_id): Path<i64>,
) -> CatalogResult<Json<ProductRating>> {
    Ok(Json(service.product_rating(product_id).await?))
}

#[utoipa::path(
    get,
    path = "/customer/{customer_id}",
    tag = "Reviews",
    params(
        ("customer_id" = i64, Path, description = "Numeric customer code")
    ),
    responses(
        (status = 200, description = "Reviews by the customer, newest first", body = Vec<ReviewResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_for_customer<R: ReviewRepository>(
    State(service): State<SharedService<R>>,
    Path(customer_id): Path<i64>,
) -> CatalogResult<Json<Vec<ReviewResponse>>> {
    Ok(to_responses(service.list_for_customer(customer_id).await?))
}
