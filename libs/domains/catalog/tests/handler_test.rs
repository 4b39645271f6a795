//! Handler tests for the catalog domain
//!
//! The routers run over memory-backed repositories, so these cover request parsing,
//! status codes and response shapes without a database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use domain_catalog::*;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use test_utils::TestDataBuilder;
use tower::ServiceExt; // For oneshot()

fn app() -> Router {
    let brands = Arc::new(MemoryBrandRepository::new());
    let products = Arc::new(MemoryProductRepository::new());

    Router::new()
        .nest(
            "/products",
            handlers::products::router(ProductService::from_shared(products, brands.clone())),
        )
        .nest(
            "/brands",
            handlers::brands::router(BrandService::from_shared(brands)),
        )
        .nest(
            "/reviews",
            handlers::reviews::router(ReviewService::new(MemoryReviewRepository::new())),
        )
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn product(product_id: i64, name: &str, category: &str) -> Value {
    json!({
        "product_id": product_id,
        "product_name": name,
        "description": "Test product",
        "category": category,
        "item_dimensions": { "weight": "5kg", "count": 300 },
        "price": 12.5,
        "discount": 0.0
    })
}

#[tokio::test]
async fn test_create_product_returns_201_with_assigned_fields() {
    let app = app();
    let builder = TestDataBuilder::from_test_name("create_product_201");
    let code = builder.product_code(1);

    let (status, body) = send(
        &app,
        "POST",
        "/products",
        Some(product(code, "Premium Dog Food", "dog-food")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product_id"], code);
    assert_eq!(body["id"].as_str().unwrap().len(), 24);
    assert_eq!(body["availability"], true);
    assert_eq!(body["item_dimensions"]["count"], 300);
    assert_eq!(body["created_at"], body["updated_at"]);
}

#[tokio::test]
async fn test_create_product_validates_input() {
    let app = app();

    let (status, body) = send(&app, "POST", "/products", Some(product(1, "", "dog-food"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["product_name"].is_array());
}

#[tokio::test]
async fn test_duplicate_product_code_is_409() {
    let app = app();

    let (first, _) = send(&app, "POST", "/products", Some(product(7, "Cat Food", "cat-food"))).await;
    let (second, body) =
        send(&app, "POST", "/products", Some(product(7, "Other", "cat-food"))).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_get_product_is_idempotent() {
    let app = app();
    let (_, created) = send(&app, "POST", "/products", Some(product(11, "Bird Seed", "bird"))).await;
    let uri = format!("/products/{}", created["id"].as_str().unwrap());

    let (status, first) = send(&app, "GET", &uri, None).await;
    let (_, second) = send(&app, "GET", &uri, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(first, created);
}

#[tokio::test]
async fn test_malformed_and_absent_ids_are_distinguished() {
    let app = app();

    let (malformed, body) = send(&app, "GET", "/products/not-an-id", None).await;
    assert_eq!(malformed, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_IDENTIFIER");

    let (absent, body) = send(&app, "GET", "/products/650c1f1e8b3a4d2f9c0e1a2b", None).await;
    assert_eq!(absent, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_by_product_code() {
    let app = app();
    send(&app, "POST", "/products", Some(product(42, "Hamster Wheel", "small-pets"))).await;

    let (status, body) = send(&app, "GET", "/products/product/42", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product_name"], "Hamster Wheel");

    let (status, _) = send(&app, "GET", "/products/product/43", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_soft_delete_hides_from_available_views_only() {
    let app = app();
    let (_, created) =
        send(&app, "POST", "/products", Some(product(21, "Aquarium Filter", "fish-supplies"))).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app, "DELETE", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, fetched) = send(&app, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["availability"], false);

    let (_, available) = send(&app, "GET", "/products/available", None).await;
    assert_eq!(available["total"], 0);

    let (_, by_category) = send(&app, "GET", "/products?category=fish-supplies", None).await;
    assert_eq!(by_category, json!([]));

    let (_, search) = send(&app, "GET", "/products/search?q=aquarium", None).await;
    assert_eq!(search, json!([]));

    let (_, all) = send(&app, "GET", "/products", None).await;
    assert_eq!(all["total"], 1);
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let app = app();
    send(
        &app,
        "POST",
        "/products",
        Some(product(31, "Tropical Fish Food Flakes", "fish-food")),
    )
    .await;

    let (status, hits) = send(&app, "GET", "/products/search?q=FISH", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["product_id"], 31);

    let (status, misses) = send(&app, "GET", "/products/search?q=zebra", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(misses, json!([]));
}

#[tokio::test]
async fn test_search_requires_a_term() {
    let app = app();

    for uri in ["/products/search", "/products/search?q=", "/products/search?q=%20%20"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "Search term is required");
    }
}

#[tokio::test]
async fn test_invalid_paging_falls_back_to_defaults() {
    let app = app();
    for code in 1..=12 {
        send(&app, "POST", "/products", Some(product(code, "Chew Toy", "dog-toys"))).await;
    }

    let (_, defaults) = send(&app, "GET", "/products", None).await;
    let (_, clamped) = send(&app, "GET", "/products?page=-1&limit=0", None).await;

    assert_eq!(defaults, clamped);
    assert_eq!(clamped["page"], 1);
    assert_eq!(clamped["limit"], 10);
    assert_eq!(clamped["total"], 12);
    assert_eq!(clamped["total_pages"], 2);
    assert_eq!(clamped["items"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_blank_or_non_numeric_paging_uses_defaults() {
    let app = app();
    for code in 1..=3 {
        send(&app, "POST", "/products", Some(product(code, "Chew Toy", "dog-toys"))).await;
    }

    let (_, defaults) = send(&app, "GET", "/products", None).await;
    for uri in ["/products?page=&limit=", "/products?page=abc", "/products?page=2x&limit=ten"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, defaults, "{uri}");
    }

    let (status, available) = send(&app, "GET", "/products/available?page=&limit=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(available["page"], 1);
    assert_eq!(available["limit"], 10);
    assert_eq!(available["total"], 3);
}

#[tokio::test]
async fn test_empty_category_returns_the_paged_listing() {
    let app = app();
    send(&app, "POST", "/products", Some(product(1, "Cat Tree", "cat-furniture"))).await;

    let (_, listing) = send(&app, "GET", "/products", None).await;
    let (status, body) = send(&app, "GET", "/products?category=", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, listing);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_available_listing_is_newest_first() {
    let app = app();
    for code in [1, 2, 3] {
        send(&app, "POST", "/products", Some(product(code, "Litter", "cat-care"))).await;
    }

    let (_, page) = send(&app, "GET", "/products/available?limit=2", None).await;

    let codes: Vec<i64> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["product_id"].as_i64().unwrap())
        .collect();
    assert_eq!(codes, vec![3, 2]);
    assert_eq!(page["total_pages"], 2);
}

#[tokio::test]
async fn test_brand_name_is_resolved_on_create() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/brands",
        Some(json!({ "brand_id": 5, "brand_name": "Acme Pets", "categories": ["dog-food"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut with_brand = product(51, "Kibble", "dog-food");
    with_brand["brand_id"] = json!(5);
    let (_, created) = send(&app, "POST", "/products", Some(with_brand)).await;
    assert_eq!(created["brand_name"], "Acme Pets");

    let mut missing_brand = product(52, "Kibble Lite", "dog-food");
    missing_brand["brand_id"] = json!(999);
    let (status, created) = send(&app, "POST", "/products", Some(missing_brand)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["brand_name"], "");
}

#[tokio::test]
async fn test_update_returns_refreshed_product() {
    let app = app();
    let (_, created) = send(&app, "POST", "/products", Some(product(61, "Bed", "dog-beds"))).await;
    let uri = format!("/products/{}", created["id"].as_str().unwrap());

    let mut replacement = product(61, "Orthopedic Bed", "dog-beds");
    replacement["price"] = json!(89.0);
    let (status, updated) = send(&app, "PUT", &uri, Some(replacement)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["product_name"], "Orthopedic Bed");
    assert_eq!(updated["price"], 89.0);
    assert_eq!(updated["created_at"], created["created_at"]);
    assert_eq!(updated["id"], created["id"]);
}

#[tokio::test]
async fn test_brand_deactivation_hides_from_active_list() {
    let app = app();
    let (_, created) = send(
        &app,
        "POST",
        "/brands",
        Some(json!({ "brand_id": 8, "brand_name": "Fetch Co", "categories": ["dog-toys"] })),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (_, active) = send(&app, "GET", "/brands/active", None).await;
    assert_eq!(active.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/brands/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, active) = send(&app, "GET", "/brands/active", None).await;
    assert_eq!(active, json!([]));

    let (_, by_code) = send(&app, "GET", "/brands/brand/8", None).await;
    assert_eq!(by_code["is_active"], false);

    let (_, in_category) = send(&app, "GET", "/brands/category/dog-toys", None).await;
    assert_eq!(in_category, json!([]));
}

#[tokio::test]
async fn test_reviews_helpful_votes_and_rating() {
    let app = app();
    let review = |customer: i64, rating: f64, verified: bool| {
        json!({
            "product_id": 101,
            "customer_id": customer,
            "rating": rating,
            "title": "Great",
            "verified_purchase": verified
        })
    };

    let (status, first) = send(&app, "POST", "/reviews", Some(review(1, 5.0, true))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["helpful_votes"], 0);
    send(&app, "POST", "/reviews", Some(review(2, 2.0, false))).await;

    let helpful_uri = format!("/reviews/{}/helpful", first["id"].as_str().unwrap());
    send(&app, "POST", &helpful_uri, None).await;
    let (status, voted) = send(&app, "POST", &helpful_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voted["helpful_votes"], 2);

    let (_, rating) = send(&app, "GET", "/reviews/product/101/rating", None).await;
    assert_eq!(rating["review_count"], 2);
    assert_eq!(rating["average_rating"], 3.5);

    let (_, verified) = send(&app, "GET", "/reviews/product/101?verified_only=true", None).await;
    assert_eq!(verified.as_array().unwrap().len(), 1);

    let (_, high) = send(&app, "GET", "/reviews/product/101?min_rating=4", None).await;
    assert_eq!(high.as_array().unwrap().len(), 1);
    assert_eq!(high[0]["customer_id"], 1);

    let (_, by_customer) = send(&app, "GET", "/reviews/customer/2", None).await;
    assert_eq!(by_customer[0]["rating"], 2.0);
}

#[tokio::test]
async fn test_review_rating_out_of_range_is_rejected() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/reviews",
        Some(json!({ "product_id": 1, "customer_id": 1, "rating": 6.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_deleted_review_is_gone() {
    let app = app();
    let (_, review) = send(
        &app,
        "POST",
        "/reviews",
        Some(json!({ "product_id": 3, "customer_id": 9, "rating": 4.0 })),
    )
    .await;
    let uri = format!("/reviews/{}", review["id"].as_str().unwrap());

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
