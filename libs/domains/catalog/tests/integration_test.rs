//! Repository and service tests against a real MongoDB
//!
//! Run with: cargo test -p domain_catalog -- --ignored

use domain_catalog::*;
use std::sync::Arc;
use test_utils::assertions::{assert_some, assert_sorted_desc};
use test_utils::{TestDataBuilder, TestMongo};

fn product_request(product_id: i64, name: &str, category: &str) -> ProductRequest {
    serde_json::from_value(serde_json::json!({
        "product_id": product_id,
        "product_name": name,
        "description": "Integration test product",
        "category": category,
        "item_dimensions": { "weight": "2kg", "count": 12 },
        "price": 19.99
    }))
    .unwrap()
}

fn review_request(product_id: i64, customer_id: i64, rating: f64) -> ReviewRequest {
    serde_json::from_value(serde_json::json!({
        "product_id": product_id,
        "customer_id": customer_id,
        "rating": rating,
        "verified_purchase": true
    }))
    .unwrap()
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_product_lifecycle_against_mongo() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_product_lifecycle_against_mongo");
    let db = mongo.database(&builder.database_name());

    let brands = Arc::new(MongoBrandRepository::new(&db));
    let products = Arc::new(MongoProductRepository::new(&db));
    brands.init_indexes().await.unwrap();
    products.init_indexes().await.unwrap();

    let brand_service = BrandService::from_shared(brands.clone());
    let service = ProductService::from_shared(products, brands);

    let brand_code = builder.brand_code(1);
    let brand: BrandRequest = serde_json::from_value(serde_json::json!({
        "brand_id": brand_code,
        "brand_name": builder.name("brand", "main"),
    }))
    .unwrap();
    brand_service.create_brand(brand).await.unwrap();

    let mut request =
        product_request(builder.product_code(1), "Tropical Fish Food Flakes", "fish");
    request.brand_id = brand_code;
    let created = service.create_product(request).await.unwrap();
    let id = assert_some(created.id, "created product id").to_hex();
    assert_eq!(created.brand_name, builder.name("brand", "main"));

    let fetched = service.get_product(&id).await.unwrap();
    assert_eq!(fetched, created);

    let hits = service.search_products("fish FOOD").await.unwrap();
    assert_eq!(hits.len(), 1);

    service.delete_product(&id).await.unwrap();
    assert!(!service.get_product(&id).await.unwrap().availability);
    assert!(service.search_products("fish").await.unwrap().is_empty());
    assert!(service.list_by_category("fish").await.unwrap().is_empty());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_unique_index_rejects_duplicate_codes() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_unique_index_rejects_duplicate_codes");
    let db = mongo.database(&builder.database_name());

    let products = MongoProductRepository::new(&db);
    products.init_indexes().await.unwrap();

    let code = builder.product_code(1);
    products
        .create(product_request(code, "Dog Leash", "dog").into_entity(None))
        .await
        .unwrap();

    // Straight to the repository, bypassing the service's existence check
    let duplicate = products
        .create(product_request(code, "Dog Collar", "dog").into_entity(None))
        .await;

    assert!(matches!(duplicate, Err(CatalogError::Conflict(_))));
    assert_eq!(products.count(ProductFilter::default()).await.unwrap(), 1);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_search_term_is_matched_literally() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_search_term_is_matched_literally");
    let db = mongo.database(&builder.database_name());

    let products = MongoProductRepository::new(&db);
    let request = product_request(builder.product_code(1), "Cat Tree (Large)", "cat");
    products.create(request.into_entity(None)).await.unwrap();
    let request = product_request(builder.product_code(2), "Cat Tree Small", "cat");
    products.create(request.into_entity(None)).await.unwrap();

    let hits = products.search("(large)").await.unwrap();
    assert_eq!(hits.len(), 1);

    assert!(products.search(".*").await.unwrap().is_empty());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_available_paging_against_mongo() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_available_paging_against_mongo");
    let db = mongo.database(&builder.database_name());

    let brands = Arc::new(MongoBrandRepository::new(&db));
    let products = Arc::new(MongoProductRepository::new(&db));
    let service = ProductService::from_shared(products, brands);

    for n in 1..=7 {
        service
            .create_product(product_request(builder.product_code(n), "Chew Stick", "dog"))
            .await
            .unwrap();
    }

    let params = PageParams {
        page: Some(2),
        limit: Some(3),
    };
    let page = service.list_available(params).await.unwrap();

    assert_eq!(page.total, 7);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 3);
    assert_sorted_desc(&page.items, |p| (p.created_at, p.id), "available products");
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_concurrent_helpful_votes_are_not_lost() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_concurrent_helpful_votes_are_not_lost");
    let db = mongo.database(&builder.database_name());

    let reviews = MongoReviewRepository::new(&db);
    reviews.init_indexes().await.unwrap();
    let service = ReviewService::new(reviews);

    let product_id = builder.product_code(1);
    let review = service
        .create_review(review_request(product_id, builder.customer_code(1), 4.0))
        .await
        .unwrap();
    let id = assert_some(review.id, "review id").to_hex();

    let votes = (0..20).map(|_| {
        let service = service.clone();
        let id = id.clone();
        tokio::spawn(async move { service.mark_helpful(&id).await })
    });
    for handle in futures_util::future::join_all(votes).await {
        handle.unwrap().unwrap();
    }

    assert_eq!(service.get_review(&id).await.unwrap().helpful_votes, 20);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_rating_aggregation_against_mongo() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_rating_aggregation_against_mongo");
    let db = mongo.database(&builder.database_name());

    let service = ReviewService::new(MongoReviewRepository::new(&db));
    let product_id = builder.product_code(1);

    let empty = service.product_rating(product_id).await.unwrap();
    assert_eq!(empty.average_rating, 0.0);
    assert_eq!(empty.review_count, 0);

    for (customer, rating) in [(1, 5.0), (2, 4.0), (3, 3.0)] {
        service
            .create_review(review_request(product_id, builder.customer_code(customer), rating))
            .await
            .unwrap();
    }

    let rating = service.product_rating(product_id).await.unwrap();
    assert_eq!(rating.average_rating, 4.0);
    assert_eq!(rating.review_count, 3);
}
