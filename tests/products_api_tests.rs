//! Product API tests
//!
//! Listing filters and pagination, validation bounds, the admin gate on
//! mutations and the public engagement PATCH.

use std::sync::{Arc, Once};

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};
use serde_json::json;
use tempfile::TempDir;

use finitura::api::jwt::get_jwt_service;
use finitura::api::services::products;
use finitura::config::{init_config, MediaConfig};
use finitura::services::{AnalyticsService, MediaStore};
use finitura::storage::backend::retry::RetryConfig;
use finitura::storage::{NewProduct, SeaOrmStorage};

// =============================================================================
// Setup
// =============================================================================

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_static_config();
    let td = TempDir::new().unwrap();
    let path = td.path().join("products_test.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let storage = SeaOrmStorage::new(&url, "sqlite", 5, RetryConfig::default())
        .await
        .unwrap();
    (Arc::new(storage), td)
}

macro_rules! products_app {
    ($storage:expr, $analytics:expr) => {{
        // The delete handler pulls the media store from app data; an
        // unconfigured one never talks to the network in these tests.
        let media = Arc::new(MediaStore::from_config(&MediaConfig::default()).await);
        test::init_service(
            App::new()
                .app_data(web::Data::new($storage.clone()))
                .app_data(web::Data::new($analytics.clone()))
                .app_data(web::Data::new(media))
                .service(web::scope("/api").service(products::routes())),
        )
        .await
    }};
}

fn admin_bearer() -> (&'static str, String) {
    let token = get_jwt_service()
        .generate_access_token("admin@studio.test")
        .unwrap();
    ("Authorization", format!("Bearer {}", token))
}

fn new_product(name: &str, category: &str, price: f64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: "Lime-based polished plaster for interior walls".to_string(),
        price,
        category: category.to_string(),
        image_url: "https://cdn.example.org/products/p.webp".to_string(),
        in_stock: true,
    }
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_filters_and_pagination() {
    let (storage, _td) = create_temp_storage().await;
    let analytics = Arc::new(AnalyticsService::new(storage.clone()));

    storage.insert_product(new_product("Marmorino Classic", "marmorino", 45000.0)).await.unwrap();
    storage.insert_product(new_product("Marmorino Fine", "marmorino", 52000.0)).await.unwrap();
    storage.insert_product(new_product("Steel Trowel", "tools", 8000.0)).await.unwrap();

    let app = products_app!(storage, analytics);

    // Category filter
    let req = TestRequest::get()
        .uri("/api/products?category=marmorino")
        .to_request();
    let body: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["pagination"]["total"], 2);

    // Price range keeps only the cheap tool
    let req = TestRequest::get()
        .uri("/api/products?maxPrice=10000")
        .to_request();
    let body: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Steel Trowel");

    // Search matches name substrings
    let req = TestRequest::get()
        .uri("/api/products?search=Fine")
        .to_request();
    let body: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Price ascending sort
    let req = TestRequest::get()
        .uri("/api/products?sort=price-low")
        .to_request();
    let body: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"][0]["name"], "Steel Trowel");

    // Page size 2 over 3 rows
    let req = TestRequest::get()
        .uri("/api/products?limit=2&page=1")
        .to_request();
    let body: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasMore"], true);
}

#[tokio::test]
async fn test_get_missing_product_is_404() {
    let (storage, _td) = create_temp_storage().await;
    let analytics = Arc::new(AnalyticsService::new(storage.clone()));
    let app = products_app!(storage, analytics);

    let req = TestRequest::get().uri("/api/products/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Admin mutations
// =============================================================================

#[tokio::test]
async fn test_create_requires_admin() {
    let (storage, _td) = create_temp_storage().await;
    let analytics = Arc::new(AnalyticsService::new(storage.clone()));
    let app = products_app!(storage, analytics);

    let req = TestRequest::post()
        .uri("/api/products")
        .set_json(json!({
            "name": "Marmorino Classic",
            "description": "Lime-based polished plaster for interior walls",
            "price": 45000.0,
            "category": "marmorino",
            "imageUrl": "https://cdn.example.org/products/m1.webp",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_validation_bounds() {
    let (storage, _td) = create_temp_storage().await;
    let analytics = Arc::new(AnalyticsService::new(storage.clone()));
    let app = products_app!(storage, analytics);

    let req = TestRequest::post()
        .uri("/api/products")
        .insert_header(admin_bearer())
        .set_json(json!({
            "name": "Marmorino Classic",
            "description": "Lime-based polished plaster for interior walls",
            "price": 45000.0,
            "category": "marmorino",
            "imageUrl": "https://cdn.example.org/products/m1.webp",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["views"], 0);
    assert_eq!(body["data"]["inStock"], true);

    // Unknown category
    let req = TestRequest::post()
        .uri("/api/products")
        .insert_header(admin_bearer())
        .set_json(json!({
            "name": "Granite Panel",
            "description": "A perfectly reasonable description here",
            "price": 100.0,
            "category": "granite",
            "imageUrl": "https://cdn.example.org/products/g.webp",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Non-positive price
    let req = TestRequest::post()
        .uri("/api/products")
        .insert_header(admin_bearer())
        .set_json(json!({
            "name": "Marmorino Classic",
            "description": "Lime-based polished plaster for interior walls",
            "price": 0,
            "category": "marmorino",
            "imageUrl": "https://cdn.example.org/products/m1.webp",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_partial_update() {
    let (storage, _td) = create_temp_storage().await;
    let analytics = Arc::new(AnalyticsService::new(storage.clone()));
    let product = storage
        .insert_product(new_product("Marmorino Classic", "marmorino", 45000.0))
        .await
        .unwrap();
    let app = products_app!(storage, analytics);

    let req = TestRequest::put()
        .uri(&format!("/api/products/{}", product.id))
        .insert_header(admin_bearer())
        .set_json(json!({ "price": 47500.0, "inStock": false }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["price"], 47500.0);
    assert_eq!(body["data"]["inStock"], false);
    // Untouched fields survive
    assert_eq!(body["data"]["name"], "Marmorino Classic");

    let req = TestRequest::put()
        .uri("/api/products/nope")
        .insert_header(admin_bearer())
        .set_json(json!({ "price": 1.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_product() {
    let (storage, _td) = create_temp_storage().await;
    let analytics = Arc::new(AnalyticsService::new(storage.clone()));

    // No stored image, so deletion never touches the object store
    let mut input = new_product("Marmorino Classic", "marmorino", 45000.0);
    input.image_url = String::new();
    let product = storage.insert_product(input).await.unwrap();

    let app = products_app!(storage, analytics);

    let req = TestRequest::delete()
        .uri(&format!("/api/products/{}", product.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = TestRequest::delete()
        .uri(&format!("/api/products/{}", product.id))
        .insert_header(admin_bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(storage.get_product(&product.id).await.unwrap().is_none());
}

// =============================================================================
// Engagement PATCH
// =============================================================================

#[tokio::test]
async fn test_stat_actions_map_to_counters() {
    let (storage, _td) = create_temp_storage().await;
    let analytics = Arc::new(AnalyticsService::new(storage.clone()));
    let product = storage
        .insert_product(new_product("Marmorino Classic", "marmorino", 45000.0))
        .await
        .unwrap();
    let app = products_app!(storage, analytics);

    for action in ["like", "share", "contact"] {
        let req = TestRequest::patch()
            .uri(&format!("/api/products/{}", product.id))
            .set_json(json!({ "action": action }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let reloaded = storage.get_product(&product.id).await.unwrap().unwrap();
    assert_eq!(reloaded.likes, 1);
    assert_eq!(reloaded.shares, 1);
    assert_eq!(reloaded.contacts, 1);
    // Views only move on page views, not on engagement actions
    assert_eq!(reloaded.views, 0);
}

#[tokio::test]
async fn test_unknown_action_is_rejected() {
    let (storage, _td) = create_temp_storage().await;
    let analytics = Arc::new(AnalyticsService::new(storage.clone()));
    let product = storage
        .insert_product(new_product("Marmorino Classic", "marmorino", 45000.0))
        .await
        .unwrap();
    let app = products_app!(storage, analytics);

    let req = TestRequest::patch()
        .uri(&format!("/api/products/{}", product.id))
        .set_json(json!({ "action": "boost" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = TestRequest::patch()
        .uri("/api/products/nope")
        .set_json(json!({ "action": "like" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
