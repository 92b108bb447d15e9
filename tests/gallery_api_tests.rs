//! Gallery API tests

use std::sync::{Arc, Once};

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};
use serde_json::json;
use tempfile::TempDir;

use finitura::api::jwt::get_jwt_service;
use finitura::api::services::gallery;
use finitura::config::init_config;
use finitura::services::AnalyticsService;
use finitura::storage::backend::retry::RetryConfig;
use finitura::storage::{NewGalleryImage, SeaOrmStorage};

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_static_config();
    let td = TempDir::new().unwrap();
    let path = td.path().join("gallery_test.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let storage = SeaOrmStorage::new(&url, "sqlite", 5, RetryConfig::default())
        .await
        .unwrap();
    (Arc::new(storage), td)
}

macro_rules! gallery_app {
    ($storage:expr, $analytics:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($storage.clone()))
                .app_data(web::Data::new($analytics.clone()))
                .service(web::scope("/api").service(gallery::routes())),
        )
        .await
    };
}

fn admin_bearer() -> (&'static str, String) {
    let token = get_jwt_service()
        .generate_access_token("admin@studio.test")
        .unwrap();
    ("Authorization", format!("Bearer {}", token))
}

fn new_image(title: &str, category: &str) -> NewGalleryImage {
    NewGalleryImage {
        title: title.to_string(),
        category: category.to_string(),
        image_url: "https://cdn.example.org/gallery/g.webp".to_string(),
    }
}

#[tokio::test]
async fn test_list_with_category_filter() {
    let (storage, _td) = create_temp_storage().await;
    let analytics = Arc::new(AnalyticsService::new(storage.clone()));

    storage.insert_gallery_image(new_image("Venetian hallway", "interior")).await.unwrap();
    storage.insert_gallery_image(new_image("Textured facade", "exterior")).await.unwrap();

    let app = gallery_app!(storage, analytics);

    let req = TestRequest::get()
        .uri("/api/gallery?category=interior")
        .to_request();
    let body: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["title"], "Venetian hallway");
}

#[tokio::test]
async fn test_create_requires_admin_and_valid_category() {
    let (storage, _td) = create_temp_storage().await;
    let analytics = Arc::new(AnalyticsService::new(storage.clone()));
    let app = gallery_app!(storage, analytics);

    let payload = json!({
        "title": "Venetian hallway",
        "category": "interior",
        "imageUrl": "https://cdn.example.org/gallery/h1.webp",
    });

    let req = TestRequest::post()
        .uri("/api/gallery")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = TestRequest::post()
        .uri("/api/gallery")
        .insert_header(admin_bearer())
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = TestRequest::post()
        .uri("/api/gallery")
        .insert_header(admin_bearer())
        .set_json(json!({
            "title": "Garage floor",
            "category": "garage",
            "imageUrl": "https://cdn.example.org/gallery/g1.webp",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_gallery_patch_accepts_like_only() {
    let (storage, _td) = create_temp_storage().await;
    let analytics = Arc::new(AnalyticsService::new(storage.clone()));
    let image = storage
        .insert_gallery_image(new_image("Venetian hallway", "interior"))
        .await
        .unwrap();
    let app = gallery_app!(storage, analytics);

    let req = TestRequest::patch()
        .uri(&format!("/api/gallery/{}", image.id))
        .set_json(json!({ "action": "like" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Gallery images have no share counter
    let req = TestRequest::patch()
        .uri(&format!("/api/gallery/{}", image.id))
        .set_json(json!({ "action": "share" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let reloaded = storage.get_gallery_image(&image.id).await.unwrap().unwrap();
    assert_eq!(reloaded.likes, 1);
}

#[tokio::test]
async fn test_update_and_missing_image() {
    let (storage, _td) = create_temp_storage().await;
    let analytics = Arc::new(AnalyticsService::new(storage.clone()));
    let image = storage
        .insert_gallery_image(new_image("Venetian hallway", "interior"))
        .await
        .unwrap();
    let app = gallery_app!(storage, analytics);

    let req = TestRequest::put()
        .uri(&format!("/api/gallery/{}", image.id))
        .insert_header(admin_bearer())
        .set_json(json!({ "title": "Venetian entrance hall" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["title"], "Venetian entrance hall");
    assert_eq!(body["data"]["category"], "interior");

    let req = TestRequest::get().uri("/api/gallery/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
