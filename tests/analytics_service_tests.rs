//! AnalyticsService integration tests
//!
//! Covers the best-effort write paths (track_event, counter bumps), the
//! windowed aggregations (summary, product report, conversion metrics)
//! and the concurrency invariant on the denormalized counters.

use std::sync::{Arc, Once};

use sea_orm::EntityTrait;
use tempfile::TempDir;

use finitura::analytics::{EventKind, GalleryStat, ProductStat, TrackOptions};
use finitura::config::init_config;
use finitura::services::analytics::ProductReport;
use finitura::services::AnalyticsService;
use finitura::storage::backend::retry::RetryConfig;
use finitura::storage::{NewGalleryImage, NewProduct, SeaOrmStorage};

use migration::entities::analytics_event;

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
    let path = td.path().join("analytics_test.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let storage = SeaOrmStorage::new(&url, "sqlite", 5, RetryConfig::default())
        .await
        .unwrap();
    (Arc::new(storage), td)
}

fn sample_product() -> NewProduct {
    NewProduct {
        name: "Marmorino Classic".to_string(),
        description: "Lime-based polished plaster for interior walls".to_string(),
        price: 45000.0,
        category: "marmorino".to_string(),
        image_url: "https://cdn.example.org/products/m1.webp".to_string(),
        in_stock: true,
    }
}

async fn track(service: &AnalyticsService, event: EventKind, page: &str, ip_hash: &str) {
    service
        .track_event(
            event,
            page,
            TrackOptions {
                ip_hash: Some(ip_hash.to_string()),
                user_agent: Some("test-agent".to_string()),
                ..Default::default()
            },
        )
        .await;
}

// =============================================================================
// Write paths
// =============================================================================

#[tokio::test]
async fn test_track_event_inserts_one_row() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(storage.clone());

    track(&service, EventKind::PageView, "/", "aaaa").await;

    assert_eq!(storage.count_all_events().await.unwrap(), 1);
}

#[tokio::test]
async fn test_double_tracking_is_not_deduplicated() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(storage.clone());

    // Two identical calls are two independent facts
    track(&service, EventKind::ProductView, "/shop", "aaaa").await;
    track(&service, EventKind::ProductView, "/shop", "aaaa").await;

    assert_eq!(storage.count_all_events().await.unwrap(), 2);
}

#[tokio::test]
async fn test_metadata_is_serialized_to_json_text() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(storage.clone());

    service
        .track_event(
            EventKind::ContactForm,
            "/contact",
            TrackOptions {
                metadata: Some(serde_json::json!({ "sendVia": "whatsapp" })),
                ..Default::default()
            },
        )
        .await;

    let rows = analytics_event::Entity::find()
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    let stored: serde_json::Value =
        serde_json::from_str(rows[0].metadata.as_deref().unwrap()).unwrap();
    assert_eq!(stored["sendVia"], "whatsapp");
    assert_eq!(rows[0].event, "contact_form");
}

#[tokio::test]
async fn test_track_event_swallows_storage_failure() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(storage.clone());

    use sea_orm::ConnectionTrait;
    storage
        .get_db()
        .execute_unprepared("DROP TABLE analytics_events")
        .await
        .unwrap();

    // Must not panic or propagate
    track(&service, EventKind::PageView, "/", "aaaa").await;
}

#[tokio::test]
async fn test_increment_missing_product_is_a_noop() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(storage.clone());

    service
        .increment_product_stat("no-such-id", ProductStat::Likes)
        .await;

    assert_eq!(
        storage.increment_product_stat("no-such-id", ProductStat::Likes).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_gallery_counter_increment() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(storage.clone());

    let image = storage
        .insert_gallery_image(NewGalleryImage {
            title: "Venetian hallway".to_string(),
            category: "interior".to_string(),
            image_url: "https://cdn.example.org/gallery/g1.webp".to_string(),
        })
        .await
        .unwrap();

    service.increment_gallery_stat(&image.id, GalleryStat::Views).await;
    service.increment_gallery_stat(&image.id, GalleryStat::Likes).await;
    service.increment_gallery_stat(&image.id, GalleryStat::Likes).await;

    let reloaded = storage.get_gallery_image(&image.id).await.unwrap().unwrap();
    assert_eq!(reloaded.views, 1);
    assert_eq!(reloaded.likes, 2);
}

#[tokio::test]
async fn test_concurrent_likes_do_not_lose_updates() {
    let (storage, _td) = create_temp_storage().await;

    let product = storage.insert_product(sample_product()).await.unwrap();
    assert_eq!(product.likes, 0);

    const N: usize = 20;
    let mut handles = Vec::with_capacity(N);
    for _ in 0..N {
        let storage = storage.clone();
        let id = product.id.clone();
        handles.push(tokio::spawn(async move {
            let service = AnalyticsService::new(storage);
            service.increment_product_stat(&id, ProductStat::Likes).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let reloaded = storage.get_product(&product.id).await.unwrap().unwrap();
    assert_eq!(reloaded.likes, N as i64);
}

// =============================================================================
// Summary
// =============================================================================

#[tokio::test]
async fn test_summary_counts_and_breakdown() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(storage.clone());

    // 3 page views over 2 distinct visitors and 2 pages, 1 product view
    track(&service, EventKind::PageView, "/", "aaaa").await;
    track(&service, EventKind::PageView, "/", "aaaa").await;
    track(&service, EventKind::PageView, "/shop", "bbbb").await;
    track(&service, EventKind::ProductView, "/shop", "bbbb").await;

    let summary = service.summary(30).await.unwrap();

    assert_eq!(summary.total_views, 3);
    assert_eq!(summary.unique_visitors, 2);

    let views_of = |event: &str| {
        summary
            .event_breakdown
            .iter()
            .find(|row| row.event == event)
            .map(|row| row.count)
    };
    assert_eq!(views_of("page_view"), Some(3));
    assert_eq!(views_of("product_view"), Some(1));

    // Top pages are ordered by view count, page_view only
    assert_eq!(summary.top_pages[0].page, "/");
    assert_eq!(summary.top_pages[0].views, 2);
    assert_eq!(summary.top_pages[1].page, "/shop");
    assert_eq!(summary.top_pages[1].views, 1);

    // All rows were written just now, so the series has exactly one bucket
    assert_eq!(summary.daily_views.len(), 1);
    assert_eq!(summary.daily_views[0].count, 3);
}

#[tokio::test]
async fn test_summary_on_empty_store() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(storage);

    let summary = service.summary(30).await.unwrap();
    assert_eq!(summary.total_views, 0);
    assert_eq!(summary.unique_visitors, 0);
    assert!(summary.event_breakdown.is_empty());
    assert!(summary.top_pages.is_empty());
    assert!(summary.daily_views.is_empty());
}

// =============================================================================
// Product report
// =============================================================================

#[tokio::test]
async fn test_product_report_for_single_product() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(storage.clone());

    let product = storage.insert_product(sample_product()).await.unwrap();

    for _ in 0..3 {
        service
            .track_event(
                EventKind::ProductView,
                "/shop",
                TrackOptions {
                    product_id: Some(product.id.clone()),
                    ..Default::default()
                },
            )
            .await;
    }
    service
        .track_event(
            EventKind::ProductLike,
            "/shop",
            TrackOptions {
                product_id: Some(product.id.clone()),
                ..Default::default()
            },
        )
        .await;

    let report = service.product_report(Some(&product.id), 30).await.unwrap();
    match report {
        ProductReport::Single(map) => {
            assert_eq!(map.get("product_view"), Some(&3));
            assert_eq!(map.get("product_like"), Some(&1));
        }
        ProductReport::Top(_) => panic!("expected single-product map"),
    }
}

#[tokio::test]
async fn test_top_products_omit_deleted_entities() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(storage.clone());

    let surviving = storage.insert_product(sample_product()).await.unwrap();

    // Orphaned events referencing a product that no longer exists
    for _ in 0..5 {
        service
            .track_event(
                EventKind::ProductView,
                "/shop",
                TrackOptions {
                    product_id: Some("deleted-product".to_string()),
                    ..Default::default()
                },
            )
            .await;
    }
    for _ in 0..2 {
        service
            .track_event(
                EventKind::ProductView,
                "/shop",
                TrackOptions {
                    product_id: Some(surviving.id.clone()),
                    ..Default::default()
                },
            )
            .await;
    }

    let report = service.product_report(None, 30).await.unwrap();
    match report {
        ProductReport::Top(ranking) => {
            // The orphan leads the raw ranking but has no product row, so
            // only the surviving product is annotated and returned
            assert_eq!(ranking.len(), 1);
            assert_eq!(ranking[0].product.id, surviving.id);
            assert_eq!(ranking[0].total_engagements, 2);
        }
        ProductReport::Single(_) => panic!("expected ranking"),
    }
}

// =============================================================================
// Conversion metrics
// =============================================================================

#[tokio::test]
async fn test_conversion_rate_with_zero_page_views() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(storage);

    let metrics = service.conversion_metrics(30).await.unwrap();
    assert_eq!(metrics.page_views, 0);
    assert_eq!(metrics.view_to_contact_rate, "0");
    assert_eq!(metrics.product_view_to_contact_rate, "0");
}

#[tokio::test]
async fn test_conversion_rate_two_decimal_percentage() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(storage);

    // 200 page views, 3 contact forms, 7 whatsapp clicks -> 5.00%
    for _ in 0..200 {
        track(&service, EventKind::PageView, "/", "aaaa").await;
    }
    for _ in 0..3 {
        track(&service, EventKind::ContactForm, "/contact", "aaaa").await;
    }
    for _ in 0..7 {
        track(&service, EventKind::WhatsappClick, "/contact", "aaaa").await;
    }

    let metrics = service.conversion_metrics(30).await.unwrap();
    assert_eq!(metrics.page_views, 200);
    assert_eq!(metrics.total_contacts, 10);
    assert_eq!(metrics.view_to_contact_rate, "5.00");
    // No product views recorded
    assert_eq!(metrics.product_view_to_contact_rate, "0");
}

// =============================================================================
// Read failures are loud
// =============================================================================

#[tokio::test]
async fn test_aggregation_errors_propagate() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(storage.clone());

    use sea_orm::ConnectionTrait;
    storage
        .get_db()
        .execute_unprepared("DROP TABLE analytics_events")
        .await
        .unwrap();

    assert!(service.summary(30).await.is_err());
    assert!(service.conversion_metrics(30).await.is_err());
    assert!(service.product_report(None, 30).await.is_err());
}
