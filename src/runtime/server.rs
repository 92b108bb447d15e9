//! HTTP server startup
//!
//! Connects storage (running migrations), builds the shared services,
//! and configures the actix App: CORS from the static configuration,
//! compression, payload cap and the `/api` scope.

use actix_cors::Cors;
use actix_web::middleware::{Compress, DefaultHeaders};
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, warn};

use crate::api::api_routes;
use crate::config::CorsConfig;
use crate::services::{AnalyticsService, EmailNotifier, MediaStore};
use crate::storage::StorageFactory;

/// Payload cap: the 10 MiB image limit plus multipart overhead
const MAX_PAYLOAD_BYTES: usize = 12 * 1024 * 1024;

/// Validate CORS configuration at startup (runs once, not per worker)
fn validate_cors_config(cors_config: &CorsConfig) {
    if !cors_config.enabled {
        return;
    }

    if cors_config.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but allowed_origins is empty. \
            No cross-origin requests will be allowed. \
            Set allowed_origins explicitly or use '[\"*\"]' for any origin."
        );
    }

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");
    if is_any_origin && cors_config.allow_credentials {
        error!(
            "SECURITY WARNING: allow_any_origin + allow_credentials is a dangerous combination! \
            Any website can make authenticated cross-origin requests. \
            Disabling credentials for safety."
        );
    }
}

/// Build CORS middleware from configuration
fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    // CORS disabled means the browser's default same-origin policy
    if !cors_config.enabled {
        return Cors::default();
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec!["Content-Type", "Authorization", "Accept"])
        .max_age(cors_config.max_age as usize);

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");

    if cors_config.allowed_origins.is_empty() {
        // Empty origins = same-origin only
    } else if is_any_origin {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    // any_origin + credentials would let any site make authenticated
    // cross-origin requests; credentials are dropped in that case
    if cors_config.allow_credentials && !is_any_origin {
        cors = cors.supports_credentials();
    }

    cors
}

/// Run the HTTP server
///
/// Logging must be initialized before calling this.
pub async fn run_server() -> Result<()> {
    let config = crate::config::get_config();

    let storage = StorageFactory::create().await.map_err(|e| {
        error!("Storage startup failed: {}", e);
        anyhow::anyhow!(e)
    })?;

    let analytics = Arc::new(AnalyticsService::new(storage.clone()));
    let media = Arc::new(MediaStore::from_config(&config.media).await);
    let mailer = Arc::new(EmailNotifier::from_config(&config.contact));

    if !mailer.is_enabled() {
        warn!("Mail provider not configured; contact emails are disabled");
    }

    validate_cors_config(&config.cors);

    let cpu_count = config.server.cpu_count.min(32);
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        let cors = build_cors_middleware(&config.cors);

        App::new()
            .wrap(cors)
            .wrap(Compress::default())
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(analytics.clone()))
            .app_data(web::Data::new(media.clone()))
            .app_data(web::Data::new(mailer.clone()))
            .app_data(web::PayloadConfig::new(MAX_PAYLOAD_BYTES))
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(api_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count);

    warn!("Starting server at http://{}", bind_address);
    server.bind(bind_address)?.run().await?;

    Ok(())
}
