//! HTTP API surface
//!
//! Route composition lives here; the handlers live under `services`.

pub mod constants;
pub mod jwt;
pub mod services;

use actix_web::web;

use services::{admin, contact, gallery, products, reviews, tracking};

/// The complete `/api` scope
///
/// `/analytics` is one path with two contracts: POST is the public
/// tracking intake, GET the admin report.
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .route("/analytics", web::post().to(tracking::track_event))
        .route("/analytics", web::get().to(admin::analytics::get_report))
        .route("/contact", web::post().to(contact::submit_contact))
        .service(products::routes())
        .service(gallery::routes())
        .service(reviews::routes())
        .service(admin::auth::routes())
        .service(admin::uploads::routes())
}
