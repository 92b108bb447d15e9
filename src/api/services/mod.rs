//! HTTP service modules
//!
//! Public storefront endpoints (catalogue, gallery, reviews, contact,
//! tracking) plus the admin area (auth, reporting, uploads). Handlers
//! that require a session gate themselves with `helpers::is_admin`.

pub mod admin;
pub mod contact;
pub mod gallery;
pub mod products;
pub mod reviews;
pub mod tracking;
