//! Admin API services
//!
//! Credential auth with JWT cookie sessions, the analytics reporting
//! endpoint, and the image upload pipeline.

pub mod analytics;
pub mod auth;
pub mod helpers;
pub mod uploads;

pub use helpers::{
    error_from_finitura, error_response, is_admin, success_response, unauthorized_response,
    ApiResponse, CookieBuilder,
};
