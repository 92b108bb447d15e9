//! Finitura - storefront and analytics backend for a decorative-painting
//! studio
//!
//! This library provides the core functionality for the Finitura service:
//! content CRUD for products, gallery images and reviews, the contact and
//! inquiry flow, an image upload pipeline against S3-compatible storage,
//! and a privacy-preserving engagement analytics subsystem.
//!
//! # Architecture
//! - `analytics`: event tags, counter names and client context derivation
//! - `api`: HTTP services and route composition
//! - `cli`: command-line entry points
//! - `config`: static configuration (TOML file + environment)
//! - `errors`: crate-wide error type
//! - `runtime`: server startup and wiring
//! - `services`: business logic over storage and external providers
//! - `storage`: SeaORM persistence layer
//! - `system`: logging initialization
//! - `utils`: small shared helpers

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
