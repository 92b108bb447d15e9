pub mod admin;
pub mod analytics_event;
pub mod gallery_image;
pub mod product;
pub mod review;
