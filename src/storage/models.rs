//! Write-side input records for the storage layer

/// New product row (id and counters are assigned by the storage layer)
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_url: String,
    pub in_stock: bool,
}

/// Partial product update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub in_stock: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewGalleryImage {
    pub title: String,
    pub category: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct GalleryPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub name: String,
    pub email: Option<String>,
    pub rating: i32,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    /// Argon2 hash, already derived by the caller
    pub password_hash: String,
}

/// One analytics event row, fully derived (metadata already serialized)
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event: String,
    pub page: String,
    pub product_id: Option<String>,
    pub metadata: Option<String>,
    pub user_agent: Option<String>,
    pub ip_hash: Option<String>,
}

/// Minimal product projection for analytics annotation
#[derive(Debug, Clone)]
pub struct ProductBrief {
    pub id: String,
    pub name: String,
    pub image_url: String,
}
