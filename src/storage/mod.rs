use std::sync::Arc;

use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::{GalleryFilter, GallerySort, ProductFilter, ProductSort, SeaOrmStorage};
pub use models::{
    GalleryPatch, NewAdmin, NewEvent, NewGalleryImage, NewProduct, NewReview, ProductBrief,
    ProductPatch,
};

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let database_url = &config.database.database_url;

        // Infer the database flavour from the URL
        let backend_type = backend::infer_backend_from_url(database_url)?;

        let retry_config = backend::retry::RetryConfig {
            max_retries: config.database.retry_count,
            base_delay_ms: config.database.retry_base_delay_ms,
            max_delay_ms: config.database.retry_max_delay_ms,
        };

        let storage = SeaOrmStorage::new(
            database_url,
            &backend_type,
            config.database.pool_size,
            retry_config,
        )
        .await?;
        Ok(Arc::new(storage))
    }
}
