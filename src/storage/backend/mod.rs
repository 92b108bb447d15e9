//! SeaORM storage backend
//!
//! Database access for the storefront, supporting SQLite,
//! MySQL/MariaDB, and PostgreSQL.

mod admins;
mod connection;
mod events;
mod gallery;
mod products;
mod reviews;
pub mod retry;

use std::time::Duration;

use moka::sync::Cache;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tracing::warn;

use crate::errors::{FinituraError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use events::{DailyCountRow, EventCountRow, PageCountRow, ProductCountRow};
pub use reviews::ReviewStats;

/// Infer the database flavour from the connection URL
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(FinituraError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported URL schemes: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// Product listing filter
#[derive(Default, Clone, Debug)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub in_stock: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Substring match on name or description
    pub search: Option<String>,
}

/// Product listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    #[default]
    Newest,
    Oldest,
    PriceLow,
    PriceHigh,
    MostViewed,
    MostLiked,
    MostContacted,
}

/// Gallery listing filter
#[derive(Default, Clone, Debug)]
pub struct GalleryFilter {
    pub category: Option<String>,
    /// Substring match on title or category
    pub search: Option<String>,
}

/// Gallery listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GallerySort {
    #[default]
    Newest,
    Oldest,
    MostViewed,
    MostLiked,
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// Pagination COUNT cache (30s TTL)
    count_cache: Cache<String, u64>,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(
        database_url: &str,
        backend_name: &str,
        pool_size: u32,
        retry_config: retry::RetryConfig,
    ) -> Result<Self> {
        if database_url.is_empty() {
            return Err(FinituraError::database_config(
                "DATABASE_URL is not set".to_string(),
            ));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name, pool_size).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            count_cache: Cache::builder()
                .time_to_live(Duration::from_secs(30))
                .max_capacity(100)
                .build(),
            retry_config,
        };

        run_migrations(&storage.db).await?;

        warn!(
            "{} storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn get_backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Raw connection handle, used by tests and the CLI
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Drop cached pagination COUNTs (called on data mutation)
    pub fn invalidate_count_cache(&self) {
        self.count_cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("sqlite://data.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("finitura.db").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("mysql://root@localhost/shop").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("postgres://localhost/shop").unwrap(),
            "postgres"
        );
        assert!(infer_backend_from_url("mongodb://localhost").is_err());
    }
}
