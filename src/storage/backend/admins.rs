//! Admin account operations

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use tracing::info;

use super::{retry, SeaOrmStorage};
use crate::errors::{FinituraError, Result};
use crate::storage::models::NewAdmin;

use migration::entities::admin;

impl SeaOrmStorage {
    /// Lookup is case-insensitive: emails are stored lowercased
    pub async fn find_admin_by_email(&self, email: &str) -> Result<Option<admin::Model>> {
        let db = &self.db;
        let email_lower = email.to_lowercase();

        retry::with_retry("find_admin_by_email", self.retry_config, || async {
            admin::Entity::find()
                .filter(admin::Column::Email.eq(&email_lower))
                .one(db)
                .await
        })
        .await
        .map_err(|e| FinituraError::database_operation(format!("Admin query failed: {}", e)))
    }

    /// Fails with Conflict when the email is already registered
    pub async fn insert_admin(&self, input: NewAdmin) -> Result<admin::Model> {
        let email_lower = input.email.to_lowercase();

        if self.find_admin_by_email(&email_lower).await?.is_some() {
            return Err(FinituraError::conflict(format!(
                "An account with email {} already exists",
                email_lower
            )));
        }

        let model = admin::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(input.name),
            email: Set(email_lower),
            password: Set(input.password_hash),
            role: Set("admin".to_string()),
            created_at: Set(Utc::now()),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| FinituraError::database_operation(format!("Admin insert failed: {}", e)))?;

        info!("Admin account created: {}", inserted.email);
        Ok(inserted)
    }
}
