//! Customer review operations

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::info;

use super::{retry, SeaOrmStorage};
use crate::errors::{FinituraError, Result};
use crate::storage::models::NewReview;

use migration::entities::review;

/// Aggregate over approved reviews
#[derive(Debug, Clone, Default)]
pub struct ReviewStats {
    pub average_rating: f64,
    pub total_reviews: u64,
}

#[derive(Debug, FromQueryResult)]
struct ReviewStatsRow {
    avg_rating: Option<f64>,
    total: i64,
}

impl SeaOrmStorage {
    pub async fn insert_review(&self, input: NewReview) -> Result<review::Model> {
        let model = review::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(input.name),
            email: Set(input.email),
            rating: Set(input.rating),
            message: Set(input.message),
            // Hidden until an operator approves it
            approved: Set(false),
            created_at: Set(Utc::now()),
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            FinituraError::database_operation(format!("Review insert failed: {}", e))
        })?;

        info!("Review created: {} (pending approval)", inserted.id);
        Ok(inserted)
    }

    pub async fn get_review(&self, id: &str) -> Result<Option<review::Model>> {
        let db = &self.db;
        let id_owned = id.to_string();

        retry::with_retry(&format!("get_review({})", id), self.retry_config, || async {
            review::Entity::find_by_id(&id_owned).one(db).await
        })
        .await
        .map_err(|e| FinituraError::database_operation(format!("Review query failed: {}", e)))
    }

    /// Newest first; `approved_only` hides pending reviews from the public
    pub async fn list_reviews(
        &self,
        page: u64,
        page_size: u64,
        approved_only: bool,
    ) -> Result<(Vec<review::Model>, u64)> {
        let mut condition = Condition::all();
        if approved_only {
            condition = condition.add(review::Column::Approved.eq(true));
        }

        let db = &self.db;
        let cond = condition.clone();
        let total = retry::with_retry("list_reviews(count)", self.retry_config, || async {
            review::Entity::find().filter(cond.clone()).count(db).await
        })
        .await
        .map_err(|e| FinituraError::database_operation(format!("Review count failed: {}", e)))?;

        let page_offset = page.saturating_sub(1);
        let models = retry::with_retry("list_reviews(data)", self.retry_config, || async {
            review::Entity::find()
                .filter(condition.clone())
                .order_by_desc(review::Column::CreatedAt)
                .paginate(db, page_size)
                .fetch_page(page_offset)
                .await
        })
        .await
        .map_err(|e| FinituraError::database_operation(format!("Review query failed: {}", e)))?;

        Ok((models, total))
    }

    /// AVG/COUNT over approved reviews, rounded to one decimal
    pub async fn review_stats(&self) -> Result<ReviewStats> {
        let result = review::Entity::find()
            .select_only()
            .column_as(Expr::cust("AVG(rating)"), "avg_rating")
            .column_as(review::Column::Id.count(), "total")
            .filter(review::Column::Approved.eq(true))
            .into_model::<ReviewStatsRow>()
            .one(&self.db)
            .await
            .map_err(|e| {
                FinituraError::database_operation(format!("Review stats query failed: {}", e))
            })?;

        Ok(match result {
            Some(row) => ReviewStats {
                average_rating: (row.avg_rating.unwrap_or(0.0) * 10.0).round() / 10.0,
                total_reviews: row.total.max(0) as u64,
            },
            None => ReviewStats::default(),
        })
    }

    /// Moderation switch; returns the updated row, or None for unknown ids
    pub async fn set_review_approved(
        &self,
        id: &str,
        approved: bool,
    ) -> Result<Option<review::Model>> {
        let Some(existing) = self.get_review(id).await? else {
            return Ok(None);
        };

        let model = review::ActiveModel {
            id: Set(existing.id),
            approved: Set(approved),
            ..Default::default()
        };

        let updated = model.update(&self.db).await.map_err(|e| {
            FinituraError::database_operation(format!("Review update failed: {}", e))
        })?;

        info!(
            "Review {}: {}",
            if approved { "approved" } else { "rejected" },
            id
        );
        Ok(Some(updated))
    }

    pub async fn delete_review(&self, id: &str) -> Result<bool> {
        let result = review::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                FinituraError::database_operation(format!("Review delete failed: {}", e))
            })?;

        Ok(result.rows_affected > 0)
    }
}
