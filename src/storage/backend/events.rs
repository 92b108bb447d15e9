//! Analytics event queries
//!
//! Append path plus the windowed aggregations the reporting service
//! reads. Writes go through the retry wrapper; whether a failure is
//! surfaced or swallowed is the caller's decision.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveValue::Set, ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use tracing::debug;

use super::{retry, SeaOrmStorage};
use crate::analytics::EventKind;
use crate::storage::models::NewEvent;

use migration::entities::analytics_event;

// ============ Query result rows ============

/// Count grouped by event tag
#[derive(Debug, FromQueryResult)]
pub struct EventCountRow {
    pub event: String,
    pub count: i64,
}

/// Count grouped by page
#[derive(Debug, FromQueryResult)]
pub struct PageCountRow {
    pub page: String,
    pub count: i64,
}

/// Count grouped by a date bucket label
#[derive(Debug, FromQueryResult)]
pub struct DailyCountRow {
    pub label: String,
    pub count: i64,
}

/// Count grouped by referenced entity id
#[derive(Debug, FromQueryResult)]
pub struct ProductCountRow {
    pub product_id: Option<String>,
    pub count: i64,
}

// ============ SeaOrmStorage event methods ============

impl SeaOrmStorage {
    /// Append one event row. The timestamp is assigned here, server-side.
    pub async fn insert_event(&self, input: NewEvent) -> anyhow::Result<()> {
        let db = &self.db;
        let model = analytics_event::ActiveModel {
            event: Set(input.event.clone()),
            page: Set(input.page.clone()),
            product_id: Set(input.product_id.clone()),
            metadata: Set(input.metadata.clone()),
            user_agent: Set(input.user_agent.clone()),
            ip_hash: Set(input.ip_hash.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        retry::with_retry("insert_event", self.retry_config, || async {
            analytics_event::Entity::insert(model.clone()).exec(db).await
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to insert analytics event: {}", e))?;

        debug!("Analytics event recorded: {} ({})", input.event, input.page);
        Ok(())
    }

    /// Count events of one tag inside the window
    pub async fn count_events(
        &self,
        event: EventKind,
        start: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        analytics_event::Entity::find()
            .filter(analytics_event::Column::Event.eq(event.as_str()))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Distinct non-null ip_hash values among events of one tag.
    ///
    /// Approximate unique visitors: hashes are not stable across salt
    /// rotations or devices.
    pub async fn count_distinct_visitors(
        &self,
        event: EventKind,
        start: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        let hashes = analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::IpHash)
            .filter(analytics_event::Column::Event.eq(event.as_str()))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .filter(analytics_event::Column::IpHash.is_not_null())
            .group_by(analytics_event::Column::IpHash)
            .into_tuple::<Option<String>>()
            .all(&self.db)
            .await?;

        Ok(hashes.len() as u64)
    }

    /// Count per event tag across the whole window
    pub async fn event_breakdown(&self, start: DateTime<Utc>) -> anyhow::Result<Vec<EventCountRow>> {
        analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::Event)
            .column_as(analytics_event::Column::Id.count(), "count")
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .group_by(analytics_event::Column::Event)
            .into_model::<EventCountRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Pages ranked by event count for one tag
    pub async fn top_pages(
        &self,
        event: EventKind,
        start: DateTime<Utc>,
        limit: u64,
    ) -> anyhow::Result<Vec<PageCountRow>> {
        analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::Page)
            .column_as(analytics_event::Column::Id.count(), "count")
            .filter(analytics_event::Column::Event.eq(event.as_str()))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .group_by(analytics_event::Column::Page)
            .order_by_desc(Expr::cust("count"))
            .limit(limit)
            .into_model::<PageCountRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Time series for one tag, bucketed by `date_expr` (backend-specific)
    pub async fn daily_event_counts(
        &self,
        event: EventKind,
        start: DateTime<Utc>,
        date_expr: Expr,
    ) -> anyhow::Result<Vec<DailyCountRow>> {
        analytics_event::Entity::find()
            .select_only()
            .column_as(date_expr.clone(), "label")
            .column_as(analytics_event::Column::Id.count(), "count")
            .filter(analytics_event::Column::Event.eq(event.as_str()))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .group_by(date_expr)
            .order_by_asc(Expr::cust("label"))
            .into_model::<DailyCountRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Count per event tag for a single referenced entity
    pub async fn event_breakdown_for_product(
        &self,
        product_id: &str,
        start: DateTime<Utc>,
    ) -> anyhow::Result<Vec<EventCountRow>> {
        analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::Event)
            .column_as(analytics_event::Column::Id.count(), "count")
            .filter(analytics_event::Column::ProductId.eq(product_id))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .group_by(analytics_event::Column::Event)
            .into_model::<EventCountRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Entity ids ranked by total cross-tag engagement
    pub async fn top_product_refs(
        &self,
        start: DateTime<Utc>,
        limit: u64,
    ) -> anyhow::Result<Vec<ProductCountRow>> {
        analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::ProductId)
            .column_as(analytics_event::Column::Id.count(), "count")
            .filter(analytics_event::Column::ProductId.is_not_null())
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .group_by(analytics_event::Column::ProductId)
            .order_by_desc(Expr::cust("count"))
            .limit(limit)
            .into_model::<ProductCountRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Total rows in the event table (test and ops visibility)
    pub async fn count_all_events(&self) -> anyhow::Result<u64> {
        analytics_event::Entity::find()
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}
