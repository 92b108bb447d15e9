//! Analytics event entity
//!
//! Append-only. `product_id` can point at a product or a gallery image
//! depending on the event tag; there is no foreign key and orphans are
//! kept for historical reporting. `ip_hash` is a salted, truncated
//! one-way hash — the raw address is never stored.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "analytics_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub event: String,
    #[sea_orm(column_type = "Text")]
    pub page: String,
    pub product_id: Option<String>,
    /// JSON-serialized opaque blob, not strongly typed
    #[sea_orm(column_type = "Text", nullable)]
    pub metadata: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    pub ip_hash: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
