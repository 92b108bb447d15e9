//! Product catalogue entity
//!
//! views/likes/shares/contacts are denormalized engagement counters.
//! They are only ever incremented (atomically, by the storage layer) and
//! are written independently of the analytics event log.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: f64,
    pub category: String,
    #[sea_orm(column_type = "Text")]
    pub image_url: String,
    pub in_stock: bool,
    pub views: i64,
    pub likes: i64,
    pub shares: i64,
    pub contacts: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
