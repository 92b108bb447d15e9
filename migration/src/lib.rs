pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20250912_000001_content_tables;
mod m20250918_000001_analytics_events;
mod m20250925_000001_admins_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250912_000001_content_tables::Migration),
            Box::new(m20250918_000001_analytics_events::Migration),
            Box::new(m20250925_000001_admins_table::Migration),
        ]
    }
}
