//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_api_keys;
mod m20260301_000002_create_reference_tables;
mod m20260301_000003_create_upload_artifacts;
mod m20260301_000004_create_monitoring_tables;
mod m20260301_000005_create_enhancement_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_api_keys::Migration),
            Box::new(m20260301_000002_create_reference_tables::Migration),
            Box::new(m20260301_000003_create_upload_artifacts::Migration),
            Box::new(m20260301_000004_create_monitoring_tables::Migration),
            Box::new(m20260301_000005_create_enhancement_tables::Migration),
        ]
    }
}
