//! Database migrations for the integrations store.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_01_06_090000_create_organizations;
mod m2025_01_06_090100_create_integrations;
mod m2025_01_06_090200_create_message_groups;
mod m2025_01_06_090300_create_orders;
mod m2025_01_06_090400_create_posts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_06_090000_create_organizations::Migration),
            Box::new(m2025_01_06_090100_create_integrations::Migration),
            Box::new(m2025_01_06_090200_create_message_groups::Migration),
            Box::new(m2025_01_06_090300_create_orders::Migration),
            Box::new(m2025_01_06_090400_create_posts::Migration),
        ]
    }
}
