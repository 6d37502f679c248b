//! SeaORM migrations for multi-database support
//!
//! This module provides database-agnostic migrations that work across SQLite,
//! PostgreSQL, and MySQL. Database-specific column types are applied where
//! necessary.

use sea_orm_migration::prelude::*;

pub mod m20260110_000001_initial_schema;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260110_000001_initial_schema::Migration)]
    }
}
