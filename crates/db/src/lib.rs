//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! The posting repository is the write path: it resolves a request's
//! references into a `folio_core` posting context, asks the engine for a
//! plan, and commits the plan inside one database transaction.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, AssetRepository, DebtRepository, PostingRepository, ReportingRepository,
    SnapshotRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
