//! Debt repository for reading loan records.
//!
//! Debts are created and updated only through the posting repository;
//! this repository serves the read side.

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use folio_shared::types::DebtId;

use crate::entities::{debts, sea_orm_active_enums::DebtStatus};

/// Error types for debt operations.
#[derive(Debug, thiserror::Error)]
pub enum DebtError {
    /// Debt not found.
    #[error("Debt not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Debt repository for read operations.
#[derive(Debug, Clone)]
pub struct DebtRepository {
    db: DatabaseConnection,
}

impl DebtRepository {
    /// Creates a new debt repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all debts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<debts::Model>, DebtError> {
        let debts = debts::Entity::find()
            .order_by_desc(debts::Column::StartDate)
            .all(&self.db)
            .await?;
        Ok(debts)
    }

    /// Gets a debt by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the debt is not found or the query fails.
    pub async fn get(&self, id: DebtId) -> Result<debts::Model, DebtError> {
        let debt = debts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| DebtError::NotFound(id.into_inner()))?;
        Ok(debt)
    }

    /// Sums the outstanding principal across all active debts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn total_active_principal(&self) -> Result<Decimal, DebtError> {
        let debts = debts::Entity::find()
            .filter(debts::Column::Status.eq(DebtStatus::Active))
            .all(&self.db)
            .await?;
        Ok(debts.iter().map(|d| d.remaining_principal).sum())
    }
}
