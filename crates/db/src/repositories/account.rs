//! Account repository for holding-account database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use folio_shared::types::AccountId;

use crate::entities::{accounts, sea_orm_active_enums::AccountKind};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// An account with this name already exists.
    #[error("Account name already in use: {0}")]
    DuplicateName(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Display name, unique.
    pub name: String,
    /// Account classification.
    pub kind: AccountKind,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all accounts, conceptual ones last.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<accounts::Model>, AccountError> {
        let accounts = accounts::Entity::find()
            .order_by_asc(accounts::Column::Kind)
            .order_by_asc(accounts::Column::Name)
            .all(&self.db)
            .await?;
        Ok(accounts)
    }

    /// Gets an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found or the query fails.
    pub async fn get(&self, id: AccountId) -> Result<accounts::Model, AccountError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| AccountError::NotFound(id.into_inner()))?;
        Ok(account)
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already in use or the insert fails.
    pub async fn create(&self, input: CreateAccountInput) -> Result<accounts::Model, AccountError> {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::Name.eq(input.name.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AccountError::DuplicateName(input.name));
        }

        let account = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            name: Set(input.name),
            kind: Set(input.kind),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };

        let result = account.insert(&self.db).await?;
        Ok(result)
    }
}
