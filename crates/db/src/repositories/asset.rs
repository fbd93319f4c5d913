//! Asset repository for security and cash-asset database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use folio_shared::types::AssetId;

use crate::entities::{assets, sea_orm_active_enums::AssetClass};

/// Error types for asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Asset not found.
    #[error("Asset not found: {0}")]
    NotFound(Uuid),

    /// An asset with this ticker already exists.
    #[error("Ticker already in use: {0}")]
    DuplicateTicker(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an asset.
#[derive(Debug, Clone)]
pub struct CreateAssetInput {
    /// Ticker symbol, unique.
    pub ticker: String,
    /// Display name.
    pub name: String,
    /// Balance-sheet classification.
    pub asset_class: AssetClass,
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Optional logo URL.
    pub logo_url: Option<String>,
}

/// Asset repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AssetRepository {
    db: DatabaseConnection,
}

impl AssetRepository {
    /// Creates a new asset repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all assets ordered by ticker.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<assets::Model>, AssetError> {
        let assets = assets::Entity::find()
            .order_by_asc(assets::Column::Ticker)
            .all(&self.db)
            .await?;
        Ok(assets)
    }

    /// Gets an asset by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset is not found or the query fails.
    pub async fn get(&self, id: AssetId) -> Result<assets::Model, AssetError> {
        let asset = assets::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| AssetError::NotFound(id.into_inner()))?;
        Ok(asset)
    }

    /// Creates a new asset.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticker is already in use or the insert fails.
    pub async fn create(&self, input: CreateAssetInput) -> Result<assets::Model, AssetError> {
        let existing = assets::Entity::find()
            .filter(assets::Column::Ticker.eq(input.ticker.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AssetError::DuplicateTicker(input.ticker));
        }

        let asset = assets::ActiveModel {
            id: Set(AssetId::new().into_inner()),
            ticker: Set(input.ticker),
            name: Set(input.name),
            asset_class: Set(input.asset_class),
            currency_code: Set(input.currency_code),
            is_active: Set(true),
            logo_url: Set(input.logo_url),
            created_at: Set(Utc::now().into()),
        };

        let result = asset.insert(&self.db).await?;
        Ok(result)
    }
}
