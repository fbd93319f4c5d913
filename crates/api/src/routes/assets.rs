//! Asset management routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, routes::error_response, routes::internal_error};
use folio_core::ledger::types::AssetClass;
use folio_db::entities::assets;
use folio_db::repositories::asset::{AssetError, AssetRepository, CreateAssetInput};

/// Creates the asset routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assets", get(list_assets))
        .route("/assets", post(create_asset))
}

/// Request body for creating an asset.
///
/// The `asset_class` field accepts the lowercase class names, including
/// the `epf` alias for funds.
#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
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

/// Response for an asset.
#[derive(Debug, Serialize)]
pub struct AssetResponse {
    /// Asset ID.
    pub id: Uuid,
    /// Ticker symbol.
    pub ticker: String,
    /// Display name.
    pub name: String,
    /// Balance-sheet classification, lowercase.
    pub asset_class: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Whether the asset accepts new postings.
    pub is_active: bool,
    /// Optional logo URL.
    pub logo_url: Option<String>,
}

impl From<assets::Model> for AssetResponse {
    fn from(model: assets::Model) -> Self {
        let class: AssetClass = model.asset_class.into();
        Self {
            id: model.id,
            ticker: model.ticker,
            name: model.name,
            asset_class: class.as_str().to_string(),
            currency_code: model.currency_code,
            is_active: model.is_active,
            logo_url: model.logo_url,
        }
    }
}

/// GET `/assets` - List all assets.
async fn list_assets(State(state): State<AppState>) -> impl IntoResponse {
    let repo = AssetRepository::new((*state.db).clone());

    match repo.list().await {
        Ok(assets) => {
            let items: Vec<AssetResponse> = assets.into_iter().map(AssetResponse::from).collect();
            (StatusCode::OK, Json(json!({ "assets": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list assets");
            internal_error()
        }
    }
}

/// POST `/assets` - Create a new asset.
async fn create_asset(
    State(state): State<AppState>,
    Json(payload): Json<CreateAssetRequest>,
) -> impl IntoResponse {
    if payload.ticker.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            "Ticker is required",
        );
    }
    if payload.currency_code.len() != 3 {
        return error_response(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            "Currency code must be a 3-letter ISO code",
        );
    }

    let repo = AssetRepository::new((*state.db).clone());
    let input = CreateAssetInput {
        ticker: payload.ticker.trim().to_string(),
        name: payload.name,
        asset_class: payload.asset_class.into(),
        currency_code: payload.currency_code.to_uppercase(),
        logo_url: payload.logo_url,
    };

    match repo.create(input).await {
        Ok(asset) => {
            info!(asset_id = %asset.id, ticker = %asset.ticker, "asset created");
            (StatusCode::CREATED, Json(AssetResponse::from(asset))).into_response()
        }
        Err(AssetError::DuplicateTicker(ticker)) => error_response(
            StatusCode::CONFLICT,
            "DUPLICATE_TICKER",
            format!("Ticker already in use: {ticker}"),
        ),
        Err(e) => {
            error!(error = %e, "Failed to create asset");
            internal_error()
        }
    }
}
