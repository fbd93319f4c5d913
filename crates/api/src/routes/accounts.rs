//! Account management routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, routes::error_response, routes::internal_error};
use folio_db::entities::{accounts, sea_orm_active_enums::AccountKind};
use folio_db::repositories::account::{AccountError, AccountRepository, CreateAccountInput};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts", post(create_account))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Display name, unique.
    pub name: String,
    /// Account kind: brokerage, bank, wallet, or conceptual.
    pub kind: AccountKind,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Account kind.
    pub kind: AccountKind,
    /// Whether the account accepts new postings.
    pub is_active: bool,
    /// Created at timestamp.
    pub created_at: DateTime<FixedOffset>,
}

impl From<accounts::Model> for AccountResponse {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            kind: model.kind,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

/// GET `/accounts` - List all accounts.
async fn list_accounts(State(state): State<AppState>) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.list().await {
        Ok(accounts) => {
            let items: Vec<AccountResponse> =
                accounts.into_iter().map(AccountResponse::from).collect();
            (StatusCode::OK, Json(json!({ "accounts": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list accounts");
            internal_error()
        }
    }
}

/// POST `/accounts` - Create a new account.
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", "Name is required");
    }

    let repo = AccountRepository::new((*state.db).clone());
    let input = CreateAccountInput {
        name: payload.name.trim().to_string(),
        kind: payload.kind,
    };

    match repo.create(input).await {
        Ok(account) => {
            info!(account_id = %account.id, "account created");
            (StatusCode::CREATED, Json(AccountResponse::from(account))).into_response()
        }
        Err(AccountError::DuplicateName(name)) => error_response(
            StatusCode::CONFLICT,
            "DUPLICATE_NAME",
            format!("Account name already in use: {name}"),
        ),
        Err(e) => {
            error!(error = %e, "Failed to create account");
            internal_error()
        }
    }
}
