//! Transaction posting and listing routes.
//!
//! Posting accepts the tagged request union, runs field validation, and
//! hands the request to the posting repository. Business-rule failures
//! surface with their machine-readable error codes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, routes::error_response, routes::internal_error};
use folio_core::ledger::{TransactionRequest, validate};
use folio_db::entities::{transaction_legs, transactions};
use folio_db::repositories::posting::{PostError, PostingRepository, TransactionFilter};
use folio_shared::types::{PageRequest, PageResponse};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route("/transactions/{transaction_id}", get(get_transaction))
}

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by transaction kind (snake_case name).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Filter by date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Filter by date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Response for a transaction list item.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Transaction kind, snake_case.
    #[serde(rename = "type")]
    pub kind: String,
    /// Description.
    pub description: String,
    /// Per-unit price for buy/sell.
    pub price: Option<Decimal>,
    /// Realized gain for sells.
    pub realized_gain: Option<Decimal>,
    /// Created at timestamp.
    pub created_at: String,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(model: transactions::Model) -> Self {
        let kind: folio_core::ledger::types::TransactionKind = model.kind.into();
        Self {
            id: model.id,
            transaction_date: model.transaction_date,
            kind: kind.as_str().to_string(),
            description: model.description,
            price: model.price,
            realized_gain: model.realized_gain,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// Response for a transaction leg.
#[derive(Debug, Serialize)]
pub struct LegResponse {
    /// Leg ID.
    pub id: Uuid,
    /// Account posted to.
    pub account_id: Uuid,
    /// Asset moved.
    pub asset_id: Uuid,
    /// Currency of the amount.
    pub currency_code: String,
    /// Signed unit change.
    pub quantity: Decimal,
    /// Signed value change.
    pub amount: Decimal,
}

impl From<transaction_legs::Model> for LegResponse {
    fn from(model: transaction_legs::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            asset_id: model.asset_id,
            currency_code: model.currency_code,
            quantity: model.quantity,
            amount: model.amount,
        }
    }
}

/// POST `/transactions` - Post a new transaction.
///
/// The body is deserialized in two steps so an unknown
/// `transaction_type` tag gets its own error code instead of the
/// generic extractor rejection.
async fn create_transaction(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let payload: TransactionRequest = match serde_json::from_value(body) {
        Ok(payload) => payload,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "INVALID_REQUEST_BODY",
                e.to_string(),
            );
        }
    };

    if let Err(validation) = validate(&payload) {
        let details: Vec<_> = validation
            .errors
            .iter()
            .map(|e| json!({ "field": e.field, "message": e.message }))
            .collect();
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "VALIDATION_FAILED",
                "message": validation.to_string(),
                "details": details,
            })),
        )
            .into_response();
    }

    let repo = PostingRepository::new((*state.db).clone());
    match repo.post(&payload).await {
        Ok(transaction) => {
            info!(transaction_id = %transaction.id, "transaction created");
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "transaction_id": transaction.id,
                })),
            )
                .into_response()
        }
        Err(PostError::Posting(e)) => {
            let status = StatusCode::from_u16(e.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error_response(status, e.error_code(), e.to_string())
        }
        Err(e) => {
            error!(error = %e, "Failed to post transaction");
            internal_error()
        }
    }
}

/// GET `/transactions` - List transactions with filters, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    let kind = match query.kind.as_deref().map(parse_kind) {
        Some(None) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                "Unknown transaction type",
            );
        }
        Some(parsed) => parsed,
        None => None,
    };

    let filter = TransactionFilter {
        kind,
        date_from: query.from,
        date_to: query.to,
    };
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(50),
    };

    let repo = PostingRepository::new((*state.db).clone());
    match repo.list(filter, &page).await {
        Ok(page) => {
            let response = PageResponse::new(
                page.data
                    .into_iter()
                    .map(TransactionResponse::from)
                    .collect(),
                page.meta.page,
                page.meta.per_page,
                page.meta.total,
            );
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list transactions");
            internal_error()
        }
    }
}

/// GET `/transactions/{transaction_id}` - Get a transaction with legs.
async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PostingRepository::new((*state.db).clone());

    match repo.get(transaction_id).await {
        Ok(found) => {
            let legs: Vec<LegResponse> = found.legs.into_iter().map(LegResponse::from).collect();
            let transaction = TransactionResponse::from(found.transaction);
            (
                StatusCode::OK,
                Json(json!({ "transaction": transaction, "legs": legs })),
            )
                .into_response()
        }
        Err(PostError::NotFound(id)) => error_response(
            StatusCode::NOT_FOUND,
            "TRANSACTION_NOT_FOUND",
            format!("Transaction not found: {id}"),
        ),
        Err(e) => {
            error!(error = %e, "Failed to get transaction");
            internal_error()
        }
    }
}

/// Parses a snake_case kind name into the database enum.
fn parse_kind(name: &str) -> Option<folio_db::entities::sea_orm_active_enums::TransactionKind> {
    serde_json::from_value(serde_json::Value::String(name.to_string())).ok()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("buy", true)]
    #[case("sell", true)]
    #[case("debt_payment", true)]
    #[case("split", true)]
    #[case("transfer", false)]
    #[case("BUY", false)]
    fn test_parse_kind_wire_names(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(parse_kind(name).is_some(), expected);
    }
}
