//! Debt listing routes.
//!
//! Debts are created by `borrow` transactions and updated by
//! `debt_payment` transactions; this surface is read-only.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, routes::internal_error};
use folio_core::ledger::types::DebtStatus;
use folio_db::entities::debts;
use folio_db::repositories::debt::DebtRepository;

/// Creates the debt routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/debts", get(list_debts))
}

/// Response for a debt.
#[derive(Debug, Serialize)]
pub struct DebtResponse {
    /// Debt ID.
    pub id: Uuid,
    /// Lender name.
    pub lender_name: String,
    /// Original principal.
    pub principal_amount: Decimal,
    /// Outstanding principal.
    pub remaining_principal: Decimal,
    /// Annual interest rate as a percentage.
    pub interest_rate: Decimal,
    /// Currency of the principal.
    pub currency_code: String,
    /// Loan start date.
    pub start_date: NaiveDate,
    /// Lifecycle status.
    pub status: DebtStatus,
}

impl From<debts::Model> for DebtResponse {
    fn from(model: debts::Model) -> Self {
        Self {
            id: model.id,
            lender_name: model.lender_name,
            principal_amount: model.principal_amount,
            remaining_principal: model.remaining_principal,
            interest_rate: model.interest_rate,
            currency_code: model.currency_code,
            start_date: model.start_date,
            status: model.status.into(),
        }
    }
}

/// GET `/debts` - List all debts, newest first.
async fn list_debts(State(state): State<AppState>) -> impl IntoResponse {
    let repo = DebtRepository::new((*state.db).clone());

    match repo.list().await {
        Ok(debts) => {
            let items: Vec<DebtResponse> = debts.into_iter().map(DebtResponse::from).collect();
            (StatusCode::OK, Json(json!({ "debts": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list debts");
            internal_error()
        }
    }
}
