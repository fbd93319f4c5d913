//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::AppState;

pub mod accounts;
pub mod assets;
pub mod debts;
pub mod health;
pub mod reports;
pub mod snapshots;
pub mod transactions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(assets::routes())
        .merge(debts::routes())
        .merge(transactions::routes())
        .merge(reports::routes())
        .merge(snapshots::routes())
}

/// Builds an error response with a machine-readable code.
pub(crate) fn error_response(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Builds the generic 500 response. The cause is logged at the call site.
pub(crate) fn internal_error() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An error occurred",
    )
}
