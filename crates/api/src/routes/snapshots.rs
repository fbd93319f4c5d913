//! Snapshot generation routes.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::{AppState, routes::error_response, routes::internal_error};
use folio_db::repositories::snapshot::{SnapshotError, SnapshotRepository};

/// Creates the snapshot routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/snapshots/generate", post(generate_snapshots))
}

/// Request body for snapshot generation.
#[derive(Debug, Deserialize)]
pub struct GenerateSnapshotsRequest {
    /// Range start (YYYY-MM-DD), inclusive.
    pub start_date: NaiveDate,
    /// Range end (YYYY-MM-DD), inclusive.
    pub end_date: NaiveDate,
}

/// POST `/snapshots/generate` - Regenerate snapshots for a date range.
async fn generate_snapshots(
    State(state): State<AppState>,
    Json(payload): Json<GenerateSnapshotsRequest>,
) -> impl IntoResponse {
    let repo = SnapshotRepository::new(
        (*state.db).clone(),
        state.config.portfolio.base_currency.clone(),
    );

    match repo.generate(payload.start_date, payload.end_date).await {
        Ok(count) => (
            StatusCode::OK,
            Json(json!({ "success": true, "generated": count })),
        )
            .into_response(),
        Err(SnapshotError::InvalidRange { start, end }) => error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_RANGE",
            format!("Invalid range: {start} is after {end}"),
        ),
        Err(e) => {
            error!(error = %e, "Failed to generate snapshots");
            internal_error()
        }
    }
}
