//! Reporting routes: balance sheet, realized P/L, performance metrics,
//! and chart series.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::{AppState, routes::internal_error};
use folio_core::metrics::performance::{
    MonthlyReturn, SnapshotPoint, cagr_from_twr, monthly_returns, sharpe_ratio, twr, years_between,
};
use folio_core::metrics::sampling::{DEFAULT_THRESHOLD, downsample};
use folio_db::entities::daily_performance_snapshots;
use folio_db::repositories::reporting::ReportingRepository;
use folio_db::repositories::snapshot::SnapshotRepository;

/// Creates the reporting routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/balance-sheet", get(balance_sheet))
        .route("/reports/pnl", get(pnl))
        .route("/reports/metrics", get(metrics))
        .route("/reports/monthly-twr", get(monthly_twr))
        .route("/reports/equity-chart", get(equity_chart))
        .route("/reports/benchmark-chart", get(benchmark_chart))
}

/// Query parameters for date-ranged reports.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// Range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
}

/// Query parameters for chart series.
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// Range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Maximum number of points to return.
    pub threshold: Option<usize>,
}

/// Query parameters for the benchmark chart.
#[derive(Debug, Deserialize)]
pub struct BenchmarkQuery {
    /// Benchmark index symbol.
    pub symbol: Option<String>,
    /// Range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Maximum number of points to return.
    pub threshold: Option<usize>,
}

/// One point of the equity chart.
#[derive(Debug, Serialize)]
pub struct EquityChartPoint {
    /// Snapshot date.
    pub date: NaiveDate,
    /// Chained performance index.
    pub equity_index: Decimal,
    /// Net equity at end of day.
    pub net_equity_value: Decimal,
}

fn reporting_repo(state: &AppState) -> ReportingRepository {
    ReportingRepository::new(
        (*state.db).clone(),
        state.config.portfolio.base_currency.clone(),
    )
}

fn snapshot_repo(state: &AppState) -> SnapshotRepository {
    SnapshotRepository::new(
        (*state.db).clone(),
        state.config.portfolio.base_currency.clone(),
    )
}

fn to_point(model: &daily_performance_snapshots::Model) -> SnapshotPoint {
    SnapshotPoint {
        date: model.snapshot_date,
        net_equity_value: model.net_equity_value,
        net_cash_flow: model.net_cash_flow,
    }
}

/// GET `/reports/balance-sheet` - Current balance sheet.
async fn balance_sheet(State(state): State<AppState>) -> impl IntoResponse {
    match reporting_repo(&state).balance_sheet().await {
        Ok(sheet) => (StatusCode::OK, Json(sheet)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to build balance sheet");
            internal_error()
        }
    }
}

/// GET `/reports/pnl` - Realized P/L breakdown over a range.
async fn pnl(State(state): State<AppState>, Query(query): Query<RangeQuery>) -> impl IntoResponse {
    let start = query.from.unwrap_or(NaiveDate::MIN);
    let end = query.to.unwrap_or_else(|| Utc::now().date_naive());

    match reporting_repo(&state).pnl(start, end).await {
        Ok(breakdown) => {
            let total = breakdown.total();
            (
                StatusCode::OK,
                Json(json!({
                    "realized_gains": breakdown.realized_gains,
                    "income": breakdown.income,
                    "dividends": breakdown.dividends,
                    "expenses": breakdown.expenses,
                    "interest_paid": breakdown.interest_paid,
                    "total": total,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to compute P/L");
            internal_error()
        }
    }
}

/// GET `/reports/metrics` - TWR, CAGR, and Sharpe over a range.
async fn metrics(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    let snapshots = match snapshot_repo(&state).series(query.from, query.to).await {
        Ok(snapshots) => snapshots,
        Err(e) => {
            error!(error = %e, "Failed to read snapshot series");
            return internal_error();
        }
    };

    let points: Vec<SnapshotPoint> = snapshots.iter().map(to_point).collect();
    let twr_value = twr(&points);

    let (start_date, end_date) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (Some(first.date), Some(last.date)),
        _ => (None, None),
    };
    let years = match (start_date, end_date) {
        (Some(start), Some(end)) => years_between(start, end),
        _ => 0.0,
    };
    let cagr_value = cagr_from_twr(twr_value, years);

    let months = monthly_returns(&points);
    let monthly: Vec<f64> = months.iter().filter_map(|m| m.value.to_f64()).collect();
    let sharpe = sharpe_ratio(&monthly, state.config.portfolio.risk_free_rate);

    (
        StatusCode::OK,
        Json(json!({
            "twr": twr_value,
            "cagr": cagr_value,
            "sharpe_ratio": sharpe,
            "start_date": start_date,
            "end_date": end_date,
            "data_points": points.len(),
        })),
    )
        .into_response()
}

/// GET `/reports/monthly-twr` - Linked monthly returns over a range.
async fn monthly_twr(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    match snapshot_repo(&state).series(query.from, query.to).await {
        Ok(snapshots) => {
            let points: Vec<SnapshotPoint> = snapshots.iter().map(to_point).collect();
            let months: Vec<MonthlyReturn> = monthly_returns(&points);
            (StatusCode::OK, Json(json!({ "months": months }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to compute monthly returns");
            internal_error()
        }
    }
}

/// GET `/reports/equity-chart` - Downsampled equity index series.
async fn equity_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> impl IntoResponse {
    match snapshot_repo(&state).series(query.from, query.to).await {
        Ok(snapshots) => {
            let threshold = query.threshold.unwrap_or(DEFAULT_THRESHOLD);
            let sampled = downsample(&snapshots, threshold);
            let points: Vec<EquityChartPoint> = sampled
                .into_iter()
                .map(|s| EquityChartPoint {
                    date: s.snapshot_date,
                    equity_index: s.equity_index,
                    net_equity_value: s.net_equity_value,
                })
                .collect();
            (StatusCode::OK, Json(json!({ "points": points }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to read equity chart series");
            internal_error()
        }
    }
}

/// GET `/reports/benchmark-chart` - Downsampled benchmark index series.
async fn benchmark_chart(
    State(state): State<AppState>,
    Query(query): Query<BenchmarkQuery>,
) -> impl IntoResponse {
    let symbol = query.symbol.as_deref().unwrap_or("^KLSE");

    match snapshot_repo(&state)
        .benchmark_series(symbol, query.from, query.to)
        .await
    {
        Ok(series) => {
            let threshold = query.threshold.unwrap_or(DEFAULT_THRESHOLD);
            let sampled = downsample(&series, threshold);
            let points: Vec<_> = sampled
                .into_iter()
                .map(|row| json!({ "date": row.index_date, "close_value": row.close_value }))
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "symbol": symbol, "points": points })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to read benchmark series");
            internal_error()
        }
    }
}
