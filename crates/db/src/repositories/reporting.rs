//! Reporting repository: balance sheet and realized P/L aggregation.
//!
//! Aggregation queries run against the leg history; the grouping and
//! residual arithmetic live in `folio_core::metrics`.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use folio_core::ledger::round_money;
use folio_core::ledger::types::AssetClass as CoreAssetClass;
use folio_core::metrics::balance_sheet::{BalanceSheet, ClassValue, build_balance_sheet};
use folio_core::metrics::pnl::PnlBreakdown;

use crate::entities::{
    assets, daily_exchange_rates, daily_security_prices, debts, transaction_legs, transactions,
    sea_orm_active_enums::{AssetClass, DebtStatus, TransactionKind},
};

/// Error types for reporting operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportingError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Summed leg quantity per asset.
#[derive(Debug, FromQueryResult)]
struct HoldingRow {
    asset_id: Uuid,
    quantity: Decimal,
}

/// Reporting repository.
#[derive(Debug, Clone)]
pub struct ReportingRepository {
    db: DatabaseConnection,
    base_currency: String,
}

impl ReportingRepository {
    /// Creates a new reporting repository.
    ///
    /// `base_currency` is the reporting currency; holdings in other
    /// currencies are converted at the latest stored rate.
    #[must_use]
    pub const fn new(db: DatabaseConnection, base_currency: String) -> Self {
        Self { db, base_currency }
    }

    /// Builds the current balance sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn balance_sheet(&self) -> Result<BalanceSheet, ReportingError> {
        let holdings = self.class_values().await?;
        let debt_principal = self.active_debt_principal().await?;
        Ok(build_balance_sheet(&holdings, debt_principal))
    }

    /// Computes the realized P/L breakdown over a date range, inclusive.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn pnl(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PnlBreakdown, ReportingError> {
        let realized_gains = self.realized_gains(start, end).await?;
        let income = self
            .sum_legs(TransactionKind::Income, start, end, false)
            .await?;
        let dividends = self
            .sum_legs(TransactionKind::Dividend, start, end, false)
            .await?;
        let expenses = -self
            .sum_legs(TransactionKind::Expense, start, end, false)
            .await?;
        let interest_paid = self
            .sum_legs(TransactionKind::DebtPayment, start, end, true)
            .await?;

        Ok(PnlBreakdown {
            realized_gains,
            income,
            dividends,
            expenses,
            interest_paid,
        })
    }

    /// Values every held asset at the latest price and FX rate, grouped
    /// for the balance-sheet builder.
    async fn class_values(&self) -> Result<Vec<ClassValue>, ReportingError> {
        let rows: Vec<HoldingRow> = transaction_legs::Entity::find()
            .select_only()
            .column(transaction_legs::Column::AssetId)
            .column_as(transaction_legs::Column::Quantity.sum(), "quantity")
            .group_by(transaction_legs::Column::AssetId)
            .into_model()
            .all(&self.db)
            .await?;

        let asset_map: HashMap<Uuid, assets::Model> = assets::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let mut values = Vec::new();
        for row in rows {
            let Some(asset) = asset_map.get(&row.asset_id) else {
                continue;
            };
            let class: CoreAssetClass = asset.asset_class.clone().into();
            if !class.is_balance_sheet_asset() && class != CoreAssetClass::Liability {
                continue;
            }
            if row.quantity == Decimal::ZERO {
                continue;
            }

            let unit_value = if class.uses_tax_lots() {
                self.latest_price(row.asset_id).await?
            } else {
                Decimal::ONE
            };
            let fx = self.latest_fx(&asset.currency_code).await?;
            values.push(ClassValue {
                asset_class: class,
                value: round_money(row.quantity * unit_value * fx),
            });
        }

        Ok(values)
    }

    async fn active_debt_principal(&self) -> Result<Decimal, ReportingError> {
        let debts = debts::Entity::find()
            .filter(debts::Column::Status.eq(DebtStatus::Active))
            .all(&self.db)
            .await?;
        Ok(debts.iter().map(|d| d.remaining_principal).sum())
    }

    /// Latest stored price for an asset, zero when no price exists yet.
    async fn latest_price(&self, asset_id: Uuid) -> Result<Decimal, ReportingError> {
        let price = daily_security_prices::Entity::find()
            .filter(daily_security_prices::Column::AssetId.eq(asset_id))
            .order_by_desc(daily_security_prices::Column::PriceDate)
            .one(&self.db)
            .await?;
        Ok(price.map_or(Decimal::ZERO, |p| p.price))
    }

    /// Latest FX rate into the reporting currency, 1 for the base itself
    /// or when no rate is stored.
    async fn latest_fx(&self, currency_code: &str) -> Result<Decimal, ReportingError> {
        if currency_code == self.base_currency {
            return Ok(Decimal::ONE);
        }
        let rate = daily_exchange_rates::Entity::find()
            .filter(daily_exchange_rates::Column::CurrencyCode.eq(currency_code))
            .order_by_desc(daily_exchange_rates::Column::RateDate)
            .one(&self.db)
            .await?;
        Ok(rate.map_or(Decimal::ONE, |r| r.rate))
    }

    /// Sums the recorded realized gains of sells in the range.
    async fn realized_gains(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Decimal, ReportingError> {
        let sells = transactions::Entity::find()
            .filter(transactions::Column::Kind.eq(TransactionKind::Sell))
            .filter(transactions::Column::TransactionDate.gte(start))
            .filter(transactions::Column::TransactionDate.lte(end))
            .all(&self.db)
            .await?;
        Ok(sells.iter().filter_map(|t| t.realized_gain).sum())
    }

    /// Sums leg amounts of one kind over the range. `equity_side` selects
    /// the equity offset legs instead of the cash legs, which is how the
    /// interest portion of debt payments is recovered.
    async fn sum_legs(
        &self,
        kind: TransactionKind,
        start: NaiveDate,
        end: NaiveDate,
        equity_side: bool,
    ) -> Result<Decimal, ReportingError> {
        let mut query = transaction_legs::Entity::find()
            .join(
                JoinType::InnerJoin,
                transaction_legs::Relation::Transactions.def(),
            )
            .join(JoinType::InnerJoin, transaction_legs::Relation::Assets.def())
            .filter(transactions::Column::Kind.eq(kind))
            .filter(transactions::Column::TransactionDate.gte(start))
            .filter(transactions::Column::TransactionDate.lte(end));

        query = if equity_side {
            query.filter(assets::Column::AssetClass.eq(AssetClass::Equity))
        } else {
            query.filter(assets::Column::AssetClass.ne(AssetClass::Equity))
        };

        let total: Option<Option<Decimal>> = query
            .select_only()
            .column_as(transaction_legs::Column::Amount.sum(), "total")
            .into_tuple()
            .one(&self.db)
            .await?;

        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }
}
