//! Snapshot repository: derives and serves daily performance snapshots.
//!
//! Generation replays the leg history day by day, values the resulting
//! positions at the latest stored price and FX rate, and chains the
//! equity index through `folio_core::metrics::snapshot`. Regenerating a
//! sub-range continues the chain from the last snapshot before it.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use folio_core::ledger::round_money;
use folio_core::ledger::types::AssetClass as CoreAssetClass;
use folio_core::metrics::snapshot::{DayAggregate, DerivedSnapshot, chain_snapshots};

use crate::entities::{
    assets, daily_exchange_rates, daily_market_indices, daily_performance_snapshots,
    daily_security_prices, transaction_legs, transactions,
    sea_orm_active_enums::TransactionKind,
};

/// Error types for snapshot operations.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The requested range is inverted.
    #[error("Invalid range: {start} is after {end}")]
    InvalidRange {
        /// Range start.
        start: NaiveDate,
        /// Range end.
        end: NaiveDate,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A dated leg event used during history replay.
struct LegEvent {
    date: NaiveDate,
    kind: TransactionKind,
    asset_id: Uuid,
    quantity: Decimal,
    amount: Decimal,
}

/// Snapshot repository.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    db: DatabaseConnection,
    base_currency: String,
}

impl SnapshotRepository {
    /// Creates a new snapshot repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, base_currency: String) -> Self {
        Self { db, base_currency }
    }

    /// Regenerates the snapshots for `[start, end]`, inclusive.
    ///
    /// Existing rows in the range are replaced. Returns the number of
    /// snapshots written.
    ///
    /// # Errors
    ///
    /// Returns an error when the range is inverted or a database
    /// operation fails.
    pub async fn generate(&self, start: NaiveDate, end: NaiveDate) -> Result<usize, SnapshotError> {
        if start > end {
            return Err(SnapshotError::InvalidRange { start, end });
        }

        let events = self.load_leg_events(end).await?;
        let asset_map = self.load_assets().await?;
        let price_map = self.load_prices(end).await?;
        let fx_map = self.load_fx_rates(end).await?;
        let prior = self.find_prior(start).await?;

        let mut positions: HashMap<Uuid, Decimal> = HashMap::new();
        let mut cursor = 0;
        let mut days = Vec::new();

        for day in start.iter_days().take_while(|d| *d <= end) {
            let mut flow = Decimal::ZERO;
            while cursor < events.len() && events[cursor].date <= day {
                let event = &events[cursor];
                *positions.entry(event.asset_id).or_default() += event.quantity;

                // External flows: deposit and withdraw cash legs on the day.
                if event.date == day
                    && matches!(event.kind, TransactionKind::Deposit | TransactionKind::Withdraw)
                {
                    let is_equity_leg = asset_map
                        .get(&event.asset_id)
                        .is_some_and(|(class, _)| *class == CoreAssetClass::Equity);
                    if !is_equity_leg {
                        flow += event.amount;
                    }
                }
                cursor += 1;
            }

            let net_equity = value_positions(&positions, &asset_map, &price_map, &fx_map, day, &self.base_currency);
            days.push(DayAggregate {
                date: day,
                net_equity_value: net_equity,
                net_cash_flow: flow,
            });
        }

        let snapshots = chain_snapshots(&days, prior.as_ref());
        self.replace_range(start, end, &snapshots).await?;

        tracing::info!(%start, %end, count = snapshots.len(), "snapshots regenerated");
        Ok(snapshots.len())
    }

    /// Reads the snapshot series in a date range, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn series(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<daily_performance_snapshots::Model>, SnapshotError> {
        let mut query = daily_performance_snapshots::Entity::find();
        if let Some(start) = start {
            query = query.filter(daily_performance_snapshots::Column::SnapshotDate.gte(start));
        }
        if let Some(end) = end {
            query = query.filter(daily_performance_snapshots::Column::SnapshotDate.lte(end));
        }
        let snapshots = query
            .order_by_asc(daily_performance_snapshots::Column::SnapshotDate)
            .all(&self.db)
            .await?;
        Ok(snapshots)
    }

    /// Reads a benchmark index series, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn benchmark_series(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<daily_market_indices::Model>, SnapshotError> {
        let mut query = daily_market_indices::Entity::find()
            .filter(daily_market_indices::Column::Symbol.eq(symbol));
        if let Some(start) = start {
            query = query.filter(daily_market_indices::Column::IndexDate.gte(start));
        }
        if let Some(end) = end {
            query = query.filter(daily_market_indices::Column::IndexDate.lte(end));
        }
        let series = query
            .order_by_asc(daily_market_indices::Column::IndexDate)
            .all(&self.db)
            .await?;
        Ok(series)
    }

    /// Loads dated leg events up to `end`, oldest first.
    async fn load_leg_events(&self, end: NaiveDate) -> Result<Vec<LegEvent>, DbErr> {
        let rows = transaction_legs::Entity::find()
            .find_also_related(transactions::Entity)
            .filter(transactions::Column::TransactionDate.lte(end))
            .all(&self.db)
            .await?;

        let mut events: Vec<LegEvent> = rows
            .into_iter()
            .filter_map(|(leg, transaction)| {
                let transaction = transaction?;
                Some(LegEvent {
                    date: transaction.transaction_date,
                    kind: transaction.kind,
                    asset_id: leg.asset_id,
                    quantity: leg.quantity,
                    amount: leg.amount,
                })
            })
            .collect();
        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    async fn load_assets(&self) -> Result<HashMap<Uuid, (CoreAssetClass, String)>, DbErr> {
        let assets = assets::Entity::find().all(&self.db).await?;
        Ok(assets
            .into_iter()
            .map(|a| (a.id, (a.asset_class.into(), a.currency_code)))
            .collect())
    }

    async fn load_prices(
        &self,
        end: NaiveDate,
    ) -> Result<HashMap<Uuid, Vec<(NaiveDate, Decimal)>>, DbErr> {
        let prices = daily_security_prices::Entity::find()
            .filter(daily_security_prices::Column::PriceDate.lte(end))
            .order_by_asc(daily_security_prices::Column::PriceDate)
            .all(&self.db)
            .await?;

        let mut map: HashMap<Uuid, Vec<(NaiveDate, Decimal)>> = HashMap::new();
        for price in prices {
            map.entry(price.asset_id)
                .or_default()
                .push((price.price_date, price.price));
        }
        Ok(map)
    }

    async fn load_fx_rates(
        &self,
        end: NaiveDate,
    ) -> Result<HashMap<String, Vec<(NaiveDate, Decimal)>>, DbErr> {
        let rates = daily_exchange_rates::Entity::find()
            .filter(daily_exchange_rates::Column::RateDate.lte(end))
            .order_by_asc(daily_exchange_rates::Column::RateDate)
            .all(&self.db)
            .await?;

        let mut map: HashMap<String, Vec<(NaiveDate, Decimal)>> = HashMap::new();
        for rate in rates {
            map.entry(rate.currency_code)
                .or_default()
                .push((rate.rate_date, rate.rate));
        }
        Ok(map)
    }

    /// Finds the last snapshot before `start`, for chain continuation.
    async fn find_prior(&self, start: NaiveDate) -> Result<Option<DerivedSnapshot>, DbErr> {
        let prior = daily_performance_snapshots::Entity::find()
            .filter(daily_performance_snapshots::Column::SnapshotDate.lt(start))
            .order_by_desc(daily_performance_snapshots::Column::SnapshotDate)
            .one(&self.db)
            .await?;

        Ok(prior.map(|m| DerivedSnapshot {
            date: m.snapshot_date,
            net_equity_value: m.net_equity_value,
            net_cash_flow: m.net_cash_flow,
            equity_index: m.equity_index,
        }))
    }

    /// Replaces the snapshot rows in the range atomically.
    async fn replace_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        snapshots: &[DerivedSnapshot],
    ) -> Result<(), DbErr> {
        let txn = self.db.begin().await?;

        daily_performance_snapshots::Entity::delete_many()
            .filter(daily_performance_snapshots::Column::SnapshotDate.between(start, end))
            .exec(&txn)
            .await?;

        let now = chrono::Utc::now().into();
        for snapshot in snapshots {
            daily_performance_snapshots::ActiveModel {
                id: Set(Uuid::now_v7()),
                snapshot_date: Set(snapshot.date),
                net_equity_value: Set(snapshot.net_equity_value),
                net_cash_flow: Set(snapshot.net_cash_flow),
                equity_index: Set(snapshot.equity_index),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

/// Values the current positions at the last known price and FX rate on
/// or before `day`. Equity and index holdings are excluded.
fn value_positions(
    positions: &HashMap<Uuid, Decimal>,
    asset_map: &HashMap<Uuid, (CoreAssetClass, String)>,
    price_map: &HashMap<Uuid, Vec<(NaiveDate, Decimal)>>,
    fx_map: &HashMap<String, Vec<(NaiveDate, Decimal)>>,
    day: NaiveDate,
    base_currency: &str,
) -> Decimal {
    let mut net_equity = Decimal::ZERO;

    for (asset_id, quantity) in positions {
        if quantity.is_zero() {
            continue;
        }
        let Some((class, currency)) = asset_map.get(asset_id) else {
            continue;
        };
        if *class == CoreAssetClass::Equity || *class == CoreAssetClass::Index {
            continue;
        }

        let unit_value = if class.uses_tax_lots() {
            last_at_or_before(price_map.get(asset_id), day).unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ONE
        };
        let fx = if currency == base_currency {
            Decimal::ONE
        } else {
            last_at_or_before(fx_map.get(currency), day).unwrap_or(Decimal::ONE)
        };

        net_equity += round_money(*quantity * unit_value * fx);
    }

    net_equity
}

/// Last value in a date-sorted series at or before `day`.
fn last_at_or_before(series: Option<&Vec<(NaiveDate, Decimal)>>, day: NaiveDate) -> Option<Decimal> {
    let series = series?;
    let idx = series.partition_point(|(date, _)| *date <= day);
    if idx == 0 {
        None
    } else {
        Some(series[idx - 1].1)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_last_at_or_before_picks_latest_value() {
        let series = vec![
            (date(2026, 1, 1), dec!(10)),
            (date(2026, 1, 5), dec!(12)),
            (date(2026, 1, 9), dec!(11)),
        ];

        assert_eq!(last_at_or_before(Some(&series), date(2026, 1, 4)), Some(dec!(10)));
        assert_eq!(last_at_or_before(Some(&series), date(2026, 1, 5)), Some(dec!(12)));
        assert_eq!(last_at_or_before(Some(&series), date(2026, 2, 1)), Some(dec!(11)));
        assert_eq!(last_at_or_before(Some(&series), date(2025, 12, 31)), None);
        assert_eq!(last_at_or_before(None, date(2026, 1, 1)), None);
    }

    #[test]
    fn test_value_positions_skips_offset_classes() {
        let stock_id = Uuid::now_v7();
        let equity_id = Uuid::now_v7();
        let cash_id = Uuid::now_v7();

        let positions = HashMap::from([
            (stock_id, dec!(100)),
            (equity_id, dec!(-5000)),
            (cash_id, dec!(2500)),
        ]);
        let asset_map = HashMap::from([
            (stock_id, (CoreAssetClass::Stock, "MYR".to_string())),
            (equity_id, (CoreAssetClass::Equity, "MYR".to_string())),
            (cash_id, (CoreAssetClass::Cash, "MYR".to_string())),
        ]);
        let price_map = HashMap::from([(stock_id, vec![(date(2026, 1, 1), dec!(10.50))])]);
        let fx_map = HashMap::new();

        let value = value_positions(
            &positions,
            &asset_map,
            &price_map,
            &fx_map,
            date(2026, 1, 2),
            "MYR",
        );

        // 100 * 10.50 + 2500 cash, the equity offset never counts.
        assert_eq!(value, dec!(3550));
    }

    #[test]
    fn test_value_positions_applies_fx_rate() {
        let cash_id = Uuid::now_v7();

        let positions = HashMap::from([(cash_id, dec!(1000))]);
        let asset_map = HashMap::from([(cash_id, (CoreAssetClass::Cash, "USD".to_string()))]);
        let fx_map = HashMap::from([(
            "USD".to_string(),
            vec![(date(2026, 1, 1), dec!(4.20)), (date(2026, 1, 8), dec!(4.30))],
        )]);

        let value = value_positions(
            &positions,
            &asset_map,
            &HashMap::new(),
            &fx_map,
            date(2026, 1, 5),
            "MYR",
        );

        assert_eq!(value, dec!(4200));
    }

    #[test]
    fn test_value_positions_stock_without_price_is_zero() {
        let stock_id = Uuid::now_v7();

        let positions = HashMap::from([(stock_id, dec!(50))]);
        let asset_map = HashMap::from([(stock_id, (CoreAssetClass::Stock, "MYR".to_string()))]);

        let value = value_positions(
            &positions,
            &asset_map,
            &HashMap::new(),
            &HashMap::new(),
            date(2026, 1, 1),
            "MYR",
        );

        assert_eq!(value, Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn prop_last_at_or_before_matches_linear_scan(
            offsets in proptest::collection::vec(0i64..400, 1..20),
            probe in 0i64..400,
        ) {
            let base = date(2026, 1, 1);
            let mut days: Vec<i64> = offsets;
            days.sort_unstable();
            days.dedup();

            let series: Vec<(NaiveDate, Decimal)> = days
                .iter()
                .map(|d| (base + chrono::Days::new(u64::try_from(*d).unwrap()), Decimal::from(*d)))
                .collect();
            let probe_day = base + chrono::Days::new(u64::try_from(probe).unwrap());

            let expected = series
                .iter()
                .rev()
                .find(|(d, _)| *d <= probe_day)
                .map(|(_, v)| *v);

            prop_assert_eq!(last_at_or_before(Some(&series), probe_day), expected);
        }
    }
}
