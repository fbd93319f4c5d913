//! Daily performance snapshot derivation.
//!
//! The repository computes net equity and external cash flow per day from
//! the leg history and price feeds; this module chains the equity index
//! that the TWR and chart endpoints read.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::performance::subperiod_return;
use crate::ledger::round_money;

/// Base value of the chained equity index.
pub const BASE_EQUITY_INDEX: Decimal = Decimal::ONE_HUNDRED;

/// Per-day aggregates computed from the leg history.
#[derive(Debug, Clone)]
pub struct DayAggregate {
    /// The day.
    pub date: NaiveDate,
    /// Net equity at end of day (holdings at price/FX minus debt).
    pub net_equity_value: Decimal,
    /// External cash flow during the day (deposits − withdrawals).
    pub net_cash_flow: Decimal,
}

/// A derived snapshot row ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedSnapshot {
    /// The day.
    pub date: NaiveDate,
    /// Net equity at end of day.
    pub net_equity_value: Decimal,
    /// External cash flow during the day.
    pub net_cash_flow: Decimal,
    /// Chained performance index, starting from the base value.
    pub equity_index: Decimal,
}

/// Chains the equity index over a day series.
///
/// `prior` carries the last snapshot before the series, so regeneration
/// of a sub-range continues the existing chain; `None` starts the index
/// at [`BASE_EQUITY_INDEX`].
#[must_use]
pub fn chain_snapshots(
    days: &[DayAggregate],
    prior: Option<&DerivedSnapshot>,
) -> Vec<DerivedSnapshot> {
    let mut snapshots = Vec::with_capacity(days.len());
    let (mut prev_equity, mut index) = match prior {
        Some(p) => (p.net_equity_value, p.equity_index),
        None => (Decimal::ZERO, BASE_EQUITY_INDEX),
    };
    let mut first = prior.is_none();

    for day in days {
        if first {
            // The opening day anchors the chain at the base index.
            first = false;
        } else {
            let r = subperiod_return(prev_equity, day.net_equity_value, day.net_cash_flow);
            index = round_money(index * (Decimal::ONE + r));
        }
        snapshots.push(DerivedSnapshot {
            date: day.date,
            net_equity_value: day.net_equity_value,
            net_cash_flow: day.net_cash_flow,
            equity_index: index,
        });
        prev_equity = day.net_equity_value;
    }

    snapshots
}
