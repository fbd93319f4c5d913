//! Tax-lot arithmetic: FIFO consumption and split cost-basis
//! redistribution.
//!
//! A lot's `cost_basis` is the cost of its remaining quantity. Consumption
//! removes a proportional cost share; split redistribution rewrites every
//! open lot's basis in proportion to remaining quantity while preserving
//! the aggregate.

use rust_decimal::Decimal;

use super::error::PostingError;
use super::round_money;
use super::types::{LotAdjustment, OpenLot};
use folio_shared::types::TaxLotId;

/// One lot drawdown produced by FIFO consumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawdown {
    /// The consumed lot.
    pub tax_lot_id: TaxLotId,
    /// Units taken from this lot.
    pub quantity: Decimal,
    /// Proportional cost share of the units taken.
    pub cost: Decimal,
}

/// Consumes open lots oldest-acquisition-first until `quantity` is fully
/// allocated.
///
/// # Errors
///
/// Returns [`PostingError::InsufficientLots`] when the total remaining
/// quantity across all lots is less than `quantity`. No partial result is
/// produced.
pub fn consume_fifo(lots: &[OpenLot], quantity: Decimal) -> Result<Vec<Drawdown>, PostingError> {
    let available: Decimal = lots.iter().map(|l| l.remaining_quantity).sum();
    if available < quantity {
        return Err(PostingError::InsufficientLots {
            requested: quantity,
            available,
        });
    }

    let mut ordered: Vec<&OpenLot> = lots
        .iter()
        .filter(|l| l.remaining_quantity > Decimal::ZERO)
        .collect();
    ordered.sort_by_key(|l| (l.creation_date, l.id.into_inner()));

    let mut drawdowns = Vec::new();
    let mut outstanding = quantity;

    for lot in ordered {
        if outstanding == Decimal::ZERO {
            break;
        }

        let taken = outstanding.min(lot.remaining_quantity);
        // Exact basis when the lot is exhausted, so no residue is stranded.
        let cost = if taken == lot.remaining_quantity {
            lot.cost_basis
        } else {
            round_money(lot.cost_basis * taken / lot.remaining_quantity)
        };

        drawdowns.push(Drawdown {
            tax_lot_id: lot.id,
            quantity: taken,
            cost,
        });
        outstanding -= taken;
    }

    Ok(drawdowns)
}

/// Redistributes the aggregate cost basis of `lots` in proportion to each
/// lot's remaining quantity. The last lot absorbs the rounding remainder so
/// the aggregate is preserved exactly.
///
/// Input tuples are `(lot_id, remaining_quantity, cost_basis)`.
#[must_use]
pub fn redistribute_cost_basis(lots: &[(TaxLotId, Decimal, Decimal)]) -> Vec<LotAdjustment> {
    let total_quantity: Decimal = lots.iter().map(|(_, q, _)| *q).sum();
    if total_quantity <= Decimal::ZERO {
        return Vec::new();
    }
    let total_cost: Decimal = lots.iter().map(|(_, _, c)| *c).sum();

    let mut adjustments = Vec::with_capacity(lots.len());
    let mut allocated = Decimal::ZERO;

    for (index, (id, quantity, _)) in lots.iter().enumerate() {
        let new_cost_basis = if index + 1 == lots.len() {
            total_cost - allocated
        } else {
            round_money(total_cost * *quantity / total_quantity)
        };
        allocated += new_cost_basis;
        adjustments.push(LotAdjustment {
            tax_lot_id: *id,
            new_cost_basis,
        });
    }

    adjustments
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use folio_shared::types::AssetId;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn lot(day: u32, remaining: Decimal, cost: Decimal) -> OpenLot {
        OpenLot {
            id: TaxLotId::new(),
            asset_id: AssetId::new(),
            creation_date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            original_quantity: remaining,
            remaining_quantity: remaining,
            cost_basis: cost,
        }
    }

    #[test]
    fn test_fifo_consumes_oldest_first() {
        let newer = lot(20, dec!(10), dec!(2000));
        let older = lot(5, dec!(10), dec!(1000));
        // Passed out of order on purpose.
        let drawdowns = consume_fifo(&[newer.clone(), older.clone()], dec!(15)).unwrap();

        assert_eq!(drawdowns.len(), 2);
        assert_eq!(drawdowns[0].tax_lot_id, older.id);
        assert_eq!(drawdowns[0].quantity, dec!(10));
        assert_eq!(drawdowns[0].cost, dec!(1000));
        assert_eq!(drawdowns[1].tax_lot_id, newer.id);
        assert_eq!(drawdowns[1].quantity, dec!(5));
        assert_eq!(drawdowns[1].cost, dec!(1000));
    }

    #[test]
    fn test_fifo_partial_lot_cost_share() {
        let l = lot(1, dec!(8), dec!(100));
        let drawdowns = consume_fifo(&[l], dec!(2)).unwrap();
        assert_eq!(drawdowns[0].cost, dec!(25));
    }

    #[test]
    fn test_fifo_insufficient_lots() {
        let l = lot(1, dec!(5), dec!(500));
        let result = consume_fifo(&[l], dec!(6));
        assert!(matches!(
            result,
            Err(PostingError::InsufficientLots {
                requested,
                available
            }) if requested == dec!(6) && available == dec!(5)
        ));
    }

    #[test]
    fn test_fifo_exact_exhaustion() {
        let l = lot(1, dec!(3), dec!(99.99));
        let drawdowns = consume_fifo(&[l], dec!(3)).unwrap();
        assert_eq!(drawdowns[0].cost, dec!(99.99));
    }

    #[test]
    fn test_fifo_skips_empty_lots() {
        let mut empty = lot(1, dec!(0), dec!(0));
        empty.original_quantity = dec!(10);
        let open = lot(2, dec!(5), dec!(500));
        let drawdowns = consume_fifo(&[empty, open.clone()], dec!(5)).unwrap();
        assert_eq!(drawdowns.len(), 1);
        assert_eq!(drawdowns[0].tax_lot_id, open.id);
    }

    #[test]
    fn test_redistribution_preserves_aggregate() {
        let a = TaxLotId::new();
        let b = TaxLotId::new();
        let split = TaxLotId::new();
        let lots = vec![
            (a, dec!(10), dec!(1000)),
            (b, dec!(20), dec!(2600)),
            (split, dec!(30), dec!(0)),
        ];
        let adjustments = redistribute_cost_basis(&lots);

        let total: Decimal = adjustments.iter().map(|adj| adj.new_cost_basis).sum();
        assert_eq!(total, dec!(3600));
        assert_eq!(adjustments[0].new_cost_basis, dec!(600));
        assert_eq!(adjustments[1].new_cost_basis, dec!(1200));
        assert_eq!(adjustments[2].new_cost_basis, dec!(1800));
    }

    #[test]
    fn test_redistribution_empty_position() {
        assert!(redistribute_cost_basis(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_fifo_allocates_exact_quantity(
            quantities in prop::collection::vec(1u32..10_000, 1..8),
            sell_permille in 1u32..=1000,
        ) {
            let lots: Vec<OpenLot> = quantities
                .iter()
                .enumerate()
                .map(|(i, q)| {
                    let qty = Decimal::from(*q);
                    let mut l = lot(1, qty, qty * dec!(1.5));
                    l.creation_date =
                        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
                            + chrono::Days::new(i as u64);
                    l
                })
                .collect();

            let available: Decimal = lots.iter().map(|l| l.remaining_quantity).sum();
            let sell = round_money(available * Decimal::from(sell_permille) / dec!(1000))
                .max(Decimal::ONE)
                .min(available);

            let drawdowns = consume_fifo(&lots, sell).unwrap();
            let allocated: Decimal = drawdowns.iter().map(|d| d.quantity).sum();
            prop_assert_eq!(allocated, sell);

            // No lot is drawn below zero.
            for d in &drawdowns {
                let l = lots.iter().find(|l| l.id == d.tax_lot_id).unwrap();
                prop_assert!(d.quantity <= l.remaining_quantity);
                prop_assert!(d.quantity > Decimal::ZERO);
            }
        }

        #[test]
        fn prop_redistribution_preserves_aggregate_cost(
            entries in prop::collection::vec((1u32..10_000, 0u32..1_000_000), 1..8),
        ) {
            let lots: Vec<(TaxLotId, Decimal, Decimal)> = entries
                .iter()
                .map(|(q, c)| {
                    (
                        TaxLotId::new(),
                        Decimal::from(*q),
                        Decimal::new(i64::from(*c), 2),
                    )
                })
                .collect();

            let total_before: Decimal = lots.iter().map(|(_, _, c)| *c).sum();
            let adjustments = redistribute_cost_basis(&lots);
            let total_after: Decimal =
                adjustments.iter().map(|adj| adj.new_cost_basis).sum();
            prop_assert_eq!(total_before, total_after);
        }
    }
}
