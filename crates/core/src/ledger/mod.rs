//! Ledger domain: transaction requests, validation, description synthesis,
//! and the posting engine.
//!
//! The posting engine is pure. The db crate resolves referenced rows into a
//! [`PostingContext`], the engine turns a validated [`TransactionRequest`]
//! into a [`PostingPlan`], and the db crate commits the plan atomically.

pub mod description;
pub mod error;
pub mod lots;
pub mod posting;
pub mod types;
pub mod validation;

pub use error::PostingError;
pub use posting::PostingEngine;
pub use types::{PostingContext, PostingPlan, TransactionRequest};
pub use validation::{validate, FieldError, ValidationError};

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places used for monetary amounts.
pub const MONEY_SCALE: u32 = 4;

/// Rounds a monetary amount using Banker's Rounding (round half to even).
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_bankers() {
        // Round half to even at the 4th decimal place.
        assert_eq!(round_money(dec!(1.00005)), dec!(1.0000));
        assert_eq!(round_money(dec!(1.00015)), dec!(1.0002));
        assert_eq!(round_money(dec!(1.00004)), dec!(1.0000));
        assert_eq!(round_money(dec!(1.00006)), dec!(1.0001));
    }
}
