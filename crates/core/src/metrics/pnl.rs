//! Realized profit and loss over a date range.

use rust_decimal::Decimal;
use serde::Serialize;

/// Realized P/L components aggregated from posted transactions.
///
/// The repository sums each component from the leg and consumption
/// history; the total follows from the breakdown.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PnlBreakdown {
    /// Gains realized by lot consumptions (proceeds − basis − costs).
    pub realized_gains: Decimal,
    /// Income transaction inflows.
    pub income: Decimal,
    /// Dividend inflows.
    pub dividends: Decimal,
    /// Expense transaction outflows.
    pub expenses: Decimal,
    /// Interest portions of debt payments.
    pub interest_paid: Decimal,
}

impl PnlBreakdown {
    /// Total realized P/L for the period.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.realized_gains + self.income + self.dividends - self.expenses - self.interest_paid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_total_combines_components() {
        let pnl = PnlBreakdown {
            realized_gains: dec!(1000),
            income: dec!(200),
            dividends: dec!(50),
            expenses: dec!(300),
            interest_paid: dec!(25),
        };
        assert_eq!(pnl.total(), dec!(925));
    }

    #[test]
    fn test_default_is_zero() {
        assert_eq!(PnlBreakdown::default().total(), Decimal::ZERO);
    }

    #[test]
    fn test_losses_go_negative() {
        let pnl = PnlBreakdown {
            realized_gains: dec!(-500),
            expenses: dec!(100),
            ..Default::default()
        };
        assert_eq!(pnl.total(), dec!(-600));
    }
}
