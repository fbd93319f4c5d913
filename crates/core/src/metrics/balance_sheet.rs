//! Balance-sheet aggregation: per-class subtotals grouped into assets,
//! liabilities, and equity.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::types::AssetClass;

/// Current value of all holdings in one asset class.
#[derive(Debug, Clone)]
pub struct ClassValue {
    /// The asset class.
    pub asset_class: AssetClass,
    /// Current value (quantity × latest price × latest FX).
    pub value: Decimal,
}

/// One subtotal line in a balance-sheet group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupLine {
    /// The class name, lowercase.
    #[serde(rename = "type")]
    pub kind: String,
    /// Subtotal for the class.
    pub total_amount: Decimal,
}

/// The balance sheet: assets, liabilities, and the equity residual.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheet {
    /// Asset-side subtotals by class.
    pub assets: Vec<GroupLine>,
    /// Sum of the asset side.
    pub total_assets: Decimal,
    /// Liability-side subtotals.
    pub liabilities: Vec<GroupLine>,
    /// Sum of the liability side.
    pub total_liabilities: Decimal,
    /// Equity lines (the net-worth residual).
    pub equity: Vec<GroupLine>,
    /// Assets minus liabilities.
    pub total_equity: Decimal,
}

/// Builds the balance sheet from per-class holding values and the total
/// outstanding principal of active debts.
///
/// Cash, stock, crypto, and fund classes form the asset side.
/// Liability-class holdings (absolute value) and active debt principal
/// form the liability side. Equity is the residual.
#[must_use]
pub fn build_balance_sheet(
    holdings: &[ClassValue],
    active_debt_principal: Decimal,
) -> BalanceSheet {
    let mut assets = Vec::new();
    let mut liabilities = Vec::new();

    for class in [
        AssetClass::Cash,
        AssetClass::Stock,
        AssetClass::Crypto,
        AssetClass::Fund,
    ] {
        let total: Decimal = holdings
            .iter()
            .filter(|h| h.asset_class == class)
            .map(|h| h.value)
            .sum();
        if total != Decimal::ZERO {
            assets.push(GroupLine {
                kind: class.as_str().to_string(),
                total_amount: total,
            });
        }
    }

    let liability_holdings: Decimal = holdings
        .iter()
        .filter(|h| h.asset_class == AssetClass::Liability)
        .map(|h| h.value.abs())
        .sum();
    if liability_holdings != Decimal::ZERO {
        liabilities.push(GroupLine {
            kind: AssetClass::Liability.as_str().to_string(),
            total_amount: liability_holdings,
        });
    }
    if active_debt_principal != Decimal::ZERO {
        liabilities.push(GroupLine {
            kind: "debt".to_string(),
            total_amount: active_debt_principal,
        });
    }

    let total_assets: Decimal = assets.iter().map(|line| line.total_amount).sum();
    let total_liabilities: Decimal = liabilities.iter().map(|line| line.total_amount).sum();
    let total_equity = total_assets - total_liabilities;

    BalanceSheet {
        assets,
        total_assets,
        liabilities,
        total_liabilities,
        equity: vec![GroupLine {
            kind: "equity".to_string(),
            total_amount: total_equity,
        }],
        total_equity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn holding(asset_class: AssetClass, value: Decimal) -> ClassValue {
        ClassValue { asset_class, value }
    }

    #[test]
    fn test_groups_and_totals() {
        let holdings = vec![
            holding(AssetClass::Cash, dec!(5000)),
            holding(AssetClass::Stock, dec!(12000)),
            holding(AssetClass::Stock, dec!(3000)),
            holding(AssetClass::Crypto, dec!(2000)),
            holding(AssetClass::Liability, dec!(-1500)),
        ];

        let sheet = build_balance_sheet(&holdings, dec!(4000));

        assert_eq!(sheet.assets.len(), 3);
        assert_eq!(sheet.assets[0].kind, "cash");
        assert_eq!(sheet.assets[1].total_amount, dec!(15000));
        assert_eq!(sheet.total_assets, dec!(22000));

        assert_eq!(sheet.liabilities.len(), 2);
        assert_eq!(sheet.liabilities[0].total_amount, dec!(1500));
        assert_eq!(sheet.liabilities[1].kind, "debt");
        assert_eq!(sheet.total_liabilities, dec!(5500));

        assert_eq!(sheet.total_equity, dec!(16500));
        assert_eq!(sheet.equity[0].total_amount, dec!(16500));
    }

    #[test]
    fn test_empty_classes_omitted() {
        let sheet = build_balance_sheet(&[holding(AssetClass::Cash, dec!(100))], Decimal::ZERO);
        assert_eq!(sheet.assets.len(), 1);
        assert!(sheet.liabilities.is_empty());
        assert_eq!(sheet.total_equity, dec!(100));
    }

    #[test]
    fn test_index_class_excluded() {
        let sheet = build_balance_sheet(
            &[holding(AssetClass::Index, dec!(999))],
            Decimal::ZERO,
        );
        assert!(sheet.assets.is_empty());
        assert_eq!(sheet.total_assets, Decimal::ZERO);
    }

    #[test]
    fn test_serialized_line_uses_type_key() {
        let sheet = build_balance_sheet(&[holding(AssetClass::Cash, dec!(100))], Decimal::ZERO);
        let json = serde_json::to_value(&sheet).unwrap();
        assert_eq!(json["assets"][0]["type"], "cash");
        assert_eq!(json["assets"][0]["total_amount"], "100");
    }
}
