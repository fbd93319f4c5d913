//! Request validation, applied before any posting is attempted.
//!
//! Pure function over the tagged request. Type and date shape are already
//! enforced by deserialization; this layer checks the numeric and textual
//! rules and reports every violated field at once.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::TransactionRequest;

/// A single violated field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    /// The offending field name.
    pub field: &'static str,
    /// Why the field was rejected.
    pub message: String,
}

/// Validation failure carrying every violated field.
#[derive(Debug, Error)]
#[error("Validation failed: {}", self.summary())]
pub struct ValidationError {
    /// All violated fields.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn new() -> Self {
        Self { errors: Vec::new() }
    }

    fn positive(&mut self, field: &'static str, value: Decimal) {
        if value <= Decimal::ZERO {
            self.errors.push(FieldError {
                field,
                message: "must be greater than zero".to_string(),
            });
        }
    }

    fn non_negative(&mut self, field: &'static str, value: Decimal) {
        if value < Decimal::ZERO {
            self.errors.push(FieldError {
                field,
                message: "must not be negative".to_string(),
            });
        }
    }

    fn non_empty(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.errors.push(FieldError {
                field,
                message: "must not be empty".to_string(),
            });
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

/// Validates a transaction request.
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every violated field.
pub fn validate(request: &TransactionRequest) -> Result<(), ValidationError> {
    let mut check = Checker::new();

    match request {
        TransactionRequest::Deposit { quantity, .. }
        | TransactionRequest::Withdraw { quantity, .. }
        | TransactionRequest::Income { quantity, .. }
        | TransactionRequest::Expense { quantity, .. }
        | TransactionRequest::Dividend { quantity, .. } => {
            check.positive("quantity", *quantity);
        }
        TransactionRequest::Buy {
            quantity,
            price,
            fees,
            ..
        } => {
            check.positive("quantity", *quantity);
            check.non_negative("price", *price);
            check.non_negative("fees", *fees);
        }
        TransactionRequest::Sell {
            quantity,
            price,
            fees,
            taxes,
            ..
        } => {
            check.positive("quantity", *quantity);
            check.non_negative("price", *price);
            check.non_negative("fees", *fees);
            check.non_negative("taxes", *taxes);
        }
        TransactionRequest::Borrow {
            lender,
            principal,
            interest_rate,
            ..
        } => {
            check.non_empty("lender", lender);
            check.positive("principal", *principal);
            check.non_negative("interest_rate", *interest_rate);
        }
        TransactionRequest::DebtPayment {
            principal_payment,
            interest_payment,
            ..
        } => {
            check.positive("principal_payment", *principal_payment);
            check.non_negative("interest_payment", *interest_payment);
        }
        TransactionRequest::Split { split_quantity, .. } => {
            check.positive("split_quantity", *split_quantity);
        }
    }

    check.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use folio_shared::types::{AccountId, AssetId, DebtId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn buy(quantity: Decimal, price: Decimal, fees: Decimal) -> TransactionRequest {
        TransactionRequest::Buy {
            transaction_date: date(),
            account: AccountId::new(),
            asset: AssetId::new(),
            cash_asset_id: AssetId::new(),
            quantity,
            price,
            fees,
            description: None,
        }
    }

    #[test]
    fn test_valid_buy() {
        assert!(validate(&buy(dec!(10), dec!(150), dec!(1.5))).is_ok());
    }

    #[test]
    fn test_buy_negative_price_reports_field() {
        let err = validate(&buy(dec!(10), dec!(-1), Decimal::ZERO)).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].field, "price");
    }

    #[test]
    fn test_buy_zero_price_allowed() {
        assert!(validate(&buy(dec!(10), Decimal::ZERO, Decimal::ZERO)).is_ok());
    }

    #[test]
    fn test_buy_collects_all_violations() {
        let err = validate(&buy(dec!(0), dec!(-1), dec!(-2))).unwrap_err();
        let fields: Vec<_> = err.errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["quantity", "price", "fees"]);
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-5))]
    fn test_deposit_rejects_non_positive_quantity(#[case] quantity: Decimal) {
        let req = TransactionRequest::Deposit {
            transaction_date: date(),
            account: AccountId::new(),
            asset: AssetId::new(),
            quantity,
            description: None,
        };
        let err = validate(&req).unwrap_err();
        assert_eq!(err.errors[0].field, "quantity");
    }

    #[test]
    fn test_borrow_requires_lender() {
        let req = TransactionRequest::Borrow {
            transaction_date: date(),
            lender: "  ".to_string(),
            principal: dec!(1000),
            interest_rate: dec!(4.5),
            deposit_account: AccountId::new(),
            asset: AssetId::new(),
            description: None,
        };
        let err = validate(&req).unwrap_err();
        assert_eq!(err.errors[0].field, "lender");
    }

    #[test]
    fn test_borrow_zero_interest_rate_allowed() {
        let req = TransactionRequest::Borrow {
            transaction_date: date(),
            lender: "Maybank".to_string(),
            principal: dec!(1000),
            interest_rate: Decimal::ZERO,
            deposit_account: AccountId::new(),
            asset: AssetId::new(),
            description: None,
        };
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_debt_payment_rules() {
        let req = TransactionRequest::DebtPayment {
            transaction_date: date(),
            debt: DebtId::new(),
            from_account: AccountId::new(),
            principal_payment: Decimal::ZERO,
            interest_payment: dec!(-1),
            asset: AssetId::new(),
            description: None,
        };
        let err = validate(&req).unwrap_err();
        let fields: Vec<_> = err.errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["principal_payment", "interest_payment"]);
    }

    #[test]
    fn test_split_requires_positive_quantity() {
        let req = TransactionRequest::Split {
            transaction_date: date(),
            asset: AssetId::new(),
            split_quantity: dec!(0),
            description: None,
        };
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_validation_error_display_lists_fields() {
        let err = validate(&buy(dec!(0), dec!(-1), Decimal::ZERO)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("quantity"));
        assert!(msg.contains("price"));
    }
}
