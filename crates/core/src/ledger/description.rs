//! Description synthesis for requests submitted without a memo.
//!
//! Synthesis resolves names through the posting context; a missing
//! reference fails the whole request rather than degrading the memo.

use super::error::PostingError;
use super::types::{AccountRef, AssetRef, DebtRef, PostingContext, TransactionRequest};
use folio_shared::types::{AccountId, AssetId, DebtId};

fn account<'a>(
    ctx: &'a PostingContext,
    id: AccountId,
) -> Result<&'a AccountRef, PostingError> {
    ctx.account
        .as_ref()
        .filter(|a| a.id == id)
        .ok_or(PostingError::AccountNotFound(id))
}

fn asset<'a>(ctx: &'a PostingContext, id: AssetId) -> Result<&'a AssetRef, PostingError> {
    ctx.asset
        .as_ref()
        .filter(|a| a.id == id)
        .ok_or(PostingError::AssetNotFound(id))
}

fn dividend_asset<'a>(
    ctx: &'a PostingContext,
    id: AssetId,
) -> Result<&'a AssetRef, PostingError> {
    ctx.dividend_asset
        .as_ref()
        .filter(|a| a.id == id)
        .ok_or(PostingError::AssetNotFound(id))
}

fn debt<'a>(ctx: &'a PostingContext, id: DebtId) -> Result<&'a DebtRef, PostingError> {
    ctx.debt
        .as_ref()
        .filter(|d| d.id == id)
        .ok_or(PostingError::DebtNotFound(id))
}

/// Synthesizes the default memo for a request.
///
/// # Errors
///
/// Returns a lookup error when a referenced account, asset, or debt is
/// not present in the context.
pub fn synthesize(
    request: &TransactionRequest,
    ctx: &PostingContext,
) -> Result<String, PostingError> {
    let text = match request {
        TransactionRequest::Deposit { account: id, .. } => {
            format!("Deposit to {}", account(ctx, *id)?.name)
        }
        TransactionRequest::Withdraw { account: id, .. } => {
            format!("Withdrawal from {}", account(ctx, *id)?.name)
        }
        TransactionRequest::Income { account: id, .. } => {
            format!("Income to {}", account(ctx, *id)?.name)
        }
        TransactionRequest::Expense { account: id, .. } => {
            format!("Expense from {}", account(ctx, *id)?.name)
        }
        TransactionRequest::Buy {
            asset: asset_id,
            quantity,
            price,
            ..
        } => {
            format!(
                "Buy {} {} at {}",
                quantity,
                asset(ctx, *asset_id)?.ticker,
                price
            )
        }
        TransactionRequest::Sell {
            asset: asset_id,
            quantity,
            price,
            ..
        } => {
            format!(
                "Sell {} {} at {}",
                quantity,
                asset(ctx, *asset_id)?.ticker,
                price
            )
        }
        TransactionRequest::Dividend {
            account: account_id,
            dividend_asset: source_id,
            ..
        } => {
            format!(
                "Dividend from {} to {}",
                dividend_asset(ctx, *source_id)?.ticker,
                account(ctx, *account_id)?.name
            )
        }
        TransactionRequest::Borrow {
            lender,
            interest_rate,
            ..
        } => {
            format!("Loan from {lender} at {interest_rate}% p.a")
        }
        TransactionRequest::DebtPayment {
            debt: debt_id,
            from_account,
            ..
        } => {
            format!(
                "Debt payment to {} from {}",
                debt(ctx, *debt_id)?.lender_name,
                account(ctx, *from_account)?.name
            )
        }
        TransactionRequest::Split { asset: asset_id, .. } => {
            format!("Stock split for {}", asset(ctx, *asset_id)?.ticker)
        }
    };

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{AssetClass, DebtStatus};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn ctx_with_account(name: &str) -> (PostingContext, AccountId) {
        let id = AccountId::new();
        let ctx = PostingContext {
            account: Some(AccountRef {
                id,
                name: name.to_string(),
                is_active: true,
            }),
            ..Default::default()
        };
        (ctx, id)
    }

    #[test]
    fn test_deposit_template() {
        let (ctx, account) = ctx_with_account("Main Brokerage");
        let req = TransactionRequest::Deposit {
            transaction_date: date(),
            account,
            asset: AssetId::new(),
            quantity: dec!(1000),
            description: None,
        };
        assert_eq!(synthesize(&req, &ctx).unwrap(), "Deposit to Main Brokerage");
    }

    #[test]
    fn test_buy_template() {
        let asset_id = AssetId::new();
        let ctx = PostingContext {
            asset: Some(AssetRef {
                id: asset_id,
                ticker: "AAPL".to_string(),
                name: "Apple Inc.".to_string(),
                asset_class: AssetClass::Stock,
                currency_code: "USD".to_string(),
                is_active: true,
            }),
            ..Default::default()
        };
        let req = TransactionRequest::Buy {
            transaction_date: date(),
            account: AccountId::new(),
            asset: asset_id,
            cash_asset_id: AssetId::new(),
            quantity: dec!(10),
            price: dec!(150.25),
            fees: dec!(0),
            description: None,
        };
        assert_eq!(synthesize(&req, &ctx).unwrap(), "Buy 10 AAPL at 150.25");
    }

    #[test]
    fn test_borrow_template() {
        let req = TransactionRequest::Borrow {
            transaction_date: date(),
            lender: "Maybank".to_string(),
            principal: dec!(10000),
            interest_rate: dec!(4.5),
            deposit_account: AccountId::new(),
            asset: AssetId::new(),
            description: None,
        };
        assert_eq!(
            synthesize(&req, &PostingContext::default()).unwrap(),
            "Loan from Maybank at 4.5% p.a"
        );
    }

    #[test]
    fn test_debt_payment_template() {
        let (mut ctx, account) = ctx_with_account("Savings");
        let debt_id = DebtId::new();
        ctx.debt = Some(DebtRef {
            id: debt_id,
            lender_name: "Maybank".to_string(),
            remaining_principal: dec!(5000),
            interest_rate: dec!(4.5),
            currency_code: "MYR".to_string(),
            status: DebtStatus::Active,
        });
        let req = TransactionRequest::DebtPayment {
            transaction_date: date(),
            debt: debt_id,
            from_account: account,
            principal_payment: dec!(500),
            interest_payment: dec!(20),
            asset: AssetId::new(),
            description: None,
        };
        assert_eq!(
            synthesize(&req, &ctx).unwrap(),
            "Debt payment to Maybank from Savings"
        );
    }

    #[test]
    fn test_missing_reference_fails() {
        let req = TransactionRequest::Deposit {
            transaction_date: date(),
            account: AccountId::new(),
            asset: AssetId::new(),
            quantity: dec!(100),
            description: None,
        };
        let result = synthesize(&req, &PostingContext::default());
        assert!(matches!(result, Err(PostingError::AccountNotFound(_))));
    }
}
