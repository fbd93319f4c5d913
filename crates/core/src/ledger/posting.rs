//! The posting engine: turns a validated transaction request into a
//! balanced posting plan.
//!
//! The engine is pure. It receives resolved rows through a
//! [`PostingContext`] and produces a [`PostingPlan`] the repository commits
//! in a single database transaction. Every plan's legs sum to zero; the
//! engine re-checks this before returning.

use rust_decimal::Decimal;

use super::description;
use super::error::PostingError;
use super::lots;
use super::round_money;
use super::types::{
    AccountRef, AssetRef, DebtRef, DebtStatus, DebtUpdate, LotConsumption, LotOrigin, NewDebt,
    NewLeg, NewLot, NewTransaction, PostingContext, PostingPlan, TransactionRequest,
};
use folio_shared::types::{AccountId, AssetId, DebtId, LegId, TaxLotId, TransactionId};

/// The posting engine. Stateless; all inputs arrive via arguments.
pub struct PostingEngine;

impl PostingEngine {
    /// Plans the posting for a validated request.
    ///
    /// The request must already have passed [`super::validate`]; this
    /// function enforces lookup and business rules, not field shapes.
    ///
    /// # Errors
    ///
    /// Returns [`PostingError`] on missing references, inactive rows, or
    /// business-rule violations. No partial plan is ever returned.
    pub fn plan(
        request: &TransactionRequest,
        ctx: &PostingContext,
    ) -> Result<PostingPlan, PostingError> {
        let description = match request.description() {
            Some(text) => text.to_string(),
            None => description::synthesize(request, ctx)?,
        };

        let transaction_id = TransactionId::new();
        let mut plan = PostingPlan {
            transaction: NewTransaction {
                id: transaction_id,
                transaction_date: request.transaction_date(),
                kind: request.kind(),
                description,
                price: None,
                related_debt_id: None,
                source_asset_id: None,
            },
            legs: Vec::new(),
            new_lots: Vec::new(),
            lot_consumptions: Vec::new(),
            lot_adjustments: Vec::new(),
            new_debt: None,
            debt_update: None,
            realized_gain: None,
        };

        match request {
            TransactionRequest::Deposit {
                account,
                asset,
                quantity,
                ..
            }
            | TransactionRequest::Income {
                account,
                asset,
                quantity,
                ..
            } => {
                Self::plan_cash_flow(&mut plan, ctx, *account, *asset, *quantity)?;
            }
            TransactionRequest::Withdraw {
                account,
                asset,
                quantity,
                ..
            }
            | TransactionRequest::Expense {
                account,
                asset,
                quantity,
                ..
            } => {
                Self::plan_cash_flow(&mut plan, ctx, *account, *asset, -*quantity)?;
            }
            TransactionRequest::Dividend {
                account,
                asset,
                dividend_asset,
                quantity,
                ..
            } => {
                let source = Self::require_dividend_asset(ctx, *dividend_asset)?;
                plan.transaction.source_asset_id = Some(source.id);
                Self::plan_cash_flow(&mut plan, ctx, *account, *asset, *quantity)?;
            }
            TransactionRequest::Buy {
                account,
                asset,
                cash_asset_id,
                quantity,
                price,
                fees,
                ..
            } => {
                Self::plan_buy(
                    &mut plan,
                    ctx,
                    *account,
                    *asset,
                    *cash_asset_id,
                    *quantity,
                    *price,
                    *fees,
                )?;
            }
            TransactionRequest::Sell {
                account,
                asset,
                cash_asset_id,
                quantity,
                price,
                fees,
                taxes,
                ..
            } => {
                Self::plan_sell(
                    &mut plan,
                    ctx,
                    *account,
                    *asset,
                    *cash_asset_id,
                    *quantity,
                    *price,
                    *fees,
                    *taxes,
                )?;
            }
            TransactionRequest::Borrow {
                lender,
                principal,
                interest_rate,
                deposit_account,
                asset,
                ..
            } => {
                Self::plan_borrow(
                    &mut plan,
                    ctx,
                    lender,
                    *principal,
                    *interest_rate,
                    *deposit_account,
                    *asset,
                )?;
            }
            TransactionRequest::DebtPayment {
                debt,
                from_account,
                principal_payment,
                interest_payment,
                asset,
                ..
            } => {
                Self::plan_debt_payment(
                    &mut plan,
                    ctx,
                    *debt,
                    *from_account,
                    *principal_payment,
                    *interest_payment,
                    *asset,
                )?;
            }
            TransactionRequest::Split {
                asset,
                split_quantity,
                ..
            } => {
                Self::plan_split(&mut plan, ctx, *asset, *split_quantity)?;
            }
        }

        Self::check_balance(&plan.legs)?;
        Ok(plan)
    }

    /// Deposit/withdraw/income/expense/dividend: signed cash movement with
    /// an equity offset. `signed_quantity` is positive for inflows.
    fn plan_cash_flow(
        plan: &mut PostingPlan,
        ctx: &PostingContext,
        account_id: AccountId,
        asset_id: AssetId,
        signed_quantity: Decimal,
    ) -> Result<(), PostingError> {
        let account = Self::require_account(ctx, account_id)?;
        let asset = Self::require_asset(ctx, asset_id)?;
        let (equity_account, equity_asset) = Self::require_equity_offset(ctx)?;

        plan.legs.push(NewLeg {
            id: LegId::new(),
            account_id: account.id,
            asset_id: asset.id,
            currency_code: asset.currency_code.clone(),
            quantity: signed_quantity,
            amount: signed_quantity,
        });
        plan.legs.push(NewLeg {
            id: LegId::new(),
            account_id: equity_account.id,
            asset_id: equity_asset.id,
            currency_code: asset.currency_code.clone(),
            quantity: -signed_quantity,
            amount: -signed_quantity,
        });
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_buy(
        plan: &mut PostingPlan,
        ctx: &PostingContext,
        account_id: AccountId,
        asset_id: AssetId,
        cash_asset_id: AssetId,
        quantity: Decimal,
        price: Decimal,
        fees: Decimal,
    ) -> Result<(), PostingError> {
        let account = Self::require_account(ctx, account_id)?;
        let asset = Self::require_asset(ctx, asset_id)?;
        let cash = Self::require_cash_asset(ctx, cash_asset_id)?;

        let cost = round_money(quantity * price + fees);

        plan.legs.push(NewLeg {
            id: LegId::new(),
            account_id: account.id,
            asset_id: asset.id,
            currency_code: asset.currency_code.clone(),
            quantity,
            amount: cost,
        });
        plan.legs.push(NewLeg {
            id: LegId::new(),
            account_id: account.id,
            asset_id: cash.id,
            currency_code: cash.currency_code.clone(),
            quantity: -cost,
            amount: -cost,
        });

        plan.new_lots.push(NewLot {
            id: TaxLotId::new(),
            asset_id: asset.id,
            creation_transaction_id: plan.transaction.id,
            creation_date: plan.transaction.transaction_date,
            original_quantity: quantity,
            remaining_quantity: quantity,
            cost_basis: cost,
            origin: LotOrigin::Purchase,
        });
        plan.transaction.price = Some(price);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_sell(
        plan: &mut PostingPlan,
        ctx: &PostingContext,
        account_id: AccountId,
        asset_id: AssetId,
        cash_asset_id: AssetId,
        quantity: Decimal,
        price: Decimal,
        fees: Decimal,
        taxes: Decimal,
    ) -> Result<(), PostingError> {
        let account = Self::require_account(ctx, account_id)?;
        let asset = Self::require_asset(ctx, asset_id)?;
        let cash = Self::require_cash_asset(ctx, cash_asset_id)?;

        let open_lots: Vec<_> = ctx
            .open_lots
            .iter()
            .filter(|l| l.asset_id == asset.id)
            .cloned()
            .collect();
        let drawdowns = lots::consume_fifo(&open_lots, quantity)?;

        let proceeds = round_money(quantity * price);
        let net = proceeds - fees - taxes;
        let cost_consumed: Decimal = drawdowns.iter().map(|d| d.cost).sum();

        let sell_leg_id = LegId::new();
        plan.legs.push(NewLeg {
            id: sell_leg_id,
            account_id: account.id,
            asset_id: asset.id,
            currency_code: asset.currency_code.clone(),
            quantity: -quantity,
            amount: -net,
        });
        plan.legs.push(NewLeg {
            id: LegId::new(),
            account_id: account.id,
            asset_id: cash.id,
            currency_code: cash.currency_code.clone(),
            quantity: net,
            amount: net,
        });

        plan.lot_consumptions = drawdowns
            .into_iter()
            .map(|d| LotConsumption {
                tax_lot_id: d.tax_lot_id,
                sell_leg_id,
                quantity_consumed: d.quantity,
                cost_consumed: d.cost,
            })
            .collect();
        plan.realized_gain = Some(proceeds - cost_consumed - fees - taxes);
        plan.transaction.price = Some(price);
        Ok(())
    }

    fn plan_borrow(
        plan: &mut PostingPlan,
        ctx: &PostingContext,
        lender: &str,
        principal: Decimal,
        interest_rate: Decimal,
        deposit_account_id: AccountId,
        asset_id: AssetId,
    ) -> Result<(), PostingError> {
        let account = Self::require_account(ctx, deposit_account_id)?;
        let asset = Self::require_asset(ctx, asset_id)?;
        let (liability_account, liability_asset) = Self::require_liability_offset(ctx)?;

        let debt_id = DebtId::new();
        plan.new_debt = Some(NewDebt {
            id: debt_id,
            lender_name: lender.to_string(),
            principal_amount: principal,
            remaining_principal: principal,
            interest_rate,
            currency_code: asset.currency_code.clone(),
            start_date: plan.transaction.transaction_date,
        });
        plan.transaction.related_debt_id = Some(debt_id);

        plan.legs.push(NewLeg {
            id: LegId::new(),
            account_id: account.id,
            asset_id: asset.id,
            currency_code: asset.currency_code.clone(),
            quantity: principal,
            amount: principal,
        });
        plan.legs.push(NewLeg {
            id: LegId::new(),
            account_id: liability_account.id,
            asset_id: liability_asset.id,
            currency_code: asset.currency_code.clone(),
            quantity: -principal,
            amount: -principal,
        });
        Ok(())
    }

    fn plan_debt_payment(
        plan: &mut PostingPlan,
        ctx: &PostingContext,
        debt_id: DebtId,
        from_account_id: AccountId,
        principal_payment: Decimal,
        interest_payment: Decimal,
        asset_id: AssetId,
    ) -> Result<(), PostingError> {
        let account = Self::require_account(ctx, from_account_id)?;
        let asset = Self::require_asset(ctx, asset_id)?;
        let (liability_account, liability_asset) = Self::require_liability_offset(ctx)?;
        let debt = Self::require_debt(ctx, debt_id)?;

        if debt.status == DebtStatus::PaidOff {
            return Err(PostingError::DebtAlreadyPaidOff(debt.id));
        }
        if principal_payment > debt.remaining_principal {
            return Err(PostingError::PaymentExceedsPrincipal {
                payment: principal_payment,
                remaining: debt.remaining_principal,
            });
        }

        let total = principal_payment + interest_payment;
        plan.legs.push(NewLeg {
            id: LegId::new(),
            account_id: account.id,
            asset_id: asset.id,
            currency_code: asset.currency_code.clone(),
            quantity: -total,
            amount: -total,
        });
        plan.legs.push(NewLeg {
            id: LegId::new(),
            account_id: liability_account.id,
            asset_id: liability_asset.id,
            currency_code: asset.currency_code.clone(),
            quantity: principal_payment,
            amount: principal_payment,
        });
        if interest_payment > Decimal::ZERO {
            let (equity_account, equity_asset) = Self::require_equity_offset(ctx)?;
            plan.legs.push(NewLeg {
                id: LegId::new(),
                account_id: equity_account.id,
                asset_id: equity_asset.id,
                currency_code: asset.currency_code.clone(),
                quantity: interest_payment,
                amount: interest_payment,
            });
        }

        let remaining = debt.remaining_principal - principal_payment;
        let status = if remaining == Decimal::ZERO {
            DebtStatus::PaidOff
        } else {
            DebtStatus::Active
        };
        plan.debt_update = Some(DebtUpdate {
            debt_id: debt.id,
            remaining_principal: remaining,
            status,
        });
        plan.transaction.related_debt_id = Some(debt.id);
        Ok(())
    }

    fn plan_split(
        plan: &mut PostingPlan,
        ctx: &PostingContext,
        asset_id: AssetId,
        split_quantity: Decimal,
    ) -> Result<(), PostingError> {
        // The request names no account; the repository resolves the
        // holding account from the asset's leg history.
        let account = ctx
            .account
            .as_ref()
            .ok_or(PostingError::MissingHoldingAccount)?;
        if !account.is_active {
            return Err(PostingError::AccountInactive(account.id));
        }
        let asset = Self::require_asset(ctx, asset_id)?;

        let new_lot_id = TaxLotId::new();
        let mut basis_pool: Vec<_> = ctx
            .open_lots
            .iter()
            .filter(|l| l.asset_id == asset.id && l.remaining_quantity > Decimal::ZERO)
            .map(|l| (l.id, l.remaining_quantity, l.cost_basis))
            .collect();
        basis_pool.push((new_lot_id, split_quantity, Decimal::ZERO));

        let mut adjustments = lots::redistribute_cost_basis(&basis_pool);

        // The new lot's share goes into the row itself, not an adjustment.
        let new_lot_basis = adjustments
            .iter()
            .position(|adj| adj.tax_lot_id == new_lot_id)
            .map_or(Decimal::ZERO, |pos| adjustments.remove(pos).new_cost_basis);

        plan.new_lots.push(NewLot {
            id: new_lot_id,
            asset_id: asset.id,
            creation_transaction_id: plan.transaction.id,
            creation_date: plan.transaction.transaction_date,
            original_quantity: split_quantity,
            remaining_quantity: split_quantity,
            cost_basis: new_lot_basis,
            origin: LotOrigin::Split,
        });
        plan.lot_adjustments = adjustments;

        plan.legs.push(NewLeg {
            id: LegId::new(),
            account_id: account.id,
            asset_id: asset.id,
            currency_code: asset.currency_code.clone(),
            quantity: split_quantity,
            amount: Decimal::ZERO,
        });
        Ok(())
    }

    fn check_balance(legs: &[NewLeg]) -> Result<(), PostingError> {
        let sum: Decimal = legs.iter().map(|l| l.amount).sum();
        if sum == Decimal::ZERO {
            Ok(())
        } else {
            Err(PostingError::UnbalancedLegs { sum })
        }
    }

    fn require_account(
        ctx: &PostingContext,
        id: AccountId,
    ) -> Result<&AccountRef, PostingError> {
        let account = ctx
            .account
            .as_ref()
            .filter(|a| a.id == id)
            .ok_or(PostingError::AccountNotFound(id))?;
        if !account.is_active {
            return Err(PostingError::AccountInactive(id));
        }
        Ok(account)
    }

    fn require_asset(ctx: &PostingContext, id: AssetId) -> Result<&AssetRef, PostingError> {
        Self::check_asset(ctx.asset.as_ref(), id)
    }

    fn require_cash_asset(ctx: &PostingContext, id: AssetId) -> Result<&AssetRef, PostingError> {
        Self::check_asset(ctx.cash_asset.as_ref(), id)
    }

    fn require_dividend_asset(
        ctx: &PostingContext,
        id: AssetId,
    ) -> Result<&AssetRef, PostingError> {
        Self::check_asset(ctx.dividend_asset.as_ref(), id)
    }

    fn check_asset(found: Option<&AssetRef>, id: AssetId) -> Result<&AssetRef, PostingError> {
        let asset = found
            .filter(|a| a.id == id)
            .ok_or(PostingError::AssetNotFound(id))?;
        if !asset.is_active {
            return Err(PostingError::AssetInactive(id));
        }
        Ok(asset)
    }

    fn require_debt(ctx: &PostingContext, id: DebtId) -> Result<&DebtRef, PostingError> {
        ctx.debt
            .as_ref()
            .filter(|d| d.id == id)
            .ok_or(PostingError::DebtNotFound(id))
    }

    fn require_equity_offset(
        ctx: &PostingContext,
    ) -> Result<(&AccountRef, &AssetRef), PostingError> {
        match (&ctx.equity_account, &ctx.equity_asset) {
            (Some(account), Some(asset)) => Ok((account, asset)),
            _ => Err(PostingError::MissingEquityOffset),
        }
    }

    fn require_liability_offset(
        ctx: &PostingContext,
    ) -> Result<(&AccountRef, &AssetRef), PostingError> {
        match (&ctx.liability_account, &ctx.liability_asset) {
            (Some(account), Some(asset)) => Ok((account, asset)),
            _ => Err(PostingError::MissingLiabilityOffset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{AssetClass, OpenLot, TransactionKind};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn account_ref(name: &str) -> AccountRef {
        AccountRef {
            id: AccountId::new(),
            name: name.to_string(),
            is_active: true,
        }
    }

    fn asset_ref(ticker: &str, class: AssetClass) -> AssetRef {
        AssetRef {
            id: AssetId::new(),
            ticker: ticker.to_string(),
            name: ticker.to_string(),
            asset_class: class,
            currency_code: "MYR".to_string(),
            is_active: true,
        }
    }

    /// Context with every offset populated, as the repository would build.
    fn full_context() -> PostingContext {
        PostingContext {
            account: Some(account_ref("Main Brokerage")),
            asset: Some(asset_ref("MYR", AssetClass::Cash)),
            equity_account: Some(account_ref("Equity")),
            equity_asset: Some(asset_ref("CAPITAL", AssetClass::Equity)),
            liability_account: Some(account_ref("Liabilities")),
            liability_asset: Some(asset_ref("DEBT", AssetClass::Liability)),
            ..Default::default()
        }
    }

    fn assert_balanced(plan: &PostingPlan) {
        let sum: Decimal = plan.legs.iter().map(|l| l.amount).sum();
        assert_eq!(sum, Decimal::ZERO, "legs must sum to zero");
    }

    #[test]
    fn test_deposit_plan() {
        let ctx = full_context();
        let req = TransactionRequest::Deposit {
            transaction_date: date(),
            account: ctx.account.as_ref().unwrap().id,
            asset: ctx.asset.as_ref().unwrap().id,
            quantity: dec!(1000),
            description: None,
        };

        let plan = PostingEngine::plan(&req, &ctx).unwrap();
        assert_eq!(plan.transaction.kind, TransactionKind::Deposit);
        assert_eq!(plan.transaction.description, "Deposit to Main Brokerage");
        assert_eq!(plan.legs.len(), 2);
        assert_eq!(plan.legs[0].quantity, dec!(1000));
        assert_eq!(plan.legs[1].quantity, dec!(-1000));
        assert_balanced(&plan);
        assert!(plan.new_lots.is_empty());
    }

    #[test]
    fn test_withdraw_mirrors_deposit() {
        let ctx = full_context();
        let req = TransactionRequest::Withdraw {
            transaction_date: date(),
            account: ctx.account.as_ref().unwrap().id,
            asset: ctx.asset.as_ref().unwrap().id,
            quantity: dec!(250),
            description: Some("ATM withdrawal".to_string()),
        };

        let plan = PostingEngine::plan(&req, &ctx).unwrap();
        assert_eq!(plan.transaction.description, "ATM withdrawal");
        assert_eq!(plan.legs[0].quantity, dec!(-250));
        assert_eq!(plan.legs[1].quantity, dec!(250));
        assert_balanced(&plan);
    }

    #[test]
    fn test_dividend_carries_source_asset() {
        let mut ctx = full_context();
        let source = asset_ref("AAPL", AssetClass::Stock);
        let source_id = source.id;
        ctx.dividend_asset = Some(source);

        let req = TransactionRequest::Dividend {
            transaction_date: date(),
            account: ctx.account.as_ref().unwrap().id,
            asset: ctx.asset.as_ref().unwrap().id,
            dividend_asset: source_id,
            quantity: dec!(12.5),
            description: None,
        };

        let plan = PostingEngine::plan(&req, &ctx).unwrap();
        assert_eq!(plan.transaction.source_asset_id, Some(source_id));
        assert_eq!(
            plan.transaction.description,
            "Dividend from AAPL to Main Brokerage"
        );
        assert_balanced(&plan);
    }

    fn buy_context() -> PostingContext {
        let mut ctx = full_context();
        ctx.asset = Some(asset_ref("AAPL", AssetClass::Stock));
        ctx.cash_asset = Some(asset_ref("MYR", AssetClass::Cash));
        ctx
    }

    #[test]
    fn test_buy_creates_lot_with_full_cost() {
        let ctx = buy_context();
        let req = TransactionRequest::Buy {
            transaction_date: date(),
            account: ctx.account.as_ref().unwrap().id,
            asset: ctx.asset.as_ref().unwrap().id,
            cash_asset_id: ctx.cash_asset.as_ref().unwrap().id,
            quantity: dec!(10),
            price: dec!(150),
            fees: dec!(5),
            description: None,
        };

        let plan = PostingEngine::plan(&req, &ctx).unwrap();
        assert_balanced(&plan);
        assert_eq!(plan.transaction.price, Some(dec!(150)));
        assert_eq!(plan.new_lots.len(), 1);

        let lot = &plan.new_lots[0];
        assert_eq!(lot.original_quantity, dec!(10));
        assert_eq!(lot.remaining_quantity, dec!(10));
        assert_eq!(lot.cost_basis, dec!(1505));
        assert!(matches!(lot.origin, LotOrigin::Purchase));

        // Asset leg carries +quantity, cash leg the negated cost.
        assert_eq!(plan.legs[0].quantity, dec!(10));
        assert_eq!(plan.legs[0].amount, dec!(1505));
        assert_eq!(plan.legs[1].amount, dec!(-1505));
    }

    fn open_lot(asset_id: AssetId, day: u32, quantity: Decimal, cost: Decimal) -> OpenLot {
        OpenLot {
            id: TaxLotId::new(),
            asset_id,
            creation_date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            original_quantity: quantity,
            remaining_quantity: quantity,
            cost_basis: cost,
        }
    }

    #[test]
    fn test_sell_consumes_fifo_and_computes_gain() {
        let mut ctx = buy_context();
        let asset_id = ctx.asset.as_ref().unwrap().id;
        let older = open_lot(asset_id, 5, dec!(10), dec!(1000));
        let newer = open_lot(asset_id, 20, dec!(10), dec!(1500));
        ctx.open_lots = vec![newer, older.clone()];

        let req = TransactionRequest::Sell {
            transaction_date: date(),
            account: ctx.account.as_ref().unwrap().id,
            asset: asset_id,
            cash_asset_id: ctx.cash_asset.as_ref().unwrap().id,
            quantity: dec!(12),
            price: dec!(200),
            fees: dec!(10),
            taxes: dec!(6),
            description: None,
        };

        let plan = PostingEngine::plan(&req, &ctx).unwrap();
        assert_balanced(&plan);

        // 12 sold: 10 from the older lot, 2 from the newer.
        assert_eq!(plan.lot_consumptions.len(), 2);
        assert_eq!(plan.lot_consumptions[0].tax_lot_id, older.id);
        assert_eq!(plan.lot_consumptions[0].quantity_consumed, dec!(10));
        assert_eq!(plan.lot_consumptions[0].cost_consumed, dec!(1000));
        assert_eq!(plan.lot_consumptions[1].quantity_consumed, dec!(2));
        assert_eq!(plan.lot_consumptions[1].cost_consumed, dec!(300));

        // proceeds 2400 - basis 1300 - fees 10 - taxes 6
        assert_eq!(plan.realized_gain, Some(dec!(1084)));

        // net 2384 flows to cash
        assert_eq!(plan.legs[1].amount, dec!(2384));
        assert_eq!(plan.legs[0].quantity, dec!(-12));
    }

    #[test]
    fn test_sell_insufficient_lots_posts_nothing() {
        let mut ctx = buy_context();
        let asset_id = ctx.asset.as_ref().unwrap().id;
        ctx.open_lots = vec![open_lot(asset_id, 5, dec!(5), dec!(500))];

        let req = TransactionRequest::Sell {
            transaction_date: date(),
            account: ctx.account.as_ref().unwrap().id,
            asset: asset_id,
            cash_asset_id: ctx.cash_asset.as_ref().unwrap().id,
            quantity: dec!(6),
            price: dec!(100),
            fees: dec!(0),
            taxes: dec!(0),
            description: None,
        };

        let result = PostingEngine::plan(&req, &ctx);
        assert!(matches!(
            result,
            Err(PostingError::InsufficientLots { .. })
        ));
    }

    #[test]
    fn test_borrow_creates_active_debt() {
        let ctx = full_context();
        let req = TransactionRequest::Borrow {
            transaction_date: date(),
            lender: "Maybank".to_string(),
            principal: dec!(10000),
            interest_rate: dec!(4.5),
            deposit_account: ctx.account.as_ref().unwrap().id,
            asset: ctx.asset.as_ref().unwrap().id,
            description: None,
        };

        let plan = PostingEngine::plan(&req, &ctx).unwrap();
        assert_balanced(&plan);
        assert_eq!(plan.transaction.description, "Loan from Maybank at 4.5% p.a");

        let debt = plan.new_debt.as_ref().unwrap();
        assert_eq!(debt.principal_amount, dec!(10000));
        assert_eq!(debt.remaining_principal, dec!(10000));
        assert_eq!(plan.transaction.related_debt_id, Some(debt.id));
        assert_eq!(plan.legs[0].amount, dec!(10000));
        assert_eq!(plan.legs[1].amount, dec!(-10000));
    }

    fn debt_context(remaining: Decimal, status: DebtStatus) -> (PostingContext, DebtId) {
        let mut ctx = full_context();
        let debt_id = DebtId::new();
        ctx.debt = Some(DebtRef {
            id: debt_id,
            lender_name: "Maybank".to_string(),
            remaining_principal: remaining,
            interest_rate: dec!(4.5),
            currency_code: "MYR".to_string(),
            status,
        });
        (ctx, debt_id)
    }

    #[test]
    fn test_debt_payment_with_interest() {
        let (ctx, debt_id) = debt_context(dec!(5000), DebtStatus::Active);
        let req = TransactionRequest::DebtPayment {
            transaction_date: date(),
            debt: debt_id,
            from_account: ctx.account.as_ref().unwrap().id,
            principal_payment: dec!(500),
            interest_payment: dec!(20),
            asset: ctx.asset.as_ref().unwrap().id,
            description: None,
        };

        let plan = PostingEngine::plan(&req, &ctx).unwrap();
        assert_balanced(&plan);
        assert_eq!(plan.legs.len(), 3);
        assert_eq!(plan.legs[0].amount, dec!(-520));
        assert_eq!(plan.legs[1].amount, dec!(500));
        assert_eq!(plan.legs[2].amount, dec!(20));

        let update = plan.debt_update.as_ref().unwrap();
        assert_eq!(update.remaining_principal, dec!(4500));
        assert_eq!(update.status, DebtStatus::Active);
    }

    #[test]
    fn test_debt_payment_to_zero_transitions_paid_off() {
        let (ctx, debt_id) = debt_context(dec!(500), DebtStatus::Active);
        let req = TransactionRequest::DebtPayment {
            transaction_date: date(),
            debt: debt_id,
            from_account: ctx.account.as_ref().unwrap().id,
            principal_payment: dec!(500),
            interest_payment: dec!(0),
            asset: ctx.asset.as_ref().unwrap().id,
            description: None,
        };

        let plan = PostingEngine::plan(&req, &ctx).unwrap();
        // Interest of zero produces no equity leg.
        assert_eq!(plan.legs.len(), 2);
        let update = plan.debt_update.as_ref().unwrap();
        assert_eq!(update.remaining_principal, Decimal::ZERO);
        assert_eq!(update.status, DebtStatus::PaidOff);
    }

    #[test]
    fn test_debt_payment_rejected_when_paid_off() {
        let (ctx, debt_id) = debt_context(Decimal::ZERO, DebtStatus::PaidOff);
        let req = TransactionRequest::DebtPayment {
            transaction_date: date(),
            debt: debt_id,
            from_account: ctx.account.as_ref().unwrap().id,
            principal_payment: dec!(100),
            interest_payment: dec!(0),
            asset: ctx.asset.as_ref().unwrap().id,
            description: None,
        };

        assert!(matches!(
            PostingEngine::plan(&req, &ctx),
            Err(PostingError::DebtAlreadyPaidOff(_))
        ));
    }

    #[test]
    fn test_debt_payment_exceeding_principal_rejected() {
        let (ctx, debt_id) = debt_context(dec!(300), DebtStatus::Active);
        let req = TransactionRequest::DebtPayment {
            transaction_date: date(),
            debt: debt_id,
            from_account: ctx.account.as_ref().unwrap().id,
            principal_payment: dec!(301),
            interest_payment: dec!(0),
            asset: ctx.asset.as_ref().unwrap().id,
            description: None,
        };

        assert!(matches!(
            PostingEngine::plan(&req, &ctx),
            Err(PostingError::PaymentExceedsPrincipal { .. })
        ));
    }

    #[test]
    fn test_split_redistributes_basis_and_posts_zero_amount_leg() {
        let mut ctx = buy_context();
        let asset_id = ctx.asset.as_ref().unwrap().id;
        let existing = open_lot(asset_id, 5, dec!(10), dec!(3000));
        ctx.open_lots = vec![existing.clone()];

        let req = TransactionRequest::Split {
            transaction_date: date(),
            asset: asset_id,
            split_quantity: dec!(10),
            description: None,
        };

        let plan = PostingEngine::plan(&req, &ctx).unwrap();
        assert_balanced(&plan);
        assert_eq!(plan.transaction.description, "Stock split for AAPL");

        // Single zero-amount leg, no cash movement.
        assert_eq!(plan.legs.len(), 1);
        assert_eq!(plan.legs[0].quantity, dec!(10));
        assert_eq!(plan.legs[0].amount, Decimal::ZERO);

        // 2-for-1: basis splits evenly between old and new lot.
        let lot = &plan.new_lots[0];
        assert!(matches!(lot.origin, LotOrigin::Split));
        assert_eq!(lot.cost_basis, dec!(1500));
        assert_eq!(plan.lot_adjustments.len(), 1);
        assert_eq!(plan.lot_adjustments[0].tax_lot_id, existing.id);
        assert_eq!(plan.lot_adjustments[0].new_cost_basis, dec!(1500));

        let aggregate: Decimal = plan
            .lot_adjustments
            .iter()
            .map(|adj| adj.new_cost_basis)
            .sum::<Decimal>()
            + lot.cost_basis;
        assert_eq!(aggregate, dec!(3000));
    }

    #[test]
    fn test_inactive_account_rejected() {
        let mut ctx = full_context();
        ctx.account.as_mut().unwrap().is_active = false;
        let req = TransactionRequest::Deposit {
            transaction_date: date(),
            account: ctx.account.as_ref().unwrap().id,
            asset: ctx.asset.as_ref().unwrap().id,
            quantity: dec!(100),
            description: None,
        };
        assert!(matches!(
            PostingEngine::plan(&req, &ctx),
            Err(PostingError::AccountInactive(_))
        ));
    }

    #[test]
    fn test_unknown_account_rejected() {
        let ctx = full_context();
        let req = TransactionRequest::Deposit {
            transaction_date: date(),
            account: AccountId::new(),
            asset: ctx.asset.as_ref().unwrap().id,
            quantity: dec!(100),
            description: None,
        };
        assert!(matches!(
            PostingEngine::plan(&req, &ctx),
            Err(PostingError::AccountNotFound(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_plans_always_balance(
            cents in 1i64..1_000_000_000,
            kind in 0u8..4,
        ) {
            let quantity = Decimal::new(cents, 2);
            let ctx = full_context();
            let account = ctx.account.as_ref().unwrap().id;
            let asset = ctx.asset.as_ref().unwrap().id;
            let req = match kind {
                0 => TransactionRequest::Deposit {
                    transaction_date: date(), account, asset,
                    quantity, description: None,
                },
                1 => TransactionRequest::Withdraw {
                    transaction_date: date(), account, asset,
                    quantity, description: None,
                },
                2 => TransactionRequest::Income {
                    transaction_date: date(), account, asset,
                    quantity, description: None,
                },
                _ => TransactionRequest::Expense {
                    transaction_date: date(), account, asset,
                    quantity, description: None,
                },
            };

            let plan = PostingEngine::plan(&req, &ctx).unwrap();
            let sum: Decimal = plan.legs.iter().map(|l| l.amount).sum();
            prop_assert_eq!(sum, Decimal::ZERO);
        }

        #[test]
        fn prop_buy_then_sell_balances_and_conserves_quantity(
            buy_units in 1u32..10_000,
            price_cents in 1i64..1_000_000,
        ) {
            let quantity = Decimal::from(buy_units);
            let price = Decimal::new(price_cents, 2);

            let mut ctx = buy_context();
            let account = ctx.account.as_ref().unwrap().id;
            let asset = ctx.asset.as_ref().unwrap().id;
            let cash = ctx.cash_asset.as_ref().unwrap().id;

            let buy = TransactionRequest::Buy {
                transaction_date: date(), account, asset,
                cash_asset_id: cash, quantity, price,
                fees: Decimal::ZERO, description: None,
            };
            let buy_plan = PostingEngine::plan(&buy, &ctx).unwrap();
            let lot = &buy_plan.new_lots[0];

            ctx.open_lots = vec![OpenLot {
                id: lot.id,
                asset_id: lot.asset_id,
                creation_date: lot.creation_date,
                original_quantity: lot.original_quantity,
                remaining_quantity: lot.remaining_quantity,
                cost_basis: lot.cost_basis,
            }];

            let sell = TransactionRequest::Sell {
                transaction_date: date(), account, asset,
                cash_asset_id: cash, quantity, price,
                fees: Decimal::ZERO, taxes: Decimal::ZERO,
                description: None,
            };
            let sell_plan = PostingEngine::plan(&sell, &ctx).unwrap();

            let consumed: Decimal = sell_plan
                .lot_consumptions
                .iter()
                .map(|c| c.quantity_consumed)
                .sum();
            prop_assert_eq!(consumed, quantity);

            // Round trip at the same price with no costs realizes zero.
            prop_assert_eq!(sell_plan.realized_gain.unwrap(), Decimal::ZERO);

            let sum: Decimal = sell_plan.legs.iter().map(|l| l.amount).sum();
            prop_assert_eq!(sum, Decimal::ZERO);
        }
    }
}
