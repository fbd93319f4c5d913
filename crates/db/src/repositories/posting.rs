//! Posting repository: the single write path for ledger transactions.
//!
//! For each request the repository resolves the referenced rows into a
//! [`PostingContext`], asks the pure [`PostingEngine`] for a balanced
//! [`PostingPlan`], and commits the plan inside one database transaction.
//! Nothing is written when planning fails.

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use folio_core::ledger::types::{
    AccountRef, AssetRef, DebtRef, OpenLot, PostingContext, PostingPlan, TransactionRequest,
};
use folio_core::ledger::{PostingEngine, PostingError};
use folio_shared::types::{AccountId, AssetId, DebtId, PageRequest, PageResponse};

use crate::entities::{
    accounts, assets, debts, lot_consumptions, tax_lots, transaction_legs, transactions,
    sea_orm_active_enums::{AccountKind, AssetClass, DebtStatus, TransactionKind},
};

/// Error types for posting operations.
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    /// The posting engine rejected the request.
    #[error(transparent)]
    Posting(#[from] PostingError),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by transaction kind.
    pub kind: Option<TransactionKind>,
    /// Filter by date range start, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end, inclusive.
    pub date_to: Option<NaiveDate>,
}

/// A transaction with its legs.
#[derive(Debug, Clone)]
pub struct TransactionWithLegs {
    /// Transaction header.
    pub transaction: transactions::Model,
    /// The balanced leg set.
    pub legs: Vec<transaction_legs::Model>,
}

/// Posting repository.
#[derive(Debug, Clone)]
pub struct PostingRepository {
    db: DatabaseConnection,
}

impl PostingRepository {
    /// Creates a new posting repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a validated transaction request.
    ///
    /// The request must already have passed field validation. Planning
    /// runs against a context resolved outside the database transaction;
    /// the commit itself is atomic.
    ///
    /// # Errors
    ///
    /// Returns an error when a referenced row is missing or inactive, a
    /// business rule is violated, or a database operation fails.
    pub async fn post(
        &self,
        request: &TransactionRequest,
    ) -> Result<transactions::Model, PostError> {
        let ctx = self.load_context(request).await?;
        let plan = PostingEngine::plan(request, &ctx)?;
        let model = self.commit(&plan).await?;

        tracing::info!(
            transaction_id = %model.id,
            kind = plan.transaction.kind.as_str(),
            legs = plan.legs.len(),
            "transaction posted"
        );

        Ok(model)
    }

    /// Lists transactions with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: TransactionFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<transactions::Model>, PostError> {
        let mut query = transactions::Entity::find();

        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(transactions::Column::TransactionDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(transactions::Column::TransactionDate.lte(date_to));
        }

        let paginator = query
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .paginate(&self.db, page.limit().max(1));

        let total = paginator.num_items().await?;
        let data = paginator
            .fetch_page(u64::from(page.page.saturating_sub(1)))
            .await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Gets a transaction with its legs.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is not found or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<TransactionWithLegs, PostError> {
        let transaction = transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(PostError::NotFound(id))?;

        let legs = transaction_legs::Entity::find()
            .filter(transaction_legs::Column::TransactionId.eq(id))
            .all(&self.db)
            .await?;

        Ok(TransactionWithLegs { transaction, legs })
    }

    // ------------------------------------------------------------------
    // Context assembly
    // ------------------------------------------------------------------

    /// Resolves the rows a request references into a posting context.
    ///
    /// Missing rows leave their context field as `None`; the engine turns
    /// that into the appropriate lookup error.
    async fn load_context(
        &self,
        request: &TransactionRequest,
    ) -> Result<PostingContext, PostError> {
        let mut ctx = PostingContext::default();

        match request {
            TransactionRequest::Deposit { account, asset, .. }
            | TransactionRequest::Withdraw { account, asset, .. }
            | TransactionRequest::Income { account, asset, .. }
            | TransactionRequest::Expense { account, asset, .. } => {
                ctx.account = self.find_account(*account).await?;
                ctx.asset = self.find_asset(*asset).await?;
                self.load_equity_offset(&mut ctx).await?;
            }
            TransactionRequest::Dividend {
                account,
                asset,
                dividend_asset,
                ..
            } => {
                ctx.account = self.find_account(*account).await?;
                ctx.asset = self.find_asset(*asset).await?;
                ctx.dividend_asset = self.find_asset(*dividend_asset).await?;
                self.load_equity_offset(&mut ctx).await?;
            }
            TransactionRequest::Buy {
                account,
                asset,
                cash_asset_id,
                ..
            } => {
                ctx.account = self.find_account(*account).await?;
                ctx.asset = self.find_asset(*asset).await?;
                ctx.cash_asset = self.find_asset(*cash_asset_id).await?;
            }
            TransactionRequest::Sell {
                account,
                asset,
                cash_asset_id,
                ..
            } => {
                ctx.account = self.find_account(*account).await?;
                ctx.asset = self.find_asset(*asset).await?;
                ctx.cash_asset = self.find_asset(*cash_asset_id).await?;
                ctx.open_lots = self.find_open_lots(*asset).await?;
            }
            TransactionRequest::Borrow {
                deposit_account,
                asset,
                ..
            } => {
                ctx.account = self.find_account(*deposit_account).await?;
                ctx.asset = self.find_asset(*asset).await?;
                self.load_liability_offset(&mut ctx).await?;
            }
            TransactionRequest::DebtPayment {
                debt,
                from_account,
                asset,
                ..
            } => {
                ctx.account = self.find_account(*from_account).await?;
                ctx.asset = self.find_asset(*asset).await?;
                ctx.debt = self.find_debt(*debt).await?;
                self.load_liability_offset(&mut ctx).await?;
                self.load_equity_offset(&mut ctx).await?;
            }
            TransactionRequest::Split { asset, .. } => {
                ctx.asset = self.find_asset(*asset).await?;
                ctx.account = self.find_holding_account(*asset).await?;
                ctx.open_lots = self.find_open_lots(*asset).await?;
            }
        }

        Ok(ctx)
    }

    async fn find_account(&self, id: AccountId) -> Result<Option<AccountRef>, DbErr> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?;
        Ok(account.map(to_account_ref))
    }

    async fn find_asset(&self, id: AssetId) -> Result<Option<AssetRef>, DbErr> {
        let asset = assets::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?;
        Ok(asset.map(to_asset_ref))
    }

    async fn find_debt(&self, id: DebtId) -> Result<Option<DebtRef>, DbErr> {
        let debt = debts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?;
        Ok(debt.map(to_debt_ref))
    }

    /// Loads the conceptual account and equity-class asset absorbing
    /// equity offset legs. The seeder creates both.
    async fn load_equity_offset(&self, ctx: &mut PostingContext) -> Result<(), DbErr> {
        if ctx.equity_account.is_none() {
            ctx.equity_account = self.find_conceptual_account().await?;
        }
        ctx.equity_asset = self.find_class_asset(AssetClass::Equity).await?;
        Ok(())
    }

    /// Loads the conceptual account and liability-class asset carrying
    /// debt obligation legs.
    async fn load_liability_offset(&self, ctx: &mut PostingContext) -> Result<(), DbErr> {
        if ctx.liability_account.is_none() {
            ctx.liability_account = self.find_conceptual_account().await?;
        }
        ctx.liability_asset = self.find_class_asset(AssetClass::Liability).await?;
        Ok(())
    }

    async fn find_conceptual_account(&self) -> Result<Option<AccountRef>, DbErr> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Kind.eq(AccountKind::Conceptual))
            .filter(accounts::Column::IsActive.eq(true))
            .order_by_asc(accounts::Column::CreatedAt)
            .one(&self.db)
            .await?;
        Ok(account.map(to_account_ref))
    }

    async fn find_class_asset(&self, class: AssetClass) -> Result<Option<AssetRef>, DbErr> {
        let asset = assets::Entity::find()
            .filter(assets::Column::AssetClass.eq(class))
            .filter(assets::Column::IsActive.eq(true))
            .order_by_asc(assets::Column::CreatedAt)
            .one(&self.db)
            .await?;
        Ok(asset.map(to_asset_ref))
    }

    /// Loads the open lots for an asset in FIFO order.
    async fn find_open_lots(&self, asset_id: AssetId) -> Result<Vec<OpenLot>, DbErr> {
        let lots = tax_lots::Entity::find()
            .filter(tax_lots::Column::AssetId.eq(asset_id.into_inner()))
            .filter(tax_lots::Column::RemainingQuantity.gt(rust_decimal::Decimal::ZERO))
            .order_by_asc(tax_lots::Column::CreationDate)
            .order_by_asc(tax_lots::Column::Id)
            .all(&self.db)
            .await?;
        Ok(lots.into_iter().map(to_open_lot).collect())
    }

    /// Resolves the holding account for a split from the asset's most
    /// recent leg. Split requests name no account of their own.
    async fn find_holding_account(&self, asset_id: AssetId) -> Result<Option<AccountRef>, DbErr> {
        let latest_leg = transaction_legs::Entity::find()
            .filter(transaction_legs::Column::AssetId.eq(asset_id.into_inner()))
            .order_by_desc(transaction_legs::Column::CreatedAt)
            .limit(1)
            .one(&self.db)
            .await?;

        let Some(leg) = latest_leg else {
            return Ok(None);
        };

        let account = accounts::Entity::find_by_id(leg.account_id)
            .one(&self.db)
            .await?;
        Ok(account.map(to_account_ref))
    }

    // ------------------------------------------------------------------
    // Plan commit
    // ------------------------------------------------------------------

    /// Commits a posting plan atomically.
    async fn commit(&self, plan: &PostingPlan) -> Result<transactions::Model, PostError> {
        let txn = self.db.begin().await?;
        let now = Utc::now().into();

        // Debt row first so the transaction's foreign key resolves.
        if let Some(debt) = &plan.new_debt {
            debts::ActiveModel {
                id: Set(debt.id.into_inner()),
                lender_name: Set(debt.lender_name.clone()),
                principal_amount: Set(debt.principal_amount),
                remaining_principal: Set(debt.remaining_principal),
                interest_rate: Set(debt.interest_rate),
                currency_code: Set(debt.currency_code.clone()),
                start_date: Set(debt.start_date),
                status: Set(DebtStatus::Active),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        let header = &plan.transaction;
        let transaction = transactions::ActiveModel {
            id: Set(header.id.into_inner()),
            transaction_date: Set(header.transaction_date),
            kind: Set(header.kind.into()),
            description: Set(header.description.clone()),
            price: Set(header.price),
            related_debt_id: Set(header.related_debt_id.map(DebtId::into_inner)),
            source_asset_id: Set(header.source_asset_id.map(AssetId::into_inner)),
            realized_gain: Set(plan.realized_gain),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for leg in &plan.legs {
            transaction_legs::ActiveModel {
                id: Set(leg.id.into_inner()),
                transaction_id: Set(header.id.into_inner()),
                account_id: Set(leg.account_id.into_inner()),
                asset_id: Set(leg.asset_id.into_inner()),
                currency_code: Set(leg.currency_code.clone()),
                quantity: Set(leg.quantity),
                amount: Set(leg.amount),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        for lot in &plan.new_lots {
            tax_lots::ActiveModel {
                id: Set(lot.id.into_inner()),
                asset_id: Set(lot.asset_id.into_inner()),
                creation_transaction_id: Set(lot.creation_transaction_id.into_inner()),
                creation_date: Set(lot.creation_date),
                original_quantity: Set(lot.original_quantity),
                remaining_quantity: Set(lot.remaining_quantity),
                cost_basis: Set(lot.cost_basis),
                origin: Set(lot.origin.into()),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        self.apply_consumptions(&txn, plan, now).await?;

        for adjustment in &plan.lot_adjustments {
            tax_lots::ActiveModel {
                id: Set(adjustment.tax_lot_id.into_inner()),
                cost_basis: Set(adjustment.new_cost_basis),
                ..Default::default()
            }
            .update(&txn)
            .await?;
        }

        if let Some(update) = &plan.debt_update {
            debts::ActiveModel {
                id: Set(update.debt_id.into_inner()),
                remaining_principal: Set(update.remaining_principal),
                status: Set(update.status.into()),
                ..Default::default()
            }
            .update(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(transaction)
    }

    /// Records lot consumptions and decrements each lot's remaining
    /// quantity and cost basis by the consumed amounts.
    async fn apply_consumptions(
        &self,
        txn: &DatabaseTransaction,
        plan: &PostingPlan,
        now: chrono::DateTime<chrono::FixedOffset>,
    ) -> Result<(), PostError> {
        for consumption in &plan.lot_consumptions {
            lot_consumptions::ActiveModel {
                id: Set(Uuid::now_v7()),
                sell_leg_id: Set(consumption.sell_leg_id.into_inner()),
                tax_lot_id: Set(consumption.tax_lot_id.into_inner()),
                quantity_consumed: Set(consumption.quantity_consumed),
                cost_consumed: Set(consumption.cost_consumed),
                created_at: Set(now),
            }
            .insert(txn)
            .await?;

            tax_lots::Entity::update_many()
                .col_expr(
                    tax_lots::Column::RemainingQuantity,
                    Expr::col(tax_lots::Column::RemainingQuantity)
                        .sub(consumption.quantity_consumed),
                )
                .col_expr(
                    tax_lots::Column::CostBasis,
                    Expr::col(tax_lots::Column::CostBasis).sub(consumption.cost_consumed),
                )
                .filter(tax_lots::Column::Id.eq(consumption.tax_lot_id.into_inner()))
                .exec(txn)
                .await?;
        }
        Ok(())
    }
}

fn to_account_ref(model: accounts::Model) -> AccountRef {
    AccountRef {
        id: AccountId::from_uuid(model.id),
        name: model.name,
        is_active: model.is_active,
    }
}

fn to_asset_ref(model: assets::Model) -> AssetRef {
    AssetRef {
        id: AssetId::from_uuid(model.id),
        ticker: model.ticker,
        name: model.name,
        asset_class: model.asset_class.into(),
        currency_code: model.currency_code,
        is_active: model.is_active,
    }
}

fn to_debt_ref(model: debts::Model) -> DebtRef {
    DebtRef {
        id: DebtId::from_uuid(model.id),
        lender_name: model.lender_name,
        remaining_principal: model.remaining_principal,
        interest_rate: model.interest_rate,
        currency_code: model.currency_code,
        status: model.status.into(),
    }
}

fn to_open_lot(model: tax_lots::Model) -> OpenLot {
    OpenLot {
        id: folio_shared::types::TaxLotId::from_uuid(model.id),
        asset_id: AssetId::from_uuid(model.asset_id),
        creation_date: model.creation_date,
        original_quantity: model.original_quantity,
        remaining_quantity: model.remaining_quantity,
        cost_basis: model.cost_basis,
    }
}
