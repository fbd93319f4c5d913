//! Ledger domain types: the tagged transaction request union, resolved
//! reference rows, and the posting plan produced by the engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use folio_shared::types::{AccountId, AssetId, DebtId, LegId, TaxLotId, TransactionId};

/// Asset classification determining balance-sheet grouping and sign
/// conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// Cash or cash equivalents.
    Cash,
    /// Listed stock.
    Stock,
    /// Cryptocurrency.
    Crypto,
    /// Pooled fund (retirement/provident schemes included).
    #[serde(alias = "epf")]
    Fund,
    /// Contributed capital and retained earnings offsets.
    Equity,
    /// Debts and other obligations.
    Liability,
    /// Market index, used for benchmarking only.
    Index,
}

impl AssetClass {
    /// Returns true if this class appears on the asset side of the
    /// balance sheet.
    #[must_use]
    pub fn is_balance_sheet_asset(&self) -> bool {
        matches!(self, Self::Cash | Self::Stock | Self::Crypto | Self::Fund)
    }

    /// Returns true if positions in this class are tracked with tax lots.
    #[must_use]
    pub fn uses_tax_lots(&self) -> bool {
        matches!(self, Self::Stock | Self::Crypto | Self::Fund)
    }

    /// Returns the lowercase wire name of this class.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Stock => "stock",
            Self::Crypto => "crypto",
            Self::Fund => "fund",
            Self::Equity => "equity",
            Self::Liability => "liability",
            Self::Index => "index",
        }
    }
}

/// The ten transaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Capital contribution into an account.
    Deposit,
    /// Capital withdrawal from an account.
    Withdraw,
    /// Purchase of a security.
    Buy,
    /// Sale of a security.
    Sell,
    /// Earnings credited to an account.
    Income,
    /// Spending debited from an account.
    Expense,
    /// Cash dividend received from a held security.
    Dividend,
    /// Loan received from a lender.
    Borrow,
    /// Repayment against an active debt.
    DebtPayment,
    /// Stock split adjusting share count at zero cost.
    Split,
}

impl TransactionKind {
    /// Returns the snake_case wire name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Dividend => "dividend",
            Self::Borrow => "borrow",
            Self::DebtPayment => "debt_payment",
            Self::Split => "split",
        }
    }
}

/// Origin of a tax lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotOrigin {
    /// Created by a buy transaction.
    Purchase,
    /// Created by a stock split.
    Split,
}

/// Debt lifecycle status. `PaidOff` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    /// Debt has outstanding principal.
    Active,
    /// Principal fully repaid. No further payments accepted.
    PaidOff,
}

fn default_zero() -> Decimal {
    Decimal::ZERO
}

/// A transaction request, tagged by `transaction_type`.
///
/// Unknown tags are rejected at deserialization. The hyphenated aliases
/// accept the field names used by the original web forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "transaction_type", rename_all = "snake_case")]
pub enum TransactionRequest {
    /// Capital contribution: cash in, equity offset.
    Deposit {
        /// Date of the transaction.
        transaction_date: NaiveDate,
        /// Receiving account.
        account: AccountId,
        /// Cash asset credited.
        asset: AssetId,
        /// Amount of cash units (> 0).
        quantity: Decimal,
        /// Optional memo. Synthesized when absent.
        description: Option<String>,
    },
    /// Capital withdrawal: mirror of deposit.
    Withdraw {
        /// Date of the transaction.
        transaction_date: NaiveDate,
        /// Source account.
        account: AccountId,
        /// Cash asset debited.
        asset: AssetId,
        /// Amount of cash units (> 0).
        quantity: Decimal,
        /// Optional memo.
        description: Option<String>,
    },
    /// Earnings credited to an account, attributed to P/L.
    Income {
        /// Date of the transaction.
        transaction_date: NaiveDate,
        /// Receiving account.
        account: AccountId,
        /// Cash asset credited.
        asset: AssetId,
        /// Amount of cash units (> 0).
        quantity: Decimal,
        /// Optional memo.
        description: Option<String>,
    },
    /// Spending debited from an account, attributed to P/L.
    Expense {
        /// Date of the transaction.
        transaction_date: NaiveDate,
        /// Source account.
        account: AccountId,
        /// Cash asset debited.
        asset: AssetId,
        /// Amount of cash units (> 0).
        quantity: Decimal,
        /// Optional memo.
        description: Option<String>,
    },
    /// Cash dividend from a held security.
    Dividend {
        /// Date of the transaction.
        transaction_date: NaiveDate,
        /// Receiving account.
        account: AccountId,
        /// Cash asset credited.
        asset: AssetId,
        /// The security paying the dividend.
        #[serde(alias = "dividend-asset")]
        dividend_asset: AssetId,
        /// Cash amount received (> 0).
        quantity: Decimal,
        /// Optional memo.
        description: Option<String>,
    },
    /// Purchase of a security, creating a tax lot.
    Buy {
        /// Date of the transaction.
        transaction_date: NaiveDate,
        /// Holding account.
        account: AccountId,
        /// The security acquired.
        asset: AssetId,
        /// The cash asset settling the purchase.
        cash_asset_id: AssetId,
        /// Units acquired (> 0).
        quantity: Decimal,
        /// Price per unit (>= 0).
        price: Decimal,
        /// Transaction fees (>= 0, defaults to 0).
        #[serde(default = "default_zero")]
        fees: Decimal,
        /// Optional memo.
        description: Option<String>,
    },
    /// Sale of a security, consuming tax lots FIFO.
    Sell {
        /// Date of the transaction.
        transaction_date: NaiveDate,
        /// Holding account.
        account: AccountId,
        /// The security sold.
        asset: AssetId,
        /// The cash asset receiving the proceeds.
        cash_asset_id: AssetId,
        /// Units sold (> 0).
        quantity: Decimal,
        /// Price per unit (>= 0).
        price: Decimal,
        /// Transaction fees (>= 0, defaults to 0).
        #[serde(default = "default_zero")]
        fees: Decimal,
        /// Taxes withheld (>= 0, defaults to 0).
        #[serde(default = "default_zero")]
        taxes: Decimal,
        /// Optional memo.
        description: Option<String>,
    },
    /// Loan received, creating an active debt.
    Borrow {
        /// Date of the transaction.
        transaction_date: NaiveDate,
        /// Lender name, free text.
        lender: String,
        /// Loan principal (> 0).
        principal: Decimal,
        /// Annual interest rate as a percentage (>= 0).
        #[serde(alias = "interest-rate")]
        interest_rate: Decimal,
        /// Account receiving the principal.
        #[serde(alias = "deposit-account")]
        deposit_account: AccountId,
        /// Cash asset received.
        asset: AssetId,
        /// Optional memo.
        description: Option<String>,
    },
    /// Repayment against an active debt.
    DebtPayment {
        /// Date of the transaction.
        transaction_date: NaiveDate,
        /// The debt being repaid.
        debt: DebtId,
        /// Account the payment is drawn from.
        #[serde(alias = "from-account")]
        from_account: AccountId,
        /// Principal portion of the payment (> 0).
        #[serde(alias = "principal-payment")]
        principal_payment: Decimal,
        /// Interest portion of the payment (>= 0, defaults to 0).
        #[serde(alias = "interest-payment", default = "default_zero")]
        interest_payment: Decimal,
        /// Cash asset debited.
        asset: AssetId,
        /// Optional memo.
        description: Option<String>,
    },
    /// Stock split: new shares at zero cost, basis redistributed.
    Split {
        /// Date of the transaction.
        transaction_date: NaiveDate,
        /// The security splitting.
        asset: AssetId,
        /// Net new shares received (> 0).
        #[serde(alias = "split-quantity")]
        split_quantity: Decimal,
        /// Optional memo.
        description: Option<String>,
    },
}

impl TransactionRequest {
    /// Returns the kind of this request.
    #[must_use]
    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Deposit { .. } => TransactionKind::Deposit,
            Self::Withdraw { .. } => TransactionKind::Withdraw,
            Self::Buy { .. } => TransactionKind::Buy,
            Self::Sell { .. } => TransactionKind::Sell,
            Self::Income { .. } => TransactionKind::Income,
            Self::Expense { .. } => TransactionKind::Expense,
            Self::Dividend { .. } => TransactionKind::Dividend,
            Self::Borrow { .. } => TransactionKind::Borrow,
            Self::DebtPayment { .. } => TransactionKind::DebtPayment,
            Self::Split { .. } => TransactionKind::Split,
        }
    }

    /// Returns the transaction date.
    #[must_use]
    pub fn transaction_date(&self) -> NaiveDate {
        match self {
            Self::Deposit {
                transaction_date, ..
            }
            | Self::Withdraw {
                transaction_date, ..
            }
            | Self::Buy {
                transaction_date, ..
            }
            | Self::Sell {
                transaction_date, ..
            }
            | Self::Income {
                transaction_date, ..
            }
            | Self::Expense {
                transaction_date, ..
            }
            | Self::Dividend {
                transaction_date, ..
            }
            | Self::Borrow {
                transaction_date, ..
            }
            | Self::DebtPayment {
                transaction_date, ..
            }
            | Self::Split {
                transaction_date, ..
            } => *transaction_date,
        }
    }

    /// Returns the caller-supplied description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Deposit { description, .. }
            | Self::Withdraw { description, .. }
            | Self::Buy { description, .. }
            | Self::Sell { description, .. }
            | Self::Income { description, .. }
            | Self::Expense { description, .. }
            | Self::Dividend { description, .. }
            | Self::Borrow { description, .. }
            | Self::DebtPayment { description, .. }
            | Self::Split { description, .. } => {
                description.as_deref().filter(|d| !d.trim().is_empty())
            }
        }
    }
}

/// A resolved account row needed by the posting engine.
#[derive(Debug, Clone)]
pub struct AccountRef {
    /// The account ID.
    pub id: AccountId,
    /// Display name, used in synthesized descriptions.
    pub name: String,
    /// Whether the account accepts new postings.
    pub is_active: bool,
}

/// A resolved asset row needed by the posting engine.
#[derive(Debug, Clone)]
pub struct AssetRef {
    /// The asset ID.
    pub id: AssetId,
    /// Ticker symbol, used in synthesized descriptions.
    pub ticker: String,
    /// Display name.
    pub name: String,
    /// Balance-sheet classification.
    pub asset_class: AssetClass,
    /// The asset's currency code.
    pub currency_code: String,
    /// Whether the asset accepts new postings.
    pub is_active: bool,
}

/// A resolved debt row needed by the posting engine.
#[derive(Debug, Clone)]
pub struct DebtRef {
    /// The debt ID.
    pub id: DebtId,
    /// Lender name, used in synthesized descriptions.
    pub lender_name: String,
    /// Outstanding principal.
    pub remaining_principal: Decimal,
    /// Annual interest rate as a percentage.
    pub interest_rate: Decimal,
    /// The debt's currency code.
    pub currency_code: String,
    /// Lifecycle status.
    pub status: DebtStatus,
}

/// An open tax lot (remaining quantity > 0) available for consumption.
///
/// `cost_basis` is the cost of the remaining shares: consumption reduces it
/// proportionally, and split redistribution rewrites it.
#[derive(Debug, Clone)]
pub struct OpenLot {
    /// The lot ID.
    pub id: TaxLotId,
    /// The asset this lot holds.
    pub asset_id: AssetId,
    /// Acquisition date, the FIFO ordering key.
    pub creation_date: NaiveDate,
    /// Quantity at acquisition.
    pub original_quantity: Decimal,
    /// Quantity not yet consumed.
    pub remaining_quantity: Decimal,
    /// Cost of the remaining quantity.
    pub cost_basis: Decimal,
}

/// Resolved rows the posting engine needs, assembled by the repository.
///
/// Only the fields a given transaction kind uses need to be populated;
/// the engine reports a lookup error when a required field is absent.
#[derive(Debug, Clone, Default)]
pub struct PostingContext {
    /// The primary account referenced by the request.
    pub account: Option<AccountRef>,
    /// The primary asset referenced by the request.
    pub asset: Option<AssetRef>,
    /// The settlement cash asset for buy/sell.
    pub cash_asset: Option<AssetRef>,
    /// The dividend-paying security.
    pub dividend_asset: Option<AssetRef>,
    /// Conceptual account absorbing equity offsets.
    pub equity_account: Option<AccountRef>,
    /// Equity-class asset for offset legs.
    pub equity_asset: Option<AssetRef>,
    /// Conceptual account carrying debt obligations.
    pub liability_account: Option<AccountRef>,
    /// Liability-class asset for debt legs.
    pub liability_asset: Option<AssetRef>,
    /// The debt referenced by a debt_payment request.
    pub debt: Option<DebtRef>,
    /// Open tax lots for the sold/split asset, ordered oldest first.
    pub open_lots: Vec<OpenLot>,
}

/// The transaction row to insert.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// The transaction ID.
    pub id: TransactionId,
    /// Date of the transaction.
    pub transaction_date: NaiveDate,
    /// The transaction kind.
    pub kind: TransactionKind,
    /// Memo, caller-supplied or synthesized.
    pub description: String,
    /// Per-unit price for buy/sell, None otherwise.
    pub price: Option<Decimal>,
    /// The debt created or repaid, if any.
    pub related_debt_id: Option<DebtId>,
    /// The security a dividend is attributed to, if any.
    pub source_asset_id: Option<AssetId>,
}

/// A leg row to insert. Signed quantity and amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLeg {
    /// The leg ID.
    pub id: LegId,
    /// Account posted to.
    pub account_id: AccountId,
    /// Asset moved.
    pub asset_id: AssetId,
    /// Currency of the amount.
    pub currency_code: String,
    /// Signed unit change.
    pub quantity: Decimal,
    /// Signed value change. Legs of one transaction sum to zero.
    pub amount: Decimal,
}

/// A tax lot row to insert.
#[derive(Debug, Clone)]
pub struct NewLot {
    /// The lot ID.
    pub id: TaxLotId,
    /// The asset held.
    pub asset_id: AssetId,
    /// The transaction creating the lot.
    pub creation_transaction_id: TransactionId,
    /// Acquisition date.
    pub creation_date: NaiveDate,
    /// Quantity at acquisition.
    pub original_quantity: Decimal,
    /// Remaining quantity, equal to original at creation.
    pub remaining_quantity: Decimal,
    /// Total acquisition cost.
    pub cost_basis: Decimal,
    /// Purchase or split origin.
    pub origin: LotOrigin,
}

/// A consumption row to insert; the repository decrements the lot's
/// remaining quantity and cost basis by these amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotConsumption {
    /// The consumed lot.
    pub tax_lot_id: TaxLotId,
    /// The sell leg drawing down the lot.
    pub sell_leg_id: LegId,
    /// Units consumed from this lot.
    pub quantity_consumed: Decimal,
    /// Proportional cost-basis share consumed.
    pub cost_consumed: Decimal,
}

/// A cost-basis rewrite applied by split redistribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotAdjustment {
    /// The lot to rewrite.
    pub tax_lot_id: TaxLotId,
    /// New cost basis for the remaining quantity.
    pub new_cost_basis: Decimal,
}

/// A debt row to insert (borrow).
#[derive(Debug, Clone)]
pub struct NewDebt {
    /// The debt ID.
    pub id: DebtId,
    /// Lender name.
    pub lender_name: String,
    /// Loan principal.
    pub principal_amount: Decimal,
    /// Outstanding principal, equal to the full principal at creation.
    pub remaining_principal: Decimal,
    /// Annual interest rate as a percentage.
    pub interest_rate: Decimal,
    /// Currency of the principal.
    pub currency_code: String,
    /// Loan start date.
    pub start_date: NaiveDate,
}

/// A debt state change (debt_payment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtUpdate {
    /// The debt updated.
    pub debt_id: DebtId,
    /// Principal outstanding after the payment.
    pub remaining_principal: Decimal,
    /// Status after the payment. `PaidOff` when remaining hits zero.
    pub status: DebtStatus,
}

/// Everything the repository must commit, atomically, for one transaction.
#[derive(Debug, Clone)]
pub struct PostingPlan {
    /// The transaction row.
    pub transaction: NewTransaction,
    /// The balanced leg set.
    pub legs: Vec<NewLeg>,
    /// Lots created by buy/split.
    pub new_lots: Vec<NewLot>,
    /// Lot drawdowns from a sell.
    pub lot_consumptions: Vec<LotConsumption>,
    /// Cost-basis rewrites from a split.
    pub lot_adjustments: Vec<LotAdjustment>,
    /// Debt created by a borrow.
    pub new_debt: Option<NewDebt>,
    /// Debt state change from a debt_payment.
    pub debt_update: Option<DebtUpdate>,
    /// Realized gain on a sell, for reporting.
    pub realized_gain: Option<Decimal>,
}
