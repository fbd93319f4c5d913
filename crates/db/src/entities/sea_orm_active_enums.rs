//! Postgres enum mappings.
//!
//! Each enum mirrors a `CREATE TYPE ... AS ENUM` in the initial migration
//! and converts to and from its `folio_core` counterpart.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use folio_core::ledger::types as core_types;

/// Holding account classification.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_kind")]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Brokerage account.
    #[sea_orm(string_value = "brokerage")]
    Brokerage,
    /// Bank account.
    #[sea_orm(string_value = "bank")]
    Bank,
    /// Crypto or cash wallet.
    #[sea_orm(string_value = "wallet")]
    Wallet,
    /// Conceptual account absorbing equity and liability offsets.
    #[sea_orm(string_value = "conceptual")]
    Conceptual,
}

/// Asset classification.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "asset_class")]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Cash or cash equivalents.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Listed stock.
    #[sea_orm(string_value = "stock")]
    Stock,
    /// Cryptocurrency.
    #[sea_orm(string_value = "crypto")]
    Crypto,
    /// Pooled fund.
    #[sea_orm(string_value = "fund")]
    Fund,
    /// Equity offsets.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Debts and obligations.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Benchmark index.
    #[sea_orm(string_value = "index")]
    Index,
}

impl From<core_types::AssetClass> for AssetClass {
    fn from(value: core_types::AssetClass) -> Self {
        match value {
            core_types::AssetClass::Cash => Self::Cash,
            core_types::AssetClass::Stock => Self::Stock,
            core_types::AssetClass::Crypto => Self::Crypto,
            core_types::AssetClass::Fund => Self::Fund,
            core_types::AssetClass::Equity => Self::Equity,
            core_types::AssetClass::Liability => Self::Liability,
            core_types::AssetClass::Index => Self::Index,
        }
    }
}

impl From<AssetClass> for core_types::AssetClass {
    fn from(value: AssetClass) -> Self {
        match value {
            AssetClass::Cash => Self::Cash,
            AssetClass::Stock => Self::Stock,
            AssetClass::Crypto => Self::Crypto,
            AssetClass::Fund => Self::Fund,
            AssetClass::Equity => Self::Equity,
            AssetClass::Liability => Self::Liability,
            AssetClass::Index => Self::Index,
        }
    }
}

/// Transaction kind.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_kind")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Capital contribution.
    #[sea_orm(string_value = "deposit")]
    Deposit,
    /// Capital withdrawal.
    #[sea_orm(string_value = "withdraw")]
    Withdraw,
    /// Security purchase.
    #[sea_orm(string_value = "buy")]
    Buy,
    /// Security sale.
    #[sea_orm(string_value = "sell")]
    Sell,
    /// Earnings inflow.
    #[sea_orm(string_value = "income")]
    Income,
    /// Spending outflow.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Dividend received.
    #[sea_orm(string_value = "dividend")]
    Dividend,
    /// Loan received.
    #[sea_orm(string_value = "borrow")]
    Borrow,
    /// Debt repayment.
    #[sea_orm(string_value = "debt_payment")]
    DebtPayment,
    /// Stock split.
    #[sea_orm(string_value = "split")]
    Split,
}

impl From<core_types::TransactionKind> for TransactionKind {
    fn from(value: core_types::TransactionKind) -> Self {
        match value {
            core_types::TransactionKind::Deposit => Self::Deposit,
            core_types::TransactionKind::Withdraw => Self::Withdraw,
            core_types::TransactionKind::Buy => Self::Buy,
            core_types::TransactionKind::Sell => Self::Sell,
            core_types::TransactionKind::Income => Self::Income,
            core_types::TransactionKind::Expense => Self::Expense,
            core_types::TransactionKind::Dividend => Self::Dividend,
            core_types::TransactionKind::Borrow => Self::Borrow,
            core_types::TransactionKind::DebtPayment => Self::DebtPayment,
            core_types::TransactionKind::Split => Self::Split,
        }
    }
}

impl From<TransactionKind> for core_types::TransactionKind {
    fn from(value: TransactionKind) -> Self {
        match value {
            TransactionKind::Deposit => Self::Deposit,
            TransactionKind::Withdraw => Self::Withdraw,
            TransactionKind::Buy => Self::Buy,
            TransactionKind::Sell => Self::Sell,
            TransactionKind::Income => Self::Income,
            TransactionKind::Expense => Self::Expense,
            TransactionKind::Dividend => Self::Dividend,
            TransactionKind::Borrow => Self::Borrow,
            TransactionKind::DebtPayment => Self::DebtPayment,
            TransactionKind::Split => Self::Split,
        }
    }
}

/// Tax-lot origin.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "lot_origin")]
#[serde(rename_all = "snake_case")]
pub enum LotOrigin {
    /// Created by a buy.
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Created by a split.
    #[sea_orm(string_value = "split")]
    Split,
}

impl From<core_types::LotOrigin> for LotOrigin {
    fn from(value: core_types::LotOrigin) -> Self {
        match value {
            core_types::LotOrigin::Purchase => Self::Purchase,
            core_types::LotOrigin::Split => Self::Split,
        }
    }
}

/// Debt lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "debt_status")]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    /// Outstanding principal remains.
    #[sea_orm(string_value = "active")]
    Active,
    /// Fully repaid, terminal.
    #[sea_orm(string_value = "paid_off")]
    PaidOff,
}

impl From<core_types::DebtStatus> for DebtStatus {
    fn from(value: core_types::DebtStatus) -> Self {
        match value {
            core_types::DebtStatus::Active => Self::Active,
            core_types::DebtStatus::PaidOff => Self::PaidOff,
        }
    }
}

impl From<DebtStatus> for core_types::DebtStatus {
    fn from(value: DebtStatus) -> Self {
        match value {
            DebtStatus::Active => Self::Active,
            DebtStatus::PaidOff => Self::PaidOff,
        }
    }
}
