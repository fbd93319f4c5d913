//! Posting engine error types.
//!
//! Lookup failures are reported with the offending ID, business-rule
//! violations with the amounts involved. Every variant maps to an error
//! code and an HTTP status so the api crate never inspects variants.

use rust_decimal::Decimal;
use thiserror::Error;

use folio_shared::types::{AccountId, AssetId, DebtId};

/// Errors that can occur while planning a posting.
#[derive(Debug, Error)]
pub enum PostingError {
    // ========== Lookup Errors ==========
    /// Referenced account does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Referenced asset does not exist.
    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    /// Referenced debt does not exist.
    #[error("Debt not found: {0}")]
    DebtNotFound(DebtId),

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Asset is inactive and cannot be posted to.
    #[error("Asset {0} is inactive")]
    AssetInactive(AssetId),

    /// No equity offset account/asset is configured.
    #[error("No equity offset is configured")]
    MissingEquityOffset,

    /// No liability account/asset is configured for debt postings.
    #[error("No liability offset is configured")]
    MissingLiabilityOffset,

    /// No holding account could be resolved for a split.
    #[error("No holding account found for the split asset")]
    MissingHoldingAccount,

    // ========== Business Rule Errors ==========
    /// Not enough remaining lot quantity to cover a sale.
    #[error("Insufficient lots: requested {requested}, available {available}")]
    InsufficientLots {
        /// Quantity the sale needs.
        requested: Decimal,
        /// Total remaining quantity across open lots.
        available: Decimal,
    },

    /// Payment against a debt that is already paid off.
    #[error("Debt {0} is already paid off")]
    DebtAlreadyPaidOff(DebtId),

    /// Principal payment larger than the outstanding principal.
    #[error("Payment {payment} exceeds remaining principal {remaining}")]
    PaymentExceedsPrincipal {
        /// Principal portion of the payment.
        payment: Decimal,
        /// Principal outstanding before the payment.
        remaining: Decimal,
    },

    /// Planned legs do not sum to zero. Indicates a planning bug.
    #[error("Legs do not balance: sum is {sum}")]
    UnbalancedLegs {
        /// The non-zero amount sum.
        sum: Decimal,
    },
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AssetNotFound(_) => "ASSET_NOT_FOUND",
            Self::DebtNotFound(_) => "DEBT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::AssetInactive(_) => "ASSET_INACTIVE",
            Self::MissingEquityOffset => "MISSING_EQUITY_OFFSET",
            Self::MissingLiabilityOffset => "MISSING_LIABILITY_OFFSET",
            Self::MissingHoldingAccount => "MISSING_HOLDING_ACCOUNT",
            Self::InsufficientLots { .. } => "INSUFFICIENT_LOTS",
            Self::DebtAlreadyPaidOff(_) => "DEBT_ALREADY_PAID_OFF",
            Self::PaymentExceedsPrincipal { .. } => "PAYMENT_EXCEEDS_PRINCIPAL",
            Self::UnbalancedLegs { .. } => "UNBALANCED_LEGS",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Lookup failures surface as 400 (the caller referenced an invalid
    /// id), business-rule violations as 422.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::AccountNotFound(_)
            | Self::AssetNotFound(_)
            | Self::DebtNotFound(_)
            | Self::AccountInactive(_)
            | Self::AssetInactive(_)
            | Self::MissingEquityOffset
            | Self::MissingLiabilityOffset
            | Self::MissingHoldingAccount => 400,

            Self::InsufficientLots { .. }
            | Self::DebtAlreadyPaidOff(_)
            | Self::PaymentExceedsPrincipal { .. } => 422,

            Self::UnbalancedLegs { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PostingError::InsufficientLots {
                requested: dec!(10),
                available: dec!(5),
            }
            .error_code(),
            "INSUFFICIENT_LOTS"
        );
        assert_eq!(
            PostingError::DebtAlreadyPaidOff(DebtId::new()).error_code(),
            "DEBT_ALREADY_PAID_OFF"
        );
        assert_eq!(
            PostingError::PaymentExceedsPrincipal {
                payment: dec!(100),
                remaining: dec!(50),
            }
            .error_code(),
            "PAYMENT_EXCEEDS_PRINCIPAL"
        );
        assert_eq!(
            PostingError::UnbalancedLegs { sum: dec!(1) }.error_code(),
            "UNBALANCED_LEGS"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            PostingError::AccountNotFound(AccountId::new()).http_status_code(),
            400
        );
        assert_eq!(
            PostingError::InsufficientLots {
                requested: dec!(10),
                available: dec!(5),
            }
            .http_status_code(),
            422
        );
        assert_eq!(
            PostingError::DebtAlreadyPaidOff(DebtId::new()).http_status_code(),
            422
        );
        assert_eq!(
            PostingError::UnbalancedLegs { sum: dec!(1) }.http_status_code(),
            500
        );
    }

    #[test]
    fn test_error_display() {
        let err = PostingError::InsufficientLots {
            requested: dec!(10),
            available: dec!(5.5),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient lots: requested 10, available 5.5"
        );
    }
}
