//! Core business logic for Folio.
//!
//! This crate contains pure domain logic with zero web or database
//! dependencies:
//! - Transaction request validation
//! - Description synthesis for blank memos
//! - The ledger posting engine (balanced legs, tax lots, debts)
//! - Portfolio metrics (balance sheet, TWR, CAGR, Sharpe, P/L, sampling)
//!
//! Everything here is deterministic and testable without I/O. The db crate
//! assembles a [`ledger::PostingContext`] from persisted rows, the posting
//! engine produces a [`ledger::PostingPlan`], and the db crate commits the
//! plan inside a single database transaction.

pub mod ledger;
pub mod metrics;
