//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. The posting repository is the single write path for
//! ledger transactions.

pub mod account;
pub mod asset;
pub mod debt;
pub mod posting;
pub mod reporting;
pub mod snapshot;

pub use account::{AccountError, AccountRepository, CreateAccountInput};
pub use asset::{AssetError, AssetRepository, CreateAssetInput};
pub use debt::{DebtError, DebtRepository};
pub use posting::{PostError, PostingRepository, TransactionFilter};
pub use reporting::{ReportingError, ReportingRepository};
pub use snapshot::{SnapshotError, SnapshotRepository};
