//! Portfolio metrics: balance sheet, performance, realized P/L, chart
//! downsampling, and snapshot derivation.

pub mod balance_sheet;
#[allow(clippy::float_arithmetic, clippy::float_cmp)]
pub mod performance;
pub mod pnl;
pub mod sampling;
pub mod snapshot;
