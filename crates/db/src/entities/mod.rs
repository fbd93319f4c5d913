//! `SeaORM` entity definitions.

pub mod accounts;
pub mod assets;
pub mod daily_exchange_rates;
pub mod daily_market_indices;
pub mod daily_performance_snapshots;
pub mod daily_security_prices;
pub mod debts;
pub mod lot_consumptions;
pub mod sea_orm_active_enums;
pub mod tax_lots;
pub mod transaction_legs;
pub mod transactions;
