//! Initial database migration.
//!
//! Creates the ledger tables (accounts, assets, transactions, legs, tax lots,
//! lot consumptions, debts) and the market-data and snapshot tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: REFERENCE TABLES
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(ASSETS_SQL).await?;

        // ============================================================
        // PART 3: LEDGER
        // ============================================================
        db.execute_unprepared(DEBTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TRANSACTION_LEGS_SQL).await?;
        db.execute_unprepared(TAX_LOTS_SQL).await?;
        db.execute_unprepared(LOT_CONSUMPTIONS_SQL).await?;

        // ============================================================
        // PART 4: MARKET DATA
        // ============================================================
        db.execute_unprepared(DAILY_SECURITY_PRICES_SQL).await?;
        db.execute_unprepared(DAILY_EXCHANGE_RATES_SQL).await?;
        db.execute_unprepared(DAILY_MARKET_INDICES_SQL).await?;

        // ============================================================
        // PART 5: DERIVED SNAPSHOTS
        // ============================================================
        db.execute_unprepared(DAILY_PERFORMANCE_SNAPSHOTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Account kinds
CREATE TYPE account_kind AS ENUM (
    'brokerage',
    'bank',
    'wallet',
    'conceptual'
);

-- Asset classes
CREATE TYPE asset_class AS ENUM (
    'cash',
    'stock',
    'crypto',
    'fund',
    'equity',
    'liability',
    'index'
);

-- Transaction kinds
CREATE TYPE transaction_kind AS ENUM (
    'deposit',
    'withdraw',
    'buy',
    'sell',
    'income',
    'expense',
    'dividend',
    'borrow',
    'debt_payment',
    'split'
);

-- Tax lot origin
CREATE TYPE lot_origin AS ENUM ('purchase', 'split');

-- Debt lifecycle
CREATE TYPE debt_status AS ENUM ('active', 'paid_off');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL UNIQUE,
    kind account_kind NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ASSETS_SQL: &str = r"
CREATE TABLE assets (
    id UUID PRIMARY KEY,
    ticker VARCHAR(50) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    asset_class asset_class NOT NULL,
    currency_code CHAR(3) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    logo_url VARCHAR(500),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_asset_currency_format CHECK (currency_code ~ '^[A-Z]{3}$')
);

CREATE INDEX idx_assets_class ON assets(asset_class) WHERE is_active = true;
";

const DEBTS_SQL: &str = r"
CREATE TABLE debts (
    id UUID PRIMARY KEY,
    lender_name VARCHAR(255) NOT NULL,
    principal_amount NUMERIC(19, 4) NOT NULL,
    remaining_principal NUMERIC(19, 4) NOT NULL,
    interest_rate NUMERIC(9, 4) NOT NULL,
    currency_code CHAR(3) NOT NULL,
    start_date DATE NOT NULL,
    status debt_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_principal_positive CHECK (principal_amount > 0),
    CONSTRAINT chk_remaining_non_negative CHECK (remaining_principal >= 0)
);

CREATE INDEX idx_debts_status ON debts(status);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    transaction_date DATE NOT NULL,
    kind transaction_kind NOT NULL,
    description VARCHAR(500) NOT NULL,
    price NUMERIC(19, 8),
    related_debt_id UUID REFERENCES debts(id),
    source_asset_id UUID REFERENCES assets(id),
    realized_gain NUMERIC(19, 4),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_transactions_date ON transactions(transaction_date);
CREATE INDEX idx_transactions_kind ON transactions(kind, transaction_date);
";

const TRANSACTION_LEGS_SQL: &str = r"
CREATE TABLE transaction_legs (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    asset_id UUID NOT NULL REFERENCES assets(id),
    currency_code CHAR(3) NOT NULL,
    quantity NUMERIC(19, 8) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_legs_transaction ON transaction_legs(transaction_id);
CREATE INDEX idx_legs_asset ON transaction_legs(asset_id);
CREATE INDEX idx_legs_account ON transaction_legs(account_id);
";

const TAX_LOTS_SQL: &str = r"
CREATE TABLE tax_lots (
    id UUID PRIMARY KEY,
    asset_id UUID NOT NULL REFERENCES assets(id),
    creation_transaction_id UUID NOT NULL REFERENCES transactions(id),
    creation_date DATE NOT NULL,
    original_quantity NUMERIC(19, 8) NOT NULL,
    remaining_quantity NUMERIC(19, 8) NOT NULL,
    cost_basis NUMERIC(19, 4) NOT NULL,
    origin lot_origin NOT NULL DEFAULT 'purchase',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_remaining_within_original CHECK (remaining_quantity >= 0)
);

-- FIFO consumption order
CREATE INDEX idx_tax_lots_fifo ON tax_lots(asset_id, creation_date, id)
    WHERE remaining_quantity > 0;
";

const LOT_CONSUMPTIONS_SQL: &str = r"
CREATE TABLE lot_consumptions (
    id UUID PRIMARY KEY,
    sell_leg_id UUID NOT NULL REFERENCES transaction_legs(id) ON DELETE CASCADE,
    tax_lot_id UUID NOT NULL REFERENCES tax_lots(id),
    quantity_consumed NUMERIC(19, 8) NOT NULL,
    cost_consumed NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_consumed_positive CHECK (quantity_consumed > 0)
);

CREATE INDEX idx_lot_consumptions_lot ON lot_consumptions(tax_lot_id);
CREATE INDEX idx_lot_consumptions_leg ON lot_consumptions(sell_leg_id);
";

const DAILY_SECURITY_PRICES_SQL: &str = r"
CREATE TABLE daily_security_prices (
    id UUID PRIMARY KEY,
    asset_id UUID NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
    price_date DATE NOT NULL,
    price NUMERIC(19, 8) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_price_positive CHECK (price > 0),
    UNIQUE (asset_id, price_date)
);

CREATE INDEX idx_prices_lookup ON daily_security_prices(asset_id, price_date DESC);
";

const DAILY_EXCHANGE_RATES_SQL: &str = r"
CREATE TABLE daily_exchange_rates (
    id UUID PRIMARY KEY,
    currency_code CHAR(3) NOT NULL,
    rate_date DATE NOT NULL,
    rate NUMERIC(19, 10) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_rate_positive CHECK (rate > 0),
    UNIQUE (currency_code, rate_date)
);

CREATE INDEX idx_fx_lookup ON daily_exchange_rates(currency_code, rate_date DESC);
";

const DAILY_MARKET_INDICES_SQL: &str = r"
CREATE TABLE daily_market_indices (
    id UUID PRIMARY KEY,
    symbol VARCHAR(50) NOT NULL,
    index_date DATE NOT NULL,
    close_value NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (symbol, index_date)
);
";

const DAILY_PERFORMANCE_SNAPSHOTS_SQL: &str = r"
CREATE TABLE daily_performance_snapshots (
    id UUID PRIMARY KEY,
    snapshot_date DATE NOT NULL UNIQUE,
    net_equity_value NUMERIC(19, 4) NOT NULL,
    net_cash_flow NUMERIC(19, 4) NOT NULL,
    equity_index NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS daily_performance_snapshots CASCADE;
DROP TABLE IF EXISTS daily_market_indices CASCADE;
DROP TABLE IF EXISTS daily_exchange_rates CASCADE;
DROP TABLE IF EXISTS daily_security_prices CASCADE;
DROP TABLE IF EXISTS lot_consumptions CASCADE;
DROP TABLE IF EXISTS tax_lots CASCADE;
DROP TABLE IF EXISTS transaction_legs CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS debts CASCADE;
DROP TABLE IF EXISTS assets CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;

DROP TYPE IF EXISTS debt_status;
DROP TYPE IF EXISTS lot_origin;
DROP TYPE IF EXISTS transaction_kind;
DROP TYPE IF EXISTS asset_class;
DROP TYPE IF EXISTS account_kind;
";
