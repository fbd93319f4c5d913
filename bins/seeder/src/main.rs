//! Database seeder for Folio development and testing.
//!
//! Seeds the conceptual portfolio account, the equity and liability
//! offset assets, a base cash asset, and a sample brokerage account.
//! The posting engine cannot balance any transaction until the offset
//! rows exist.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use rust_decimal::Decimal;

use folio_db::entities::{
    accounts, assets, daily_exchange_rates, daily_security_prices,
    sea_orm_active_enums::{AccountKind, AssetClass},
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = folio_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding offset rows...");
    seed_account(&db, "Portfolio", AccountKind::Conceptual).await;
    seed_asset(&db, "EQUITY", "Portfolio Equity", AssetClass::Equity, "MYR").await;
    seed_asset(&db, "DEBT", "Portfolio Debt", AssetClass::Liability, "MYR").await;

    println!("Seeding base assets...");
    seed_asset(&db, "MYR", "Malaysian Ringgit", AssetClass::Cash, "MYR").await;
    seed_asset(&db, "USD", "US Dollar", AssetClass::Cash, "USD").await;

    println!("Seeding sample accounts...");
    seed_account(&db, "Main Brokerage", AccountKind::Brokerage).await;
    seed_account(&db, "Savings", AccountKind::Bank).await;

    println!("Seeding sample securities...");
    seed_asset(&db, "MAYBANK", "Malayan Banking Berhad", AssetClass::Stock, "MYR").await;
    seed_asset(&db, "BTC", "Bitcoin", AssetClass::Crypto, "USD").await;
    seed_asset(&db, "EPF", "Employees Provident Fund", AssetClass::Fund, "MYR").await;

    println!("Seeding market data...");
    seed_price(&db, "MAYBANK", dec!(10.20)).await;
    seed_fx_rate(&db, "USD", dec!(4.20)).await;

    println!("Seeding complete!");
}

/// Inserts an account if no account with the name exists yet.
async fn seed_account(db: &DatabaseConnection, name: &str, kind: AccountKind) {
    let existing = accounts::Entity::find()
        .filter(accounts::Column::Name.eq(name))
        .one(db)
        .await
        .ok()
        .flatten();
    if existing.is_some() {
        println!("  Account {name} already exists, skipping...");
        return;
    }

    let account = accounts::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name.to_string()),
        kind: Set(kind),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    };

    if let Err(e) = account.insert(db).await {
        eprintln!("Failed to insert account {name}: {e}");
    } else {
        println!("  Created account: {name}");
    }
}

/// Inserts an asset if no asset with the ticker exists yet.
async fn seed_asset(
    db: &DatabaseConnection,
    ticker: &str,
    name: &str,
    asset_class: AssetClass,
    currency_code: &str,
) {
    let existing = assets::Entity::find()
        .filter(assets::Column::Ticker.eq(ticker))
        .one(db)
        .await
        .ok()
        .flatten();
    if existing.is_some() {
        println!("  Asset {ticker} already exists, skipping...");
        return;
    }

    let asset = assets::ActiveModel {
        id: Set(Uuid::now_v7()),
        ticker: Set(ticker.to_string()),
        name: Set(name.to_string()),
        asset_class: Set(asset_class),
        currency_code: Set(currency_code.to_string()),
        is_active: Set(true),
        logo_url: Set(None),
        created_at: Set(Utc::now().into()),
    };

    if let Err(e) = asset.insert(db).await {
        eprintln!("Failed to insert asset {ticker}: {e}");
    } else {
        println!("  Created asset: {ticker}");
    }
}

/// Inserts a price for today if the asset exists and has none yet.
async fn seed_price(db: &DatabaseConnection, ticker: &str, price: Decimal) {
    let Some(asset) = assets::Entity::find()
        .filter(assets::Column::Ticker.eq(ticker))
        .one(db)
        .await
        .ok()
        .flatten()
    else {
        return;
    };

    let today = Utc::now().date_naive();
    let existing = daily_security_prices::Entity::find()
        .filter(daily_security_prices::Column::AssetId.eq(asset.id))
        .filter(daily_security_prices::Column::PriceDate.eq(today))
        .one(db)
        .await
        .ok()
        .flatten();
    if existing.is_some() {
        println!("  Price for {ticker} already exists, skipping...");
        return;
    }

    let row = daily_security_prices::ActiveModel {
        id: Set(Uuid::now_v7()),
        asset_id: Set(asset.id),
        price_date: Set(today),
        price: Set(price),
        created_at: Set(Utc::now().into()),
    };

    if let Err(e) = row.insert(db).await {
        eprintln!("Failed to insert price for {ticker}: {e}");
    } else {
        println!("  Created price: {ticker} = {price}");
    }
}

/// Inserts today's FX rate into the reporting currency.
async fn seed_fx_rate(db: &DatabaseConnection, currency_code: &str, rate: Decimal) {
    let today = Utc::now().date_naive();
    let existing = daily_exchange_rates::Entity::find()
        .filter(daily_exchange_rates::Column::CurrencyCode.eq(currency_code))
        .filter(daily_exchange_rates::Column::RateDate.eq(today))
        .one(db)
        .await
        .ok()
        .flatten();
    if existing.is_some() {
        println!("  FX rate for {currency_code} already exists, skipping...");
        return;
    }

    let row = daily_exchange_rates::ActiveModel {
        id: Set(Uuid::now_v7()),
        currency_code: Set(currency_code.to_string()),
        rate_date: Set(today),
        rate: Set(rate),
        created_at: Set(Utc::now().into()),
    };

    if let Err(e) = row.insert(db).await {
        eprintln!("Failed to insert FX rate for {currency_code}: {e}");
    } else {
        println!("  Created FX rate: {currency_code} = {rate}");
    }
}
