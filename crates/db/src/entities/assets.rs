//! `SeaORM` Entity for the assets table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AssetClass;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ticker: String,
    pub name: String,
    pub asset_class: AssetClass,
    pub currency_code: String,
    pub is_active: bool,
    pub logo_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction_legs::Entity")]
    TransactionLegs,
    #[sea_orm(has_many = "super::tax_lots::Entity")]
    TaxLots,
}

impl Related<super::transaction_legs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionLegs.def()
    }
}

impl Related<super::tax_lots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaxLots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
