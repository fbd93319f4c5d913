//! `SeaORM` Entity for the tax_lots table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LotOrigin;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tax_lots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub asset_id: Uuid,
    pub creation_transaction_id: Uuid,
    pub creation_date: Date,
    pub original_quantity: Decimal,
    pub remaining_quantity: Decimal,
    pub cost_basis: Decimal,
    pub origin: LotOrigin,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assets::Entity",
        from = "Column::AssetId",
        to = "super::assets::Column::Id"
    )]
    Assets,
    #[sea_orm(has_many = "super::lot_consumptions::Entity")]
    LotConsumptions,
}

impl Related<super::assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assets.def()
    }
}

impl Related<super::lot_consumptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LotConsumptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
