//! `SeaORM` Entity for the lot_consumptions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "lot_consumptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sell_leg_id: Uuid,
    pub tax_lot_id: Uuid,
    pub quantity_consumed: Decimal,
    pub cost_consumed: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tax_lots::Entity",
        from = "Column::TaxLotId",
        to = "super::tax_lots::Column::Id"
    )]
    TaxLots,
    #[sea_orm(
        belongs_to = "super::transaction_legs::Entity",
        from = "Column::SellLegId",
        to = "super::transaction_legs::Column::Id"
    )]
    TransactionLegs,
}

impl Related<super::tax_lots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaxLots.def()
    }
}

impl Related<super::transaction_legs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionLegs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
