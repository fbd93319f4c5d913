//! `SeaORM` Entity for the transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransactionKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_date: Date,
    pub kind: TransactionKind,
    pub description: String,
    pub price: Option<Decimal>,
    pub related_debt_id: Option<Uuid>,
    pub source_asset_id: Option<Uuid>,
    pub realized_gain: Option<Decimal>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction_legs::Entity")]
    TransactionLegs,
    #[sea_orm(
        belongs_to = "super::debts::Entity",
        from = "Column::RelatedDebtId",
        to = "super::debts::Column::Id"
    )]
    Debts,
}

impl Related<super::transaction_legs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionLegs.def()
    }
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
