//! `SeaORM` Entity for proxy_bill_items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "proxy_bill_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub proxy_bill_id: Uuid,
    pub position: i32,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::proxy_bills::Entity",
        from = "Column::ProxyBillId",
        to = "super::proxy_bills::Column::Id"
    )]
    ProxyBills,
}

impl Related<super::proxy_bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProxyBills.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
