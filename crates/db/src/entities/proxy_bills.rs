//! `SeaORM` Entity for proxy_bills table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::BillStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "proxy_bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub parent_bill_id: Uuid,
    pub vendor_id: Uuid,
    pub proxy_number: String,
    pub status: BillStatus,
    pub amount_total: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenants::Entity",
        from = "Column::TenantId",
        to = "super::tenants::Column::Id"
    )]
    Tenants,
    #[sea_orm(
        belongs_to = "super::bills::Entity",
        from = "Column::ParentBillId",
        to = "super::bills::Column::Id"
    )]
    Bills,
    #[sea_orm(
        belongs_to = "super::vendors::Entity",
        from = "Column::VendorId",
        to = "super::vendors::Column::Id"
    )]
    Vendors,
    #[sea_orm(has_many = "super::proxy_bill_items::Entity")]
    ProxyBillItems,
    #[sea_orm(has_many = "super::credit_entries::Entity")]
    CreditEntries,
}

impl Related<super::tenants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenants.def()
    }
}

impl Related<super::bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bills.def()
    }
}

impl Related<super::vendors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendors.def()
    }
}

impl Related<super::proxy_bill_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProxyBillItems.def()
    }
}

impl Related<super::credit_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
