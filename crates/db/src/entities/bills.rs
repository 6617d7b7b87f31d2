//! `SeaORM` Entity for bills table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{BillStatus, BillType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub vendor_id: Uuid,
    pub bill_number: String,
    pub bill_date: Date,
    pub bill_type: BillType,
    pub status: BillStatus,
    pub amount_subtotal: Decimal,
    pub amount_tax: Decimal,
    pub amount_total: Decimal,
    pub is_authorized: bool,
    pub authorized_by: Option<Uuid>,
    pub authorized_at: Option<DateTimeWithTimeZone>,
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
        belongs_to = "super::vendors::Entity",
        from = "Column::VendorId",
        to = "super::vendors::Column::Id"
    )]
    Vendors,
    #[sea_orm(has_many = "super::bill_items::Entity")]
    BillItems,
    #[sea_orm(has_many = "super::proxy_bills::Entity")]
    ProxyBills,
    #[sea_orm(has_many = "super::credit_entries::Entity")]
    CreditEntries,
}

impl Related<super::tenants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenants.def()
    }
}

impl Related<super::vendors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendors.def()
    }
}

impl Related<super::bill_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillItems.def()
    }
}

impl Related<super::proxy_bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProxyBills.def()
    }
}

impl Related<super::credit_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
