//! `SeaORM` active enums backing the PostgreSQL enum types.
//!
//! Conversions to and from the core domain enums live here so the
//! repositories and service layer never match on database types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use khata_core::billing::{BillStatus as CoreBillStatus, BillType as CoreBillType};
use khata_core::recon::{
    CreditDirection as CoreCreditDirection, PaymentMethod as CorePaymentMethod,
};
use khata_core::vendor::VendorType as CoreVendorType;

/// Vendor classification.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "vendor_type")]
pub enum VendorType {
    /// We buy from them.
    #[sea_orm(string_value = "SUPPLIER")]
    Supplier,
    /// We sell to them.
    #[sea_orm(string_value = "CUSTOMER")]
    Customer,
    /// Both directions.
    #[sea_orm(string_value = "BOTH")]
    Both,
}

/// Bill lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "bill_status")]
pub enum BillStatus {
    /// Draft.
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    /// Confirmed.
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    /// Cancelled.
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// Bill classification.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "bill_type")]
pub enum BillType {
    /// Purchase.
    #[sea_orm(string_value = "PURCHASE")]
    Purchase,
    /// Sale.
    #[sea_orm(string_value = "SALE")]
    Sale,
}

/// Credit entry direction.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "credit_direction")]
pub enum CreditDirection {
    /// Money received.
    #[sea_orm(string_value = "INCOMING")]
    Incoming,
    /// Money paid out.
    #[sea_orm(string_value = "OUTGOING")]
    Outgoing,
}

/// Payment method.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
pub enum PaymentMethod {
    /// Cash.
    #[sea_orm(string_value = "CASH")]
    Cash,
    /// Cheque.
    #[sea_orm(string_value = "CHEQUE")]
    Cheque,
    /// Bank transfer.
    #[sea_orm(string_value = "BANK_TRANSFER")]
    BankTransfer,
    /// UPI.
    #[sea_orm(string_value = "UPI")]
    Upi,
    /// Anything else.
    #[sea_orm(string_value = "OTHER")]
    Other,
}

impl From<CoreVendorType> for VendorType {
    fn from(value: CoreVendorType) -> Self {
        match value {
            CoreVendorType::Supplier => Self::Supplier,
            CoreVendorType::Customer => Self::Customer,
            CoreVendorType::Both => Self::Both,
        }
    }
}

impl From<VendorType> for CoreVendorType {
    fn from(value: VendorType) -> Self {
        match value {
            VendorType::Supplier => Self::Supplier,
            VendorType::Customer => Self::Customer,
            VendorType::Both => Self::Both,
        }
    }
}

impl From<CoreBillStatus> for BillStatus {
    fn from(value: CoreBillStatus) -> Self {
        match value {
            CoreBillStatus::Draft => Self::Draft,
            CoreBillStatus::Confirmed => Self::Confirmed,
            CoreBillStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<BillStatus> for CoreBillStatus {
    fn from(value: BillStatus) -> Self {
        match value {
            BillStatus::Draft => Self::Draft,
            BillStatus::Confirmed => Self::Confirmed,
            BillStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<CoreBillType> for BillType {
    fn from(value: CoreBillType) -> Self {
        match value {
            CoreBillType::Purchase => Self::Purchase,
            CoreBillType::Sale => Self::Sale,
        }
    }
}

impl From<BillType> for CoreBillType {
    fn from(value: BillType) -> Self {
        match value {
            BillType::Purchase => Self::Purchase,
            BillType::Sale => Self::Sale,
        }
    }
}

impl From<CoreCreditDirection> for CreditDirection {
    fn from(value: CoreCreditDirection) -> Self {
        match value {
            CoreCreditDirection::Incoming => Self::Incoming,
            CoreCreditDirection::Outgoing => Self::Outgoing,
        }
    }
}

impl From<CreditDirection> for CoreCreditDirection {
    fn from(value: CreditDirection) -> Self {
        match value {
            CreditDirection::Incoming => Self::Incoming,
            CreditDirection::Outgoing => Self::Outgoing,
        }
    }
}

impl From<CorePaymentMethod> for PaymentMethod {
    fn from(value: CorePaymentMethod) -> Self {
        match value {
            CorePaymentMethod::Cash => Self::Cash,
            CorePaymentMethod::Cheque => Self::Cheque,
            CorePaymentMethod::BankTransfer => Self::BankTransfer,
            CorePaymentMethod::Upi => Self::Upi,
            CorePaymentMethod::Other => Self::Other,
        }
    }
}

impl From<PaymentMethod> for CorePaymentMethod {
    fn from(value: PaymentMethod) -> Self {
        match value {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Cheque => Self::Cheque,
            PaymentMethod::BankTransfer => Self::BankTransfer,
            PaymentMethod::Upi => Self::Upi,
            PaymentMethod::Other => Self::Other,
        }
    }
}
