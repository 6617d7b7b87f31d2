//! Initial database migration.
//!
//! Creates all ledger tables, enums, tenant-scoped uniqueness
//! constraints, RLS policies, and the permission catalog seed.

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
        // PART 2: TENANTS & VENDORS
        // ============================================================
        db.execute_unprepared(TENANTS_SQL).await?;
        db.execute_unprepared(VENDORS_SQL).await?;

        // ============================================================
        // PART 3: BILLS & ITEMS
        // ============================================================
        db.execute_unprepared(BILLS_SQL).await?;
        db.execute_unprepared(BILL_ITEMS_SQL).await?;

        // ============================================================
        // PART 4: PROXY BILLS & ITEMS
        // ============================================================
        db.execute_unprepared(PROXY_BILLS_SQL).await?;
        db.execute_unprepared(PROXY_BILL_ITEMS_SQL).await?;

        // ============================================================
        // PART 5: CREDIT ENTRIES
        // ============================================================
        db.execute_unprepared(CREDIT_ENTRIES_SQL).await?;

        // ============================================================
        // PART 6: PERMISSIONS & AUDIT
        // ============================================================
        db.execute_unprepared(PERMISSIONS_SQL).await?;
        db.execute_unprepared(ROLE_PERMISSIONS_SQL).await?;
        db.execute_unprepared(AUDIT_LOGS_SQL).await?;

        // ============================================================
        // PART 7: ROW-LEVEL SECURITY
        // ============================================================
        db.execute_unprepared(RLS_SQL).await?;

        // ============================================================
        // PART 8: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_PERMISSIONS_SQL).await?;

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
-- Vendor classification
CREATE TYPE vendor_type AS ENUM ('SUPPLIER', 'CUSTOMER', 'BOTH');

-- Bill lifecycle (shared by bills and proxy bills)
CREATE TYPE bill_status AS ENUM ('DRAFT', 'CONFIRMED', 'CANCELLED');

-- Bill classification
CREATE TYPE bill_type AS ENUM ('PURCHASE', 'SALE');

-- Credit entry direction
CREATE TYPE credit_direction AS ENUM ('INCOMING', 'OUTGOING');

-- Payment method
CREATE TYPE payment_method AS ENUM (
    'CASH',
    'CHEQUE',
    'BANK_TRANSFER',
    'UPI',
    'OTHER'
);
";

const TENANTS_SQL: &str = r"
CREATE TABLE tenants (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    code TEXT NOT NULL UNIQUE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const VENDORS_SQL: &str = r"
CREATE TABLE vendors (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES tenants(id),
    name TEXT NOT NULL,
    contact_person TEXT,
    phone TEXT,
    address TEXT,
    gst_number TEXT,
    customer_code TEXT,
    vendor_type vendor_type NOT NULL DEFAULT 'CUSTOMER',
    credit_limit NUMERIC(14, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT vendors_credit_limit_non_negative CHECK (credit_limit >= 0)
);

CREATE INDEX idx_vendors_tenant ON vendors(tenant_id);

-- Customer code and GST number are unique per tenant when present
CREATE UNIQUE INDEX uq_vendors_tenant_customer_code
    ON vendors(tenant_id, customer_code)
    WHERE customer_code IS NOT NULL;
CREATE UNIQUE INDEX uq_vendors_tenant_gst_number
    ON vendors(tenant_id, gst_number)
    WHERE gst_number IS NOT NULL;
";

const BILLS_SQL: &str = r"
CREATE TABLE bills (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES tenants(id),
    vendor_id UUID NOT NULL REFERENCES vendors(id),
    bill_number TEXT NOT NULL,
    bill_date DATE NOT NULL,
    bill_type bill_type NOT NULL,
    status bill_status NOT NULL DEFAULT 'DRAFT',
    amount_subtotal NUMERIC(14, 2) NOT NULL,
    amount_tax NUMERIC(14, 2) NOT NULL,
    amount_total NUMERIC(14, 2) NOT NULL,
    is_authorized BOOLEAN NOT NULL DEFAULT FALSE,
    authorized_by UUID,
    authorized_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT bills_total_consistent
        CHECK (amount_total = amount_subtotal + amount_tax),
    CONSTRAINT bills_authorization_stamp_consistent CHECK (
        (is_authorized AND authorized_by IS NOT NULL AND authorized_at IS NOT NULL)
        OR (NOT is_authorized AND authorized_by IS NULL AND authorized_at IS NULL)
    ),
    CONSTRAINT uq_bills_tenant_number UNIQUE (tenant_id, bill_number)
);

CREATE INDEX idx_bills_tenant ON bills(tenant_id);
CREATE INDEX idx_bills_tenant_vendor ON bills(tenant_id, vendor_id);
CREATE INDEX idx_bills_tenant_status ON bills(tenant_id, status);
";

const BILL_ITEMS_SQL: &str = r"
CREATE TABLE bill_items (
    id UUID PRIMARY KEY,
    bill_id UUID NOT NULL REFERENCES bills(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    description TEXT NOT NULL,
    quantity NUMERIC(14, 3) NOT NULL,
    unit_price NUMERIC(14, 2) NOT NULL,
    amount NUMERIC(14, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT bill_items_quantity_positive CHECK (quantity > 0),
    CONSTRAINT bill_items_unit_price_positive CHECK (unit_price > 0)
);

CREATE INDEX idx_bill_items_bill ON bill_items(bill_id);
";

const PROXY_BILLS_SQL: &str = r"
CREATE TABLE proxy_bills (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES tenants(id),
    parent_bill_id UUID NOT NULL REFERENCES bills(id),
    vendor_id UUID NOT NULL REFERENCES vendors(id),
    proxy_number TEXT NOT NULL,
    status bill_status NOT NULL DEFAULT 'DRAFT',
    amount_total NUMERIC(14, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_proxy_bills_tenant_number UNIQUE (tenant_id, proxy_number)
);

CREATE INDEX idx_proxy_bills_tenant ON proxy_bills(tenant_id);
CREATE INDEX idx_proxy_bills_parent ON proxy_bills(parent_bill_id);
CREATE INDEX idx_proxy_bills_tenant_vendor ON proxy_bills(tenant_id, vendor_id);
";

const PROXY_BILL_ITEMS_SQL: &str = r"
CREATE TABLE proxy_bill_items (
    id UUID PRIMARY KEY,
    proxy_bill_id UUID NOT NULL REFERENCES proxy_bills(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    description TEXT NOT NULL,
    quantity NUMERIC(14, 3) NOT NULL,
    unit_price NUMERIC(14, 2) NOT NULL,
    amount NUMERIC(14, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT proxy_bill_items_quantity_positive CHECK (quantity > 0),
    CONSTRAINT proxy_bill_items_unit_price_positive CHECK (unit_price > 0)
);

CREATE INDEX idx_proxy_bill_items_proxy ON proxy_bill_items(proxy_bill_id);
";

const CREDIT_ENTRIES_SQL: &str = r"
CREATE TABLE credit_entries (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES tenants(id),
    vendor_id UUID NOT NULL REFERENCES vendors(id),
    bill_id UUID REFERENCES bills(id),
    proxy_bill_id UUID REFERENCES proxy_bills(id),
    amount NUMERIC(14, 2) NOT NULL,
    direction credit_direction NOT NULL,
    payment_method payment_method NOT NULL DEFAULT 'CASH',
    payment_date DATE NOT NULL,
    reference_number TEXT,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT credit_entries_amount_positive CHECK (amount > 0),
    -- At most one container: bill or proxy bill, never both
    CONSTRAINT credit_entries_single_container
        CHECK (bill_id IS NULL OR proxy_bill_id IS NULL)
);

CREATE INDEX idx_credit_entries_tenant ON credit_entries(tenant_id);
CREATE INDEX idx_credit_entries_tenant_vendor ON credit_entries(tenant_id, vendor_id);
CREATE INDEX idx_credit_entries_bill ON credit_entries(bill_id);
CREATE INDEX idx_credit_entries_proxy ON credit_entries(proxy_bill_id);
";

const PERMISSIONS_SQL: &str = r"
CREATE TABLE permissions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ROLE_PERMISSIONS_SQL: &str = r"
CREATE TABLE role_permissions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    role TEXT NOT NULL,
    permission_id UUID NOT NULL REFERENCES permissions(id),
    granted BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_role_permissions_role_permission UNIQUE (role, permission_id)
);
";

const AUDIT_LOGS_SQL: &str = r"
CREATE TABLE audit_logs (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES tenants(id),
    user_id UUID NOT NULL,
    action TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    entity_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_audit_logs_tenant ON audit_logs(tenant_id);
CREATE INDEX idx_audit_logs_tenant_entity ON audit_logs(tenant_id, entity_type, entity_id);

-- Append-only: nothing updates or deletes audit rows
REVOKE UPDATE, DELETE ON audit_logs FROM PUBLIC;
";

const RLS_SQL: &str = r"
-- Enable and force RLS on every tenant-owned table
ALTER TABLE vendors ENABLE ROW LEVEL SECURITY;
ALTER TABLE vendors FORCE ROW LEVEL SECURITY;
ALTER TABLE bills ENABLE ROW LEVEL SECURITY;
ALTER TABLE bills FORCE ROW LEVEL SECURITY;
ALTER TABLE proxy_bills ENABLE ROW LEVEL SECURITY;
ALTER TABLE proxy_bills FORCE ROW LEVEL SECURITY;
ALTER TABLE credit_entries ENABLE ROW LEVEL SECURITY;
ALTER TABLE credit_entries FORCE ROW LEVEL SECURITY;
ALTER TABLE audit_logs ENABLE ROW LEVEL SECURITY;
ALTER TABLE audit_logs FORCE ROW LEVEL SECURITY;

CREATE POLICY tenant_isolation_vendors ON vendors
    USING (tenant_id = current_setting('app.current_tenant_id', true)::uuid);
CREATE POLICY tenant_isolation_bills ON bills
    USING (tenant_id = current_setting('app.current_tenant_id', true)::uuid);
CREATE POLICY tenant_isolation_proxy_bills ON proxy_bills
    USING (tenant_id = current_setting('app.current_tenant_id', true)::uuid);
CREATE POLICY tenant_isolation_credit_entries ON credit_entries
    USING (tenant_id = current_setting('app.current_tenant_id', true)::uuid);
CREATE POLICY tenant_isolation_audit_logs ON audit_logs
    USING (tenant_id = current_setting('app.current_tenant_id', true)::uuid);
";

const SEED_PERMISSIONS_SQL: &str = r"
INSERT INTO permissions (code, name, description, category) VALUES
    ('view_vendors', 'View Vendors', 'View the vendor list and vendor details', 'Vendors'),
    ('create_vendor', 'Create Vendor', 'Create new vendors', 'Vendors'),
    ('edit_vendor', 'Edit Vendor', 'Edit existing vendors', 'Vendors'),
    ('delete_vendor', 'Delete Vendor', 'Delete vendors with no dependent records', 'Vendors'),
    ('import_vendors', 'Import Vendors', 'Bulk-import vendors from mapped spreadsheet rows', 'Vendors'),
    ('view_bills', 'View Bills', 'View bills and proxy bills', 'Bills'),
    ('create_bill', 'Create Bill', 'Create bills and proxy bill splits', 'Bills'),
    ('confirm_bill', 'Confirm Bill', 'Confirm draft bills and proxy bills', 'Bills'),
    ('cancel_bill', 'Cancel Bill', 'Cancel bills and proxy bills', 'Bills'),
    ('authorize_bill', 'Authorize Bill', 'Toggle a bill''s visibility to the organiser role', 'Bills'),
    ('view_credits', 'View Credits', 'View credit entries', 'Credits'),
    ('create_credit', 'Create Credit', 'Record payments and other credit entries', 'Credits'),
    ('edit_credit', 'Edit Credit', 'Edit existing credit entries', 'Credits'),
    ('view_reports', 'View Reports', 'View outstanding, collection, and dashboard reports', 'Reports'),
    ('manage_permissions', 'Manage Permissions', 'Change role permission grants', 'Administration');

-- Default grants for the non-administrative roles. The ADMIN role has no
-- rows: it is granted everything implicitly and never consulted here.
INSERT INTO role_permissions (role, permission_id, granted)
SELECT r.role, p.id, TRUE
FROM permissions p
JOIN (VALUES
    ('SALESMAN', 'view_vendors'),
    ('SALESMAN', 'create_vendor'),
    ('SALESMAN', 'edit_vendor'),
    ('SALESMAN', 'view_bills'),
    ('SALESMAN', 'create_bill'),
    ('SALESMAN', 'view_credits'),
    ('SALESMAN', 'create_credit'),
    ('SALESMAN', 'view_reports'),
    ('DELIVERY', 'view_vendors'),
    ('DELIVERY', 'view_bills'),
    ('ORGANISER', 'view_bills')
) AS r(role, code) ON r.code = p.code;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS audit_logs CASCADE;
DROP TABLE IF EXISTS role_permissions CASCADE;
DROP TABLE IF EXISTS permissions CASCADE;
DROP TABLE IF EXISTS credit_entries CASCADE;
DROP TABLE IF EXISTS proxy_bill_items CASCADE;
DROP TABLE IF EXISTS proxy_bills CASCADE;
DROP TABLE IF EXISTS bill_items CASCADE;
DROP TABLE IF EXISTS bills CASCADE;
DROP TABLE IF EXISTS vendors CASCADE;
DROP TABLE IF EXISTS tenants CASCADE;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS credit_direction;
DROP TYPE IF EXISTS bill_type;
DROP TYPE IF EXISTS bill_status;
DROP TYPE IF EXISTS vendor_type;
";
