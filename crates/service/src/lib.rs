//! Transport-agnostic ledger operations.
//!
//! Every operation follows the same shape: the authorization gate
//! checks the caller's capability (and bill visibility), the core
//! validates, the repositories persist with the audit row inside the
//! same transaction. Any service surface (HTTP, RPC, CLI) calls these
//! functions with an externally resolved `RequestContext`.

pub mod bills;
pub mod credits;
pub mod grants;
pub mod permissions;
pub mod proxy_bills;
pub mod reports;
pub mod vendors;

use sea_orm::{DatabaseConnection, DbErr};

use khata_shared::AppError;

use crate::grants::GrantCache;

/// Shared state for the ledger operations: the connection pool and the
/// per-process grant cache.
#[derive(Debug)]
pub struct Ledger {
    db: DatabaseConnection,
    grants: GrantCache,
}

impl Ledger {
    /// Creates the ledger state over a connection pool.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            grants: GrantCache::new(),
        }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Returns the cached permission engine, loading it on first use.
    pub(crate) async fn engine(
        &self,
    ) -> Result<std::sync::Arc<khata_core::permission::PermissionEngine>, AppError> {
        self.grants.get_or_load(&self.db).await
    }

    /// Drops the cached permission engine. Called after every
    /// `set_grant` so no stale grant survives a change.
    pub fn invalidate_grants(&self) {
        self.grants.invalidate();
    }
}

/// Maps a raw database error into the application taxonomy.
pub(crate) fn db_err(e: DbErr) -> AppError {
    AppError::Database(e.to_string())
}
