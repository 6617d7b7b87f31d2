//! Per-process cache of the permission engine.
//!
//! The grant map is read on every operation and written only by
//! `set_grant`, so it is cached once per process and invalidated on any
//! grant change.

use std::sync::{Arc, RwLock};

use sea_orm::DatabaseConnection;

use khata_core::permission::PermissionEngine;
use khata_db::repositories::PermissionRepository;
use khata_shared::AppError;

use crate::db_err;

/// Read-mostly cache of the loaded `PermissionEngine`.
#[derive(Debug, Default)]
pub struct GrantCache {
    cached: RwLock<Option<Arc<PermissionEngine>>>,
}

impl GrantCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached engine, loading the grant map from the store
    /// on first use (or after invalidation).
    ///
    /// # Errors
    ///
    /// Returns an error if loading the grant map fails.
    pub async fn get_or_load(
        &self,
        db: &DatabaseConnection,
    ) -> Result<Arc<PermissionEngine>, AppError> {
        if let Some(engine) = self
            .cached
            .read()
            .expect("grant cache poisoned")
            .clone()
        {
            return Ok(engine);
        }

        let engine = Arc::new(
            PermissionRepository::new(db.clone())
                .load_engine()
                .await
                .map_err(db_err)?,
        );

        *self.cached.write().expect("grant cache poisoned") = Some(engine.clone());
        Ok(engine)
    }

    /// Drops the cached engine so the next read reloads from the store.
    pub fn invalidate(&self) {
        *self.cached.write().expect("grant cache poisoned") = None;
    }
}
