//! Permission Service
//!
//! Resolver and write path over a shared store and role cache.

use std::sync::Arc;

use od_common::{is_superuser, CurrentUser, PermissionField, PermissionRecord, PermissionView};
use tracing::{error, info, warn};

use super::cache::PermissionCache;
use super::resolver::resolve_from_records;
use super::store::PermissionStore;
use crate::error::{ClientError, ClientResult};

/// Shared entry point for permission reads and writes.
#[derive(Clone)]
pub struct PermissionService {
    store: Arc<dyn PermissionStore>,
    cache: Arc<PermissionCache>,
}

impl PermissionService {
    pub fn new(store: Arc<dyn PermissionStore>) -> Self {
        Self {
            store,
            cache: Arc::new(PermissionCache::new()),
        }
    }

    /// The role cache, for inspection and manual invalidation.
    pub fn cache(&self) -> &PermissionCache {
        &self.cache
    }

    /// Effective permissions of `user` on `module_key`.
    ///
    /// Never fails: a failed fetch is logged and resolves to nothing allowed.
    pub async fn resolve(&self, user: Option<&CurrentUser>, module_key: &str) -> PermissionView {
        let Some(current) = user else {
            return PermissionView::none();
        };
        if is_superuser(user) {
            return PermissionView::all();
        }

        match self.cache.get_or_fetch(self.store.as_ref(), &current.role).await {
            Ok(rows) => resolve_from_records(user, module_key, &rows),
            Err(e) => {
                warn!(
                    role = %current.role,
                    module = module_key,
                    error = %e,
                    "Failed to load permissions, denying access"
                );
                PermissionView::none()
            }
        }
    }

    /// Every stored row, bypassing the cache.
    pub async fn fetch_all_permissions(&self) -> ClientResult<Vec<PermissionRecord>> {
        self.store.fetch_all_permissions().await
    }

    /// Persist one flag of one row.
    ///
    /// Synthesized admin rows are refused without touching the store. A
    /// successful write invalidates the cached rows of the written row's role.
    pub async fn set_permission(
        &self,
        id: i64,
        field: PermissionField,
        value: bool,
    ) -> ClientResult<PermissionRecord> {
        if id == od_common::VIRTUAL_ADMIN_ID {
            return Err(ClientError::VirtualRecord);
        }

        match self.store.update_permission_field(id, field, value).await {
            Ok(row) => {
                self.cache.invalidate(&row.role);
                info!(id, role = %row.role, module = %row.module, %field, value, "Permission updated");
                Ok(row)
            }
            Err(e) => {
                error!(id, %field, value, error = %e, "Failed to update permission");
                Err(e)
            }
        }
    }
}
