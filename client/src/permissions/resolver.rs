//! Permission resolution logic.
//!
//! Computes the effective permissions of a user on one module.

use od_common::{is_superuser, CurrentUser, PermissionRecord, PermissionView};
use tracing::warn;

use super::store::PermissionStore;

/// Resolve a user's permissions on `module_key` from already fetched rows.
///
/// Resolution order:
/// 1. No user: nothing is allowed
/// 2. Superuser: everything is allowed, rows are not consulted
/// 3. The row for `(user.role, module_key)` is returned verbatim
/// 4. No such row: nothing is allowed
pub fn resolve_from_records(
    user: Option<&CurrentUser>,
    module_key: &str,
    records: &[PermissionRecord],
) -> PermissionView {
    let Some(user) = user else {
        return PermissionView::none();
    };

    if is_superuser(Some(user)) {
        return PermissionView::all();
    }

    records
        .iter()
        .find(|r| r.role == user.role && r.module == module_key)
        .map_or_else(PermissionView::none, PermissionRecord::view)
}

/// Resolve a user's permissions on `module_key`, fetching the role's rows.
///
/// One fetch per call, for the whole role. A failed fetch is logged and
/// resolves to nothing allowed; the error never reaches the caller.
pub async fn resolve(
    store: &dyn PermissionStore,
    user: Option<&CurrentUser>,
    module_key: &str,
) -> PermissionView {
    let Some(current) = user else {
        return PermissionView::none();
    };

    if is_superuser(user) {
        return PermissionView::all();
    }

    match store.fetch_permissions_for_role(&current.role).await {
        Ok(records) => resolve_from_records(user, module_key, &records),
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
