//! Record ownership check.
//!
//! Independent of module-level permissions: callers combine both.

use od_common::{is_superuser, CurrentUser, Owned};

/// Whether `user` may edit or delete `record`.
///
/// Rules, in order:
/// 1. No user: never
/// 2. Superuser: always, even for records with no recorded creator
/// 3. Otherwise only the creator, by exact id match
pub fn can_modify<R: Owned + ?Sized>(record: &R, user: Option<&CurrentUser>) -> bool {
    let Some(current) = user else {
        return false;
    };

    if is_superuser(user) {
        return true;
    }

    record.created_by() == Some(current.id.as_str())
}
