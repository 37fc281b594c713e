//! Which actions a screen should offer.
//!
//! Combines the module-level view from the resolver with the per-record
//! ownership check. Neither input knows about the other; this is the only
//! place they meet. The backend remains the authority; these flags only
//! decide what is shown.

use od_common::{
    CurrentUser, Owned, PermissionView, MODULE_DOCUMENTS, MODULE_DOCUMENTS_INCOMING,
    MODULE_DOCUMENTS_OUTGOING,
};
use serde::Serialize;

use super::ownership::can_modify;

/// Whether a module restricts mutation to each record's creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipPolicy {
    /// Anyone with the module permission may change any record.
    Shared,
    /// Non-admin users may only change records they created.
    OwnerOnly,
}

impl OwnershipPolicy {
    /// Policy for a registry module.
    ///
    /// Document modules are owner-only because staff register their own
    /// documents; every other module is shared.
    #[must_use]
    pub fn for_module(module_key: &str) -> Self {
        match module_key {
            MODULE_DOCUMENTS | MODULE_DOCUMENTS_INCOMING | MODULE_DOCUMENTS_OUTGOING => {
                Self::OwnerOnly
            }
            _ => Self::Shared,
        }
    }
}

/// Module-level affordances for one screen.
///
/// A module without `can_view` is hidden outright, and none of its other
/// flags are offered even if stored as true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ModuleAffordances {
    pub show_module: bool,
    pub can_add: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl ModuleAffordances {
    #[must_use]
    pub const fn from_view(view: &PermissionView) -> Self {
        if !view.can_view {
            return Self {
                show_module: false,
                can_add: false,
                can_edit: false,
                can_delete: false,
            };
        }
        Self {
            show_module: true,
            can_add: view.can_add,
            can_edit: view.can_edit,
            can_delete: view.can_delete,
        }
    }
}

/// Per-record affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RecordActions {
    pub can_edit: bool,
    pub can_delete: bool,
}

impl RecordActions {
    /// Actions to show on one record row.
    pub fn compute<R: Owned + ?Sized>(
        module: &ModuleAffordances,
        record: &R,
        user: Option<&CurrentUser>,
        policy: OwnershipPolicy,
    ) -> Self {
        let owns = match policy {
            OwnershipPolicy::Shared => user.is_some(),
            OwnershipPolicy::OwnerOnly => can_modify(record, user),
        };

        Self {
            can_edit: module.can_edit && owns,
            can_delete: module.can_delete && owns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(Option<&'static str>);

    impl Owned for Row {
        fn created_by(&self) -> Option<&str> {
            self.0
        }
    }

    fn editor_view() -> PermissionView {
        PermissionView {
            can_view: true,
            can_add: true,
            can_edit: true,
            can_delete: true,
        }
    }

    #[test]
    fn test_hidden_module_offers_nothing() {
        let view = PermissionView {
            can_view: false,
            ..editor_view()
        };
        assert_eq!(ModuleAffordances::from_view(&view), ModuleAffordances::default());
    }

    #[test]
    fn test_visible_module_keeps_flags() {
        let view = PermissionView {
            can_delete: false,
            ..editor_view()
        };
        let module = ModuleAffordances::from_view(&view);
        assert!(module.show_module);
        assert!(module.can_add);
        assert!(!module.can_delete);
    }

    #[test]
    fn test_delete_needs_both_permission_and_ownership() {
        let user = CurrentUser::new("u1", "user");
        let module = ModuleAffordances::from_view(&editor_view());

        let own = RecordActions::compute(&module, &Row(Some("u1")), Some(&user), OwnershipPolicy::OwnerOnly);
        assert!(own.can_delete);

        let other = RecordActions::compute(&module, &Row(Some("u2")), Some(&user), OwnershipPolicy::OwnerOnly);
        assert!(!other.can_delete);
        assert!(!other.can_edit);

        let no_perm = ModuleAffordances::from_view(&PermissionView {
            can_delete: false,
            ..editor_view()
        });
        let own_no_perm =
            RecordActions::compute(&no_perm, &Row(Some("u1")), Some(&user), OwnershipPolicy::OwnerOnly);
        assert!(!own_no_perm.can_delete);
        assert!(own_no_perm.can_edit);
    }

    #[test]
    fn test_shared_policy_ignores_creator() {
        let user = CurrentUser::new("u1", "manager");
        let module = ModuleAffordances::from_view(&editor_view());
        let actions = RecordActions::compute(&module, &Row(Some("u2")), Some(&user), OwnershipPolicy::Shared);
        assert!(actions.can_edit);
        assert!(actions.can_delete);

        let anonymous = RecordActions::compute(&module, &Row(None), None, OwnershipPolicy::Shared);
        assert_eq!(anonymous, RecordActions::default());
    }

    #[test]
    fn test_policy_per_module() {
        assert_eq!(OwnershipPolicy::for_module("cong-van-den"), OwnershipPolicy::OwnerOnly);
        assert_eq!(OwnershipPolicy::for_module("rewards"), OwnershipPolicy::Shared);
    }
}
