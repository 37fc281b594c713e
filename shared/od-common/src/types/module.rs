//! Module Registry
//!
//! Static description of every screen that carries a permission row.

use serde::Serialize;

use crate::error::{Error, Result};

/// A module key with its display label and indent level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub nesting_level: u8,
}

/// Official documents (parent group).
pub const MODULE_DOCUMENTS: &str = "cong-van";
/// Incoming official documents.
pub const MODULE_DOCUMENTS_INCOMING: &str = "cong-van-den";
/// Outgoing official documents.
pub const MODULE_DOCUMENTS_OUTGOING: &str = "cong-van-di";
/// Reward decisions.
pub const MODULE_REWARDS: &str = "rewards";
/// Discipline decisions.
pub const MODULE_DISCIPLINE: &str = "discipline";
/// User accounts.
pub const MODULE_USERS: &str = "users";
/// The permission matrix itself.
pub const MODULE_PERMISSIONS: &str = "permissions";

/// Every module, in display order. Children follow their parent.
pub const MODULE_REGISTRY: &[ModuleDescriptor] = &[
    ModuleDescriptor {
        key: MODULE_DOCUMENTS,
        label: "Công văn",
        nesting_level: 0,
    },
    ModuleDescriptor {
        key: MODULE_DOCUMENTS_INCOMING,
        label: "Công văn đến",
        nesting_level: 1,
    },
    ModuleDescriptor {
        key: MODULE_DOCUMENTS_OUTGOING,
        label: "Công văn đi",
        nesting_level: 1,
    },
    ModuleDescriptor {
        key: MODULE_REWARDS,
        label: "Khen thưởng",
        nesting_level: 0,
    },
    ModuleDescriptor {
        key: MODULE_DISCIPLINE,
        label: "Kỷ luật",
        nesting_level: 0,
    },
    ModuleDescriptor {
        key: MODULE_USERS,
        label: "Người dùng",
        nesting_level: 0,
    },
    ModuleDescriptor {
        key: MODULE_PERMISSIONS,
        label: "Phân quyền",
        nesting_level: 0,
    },
];

/// Look up a module by key in the default registry.
pub fn find_module(key: &str) -> Result<&'static ModuleDescriptor> {
    MODULE_REGISTRY
        .iter()
        .find(|m| m.key == key)
        .ok_or_else(|| Error::UnknownModule(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_keys_are_unique() {
        for (i, a) in MODULE_REGISTRY.iter().enumerate() {
            for b in &MODULE_REGISTRY[i + 1..] {
                assert_ne!(a.key, b.key, "duplicate module key");
            }
        }
    }

    #[test]
    fn test_children_follow_a_parent() {
        let mut last_level = 0;
        for module in MODULE_REGISTRY {
            assert!(
                module.nesting_level <= last_level + 1,
                "module {} is indented without a parent",
                module.key
            );
            last_level = module.nesting_level;
        }
        assert_eq!(MODULE_REGISTRY[0].nesting_level, 0);
    }

    #[test]
    fn test_find_module() {
        assert_eq!(find_module("cong-van-di").unwrap().nesting_level, 1);
        assert!(matches!(
            find_module("payroll"),
            Err(Error::UnknownModule(ref k)) if k == "payroll"
        ));
    }
}
