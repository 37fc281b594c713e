//! Permission Types
//!
//! A flat `(role, module) -> {view, add, edit, delete}` table. The four flags
//! are independent: nothing here forces `can_add` to imply `can_view`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identifier reserved for synthesized admin rows. Never persisted.
pub const VIRTUAL_ADMIN_ID: i64 = -1;

/// One row of the permission table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub id: i64,
    pub role: String,
    pub module: String,
    pub can_view: bool,
    pub can_add: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl PermissionRecord {
    /// Synthesize the read-only admin row for a module.
    pub fn virtual_admin(module: impl Into<String>) -> Self {
        Self {
            id: VIRTUAL_ADMIN_ID,
            role: crate::ADMIN_ROLE.to_string(),
            module: module.into(),
            can_view: true,
            can_add: true,
            can_edit: true,
            can_delete: true,
        }
    }

    /// Whether this row was synthesized rather than loaded from storage.
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        self.id == VIRTUAL_ADMIN_ID
    }

    /// Read a single flag.
    #[must_use]
    pub const fn get(&self, field: PermissionField) -> bool {
        match field {
            PermissionField::CanView => self.can_view,
            PermissionField::CanAdd => self.can_add,
            PermissionField::CanEdit => self.can_edit,
            PermissionField::CanDelete => self.can_delete,
        }
    }

    /// Overwrite a single flag.
    pub fn set(&mut self, field: PermissionField, value: bool) {
        match field {
            PermissionField::CanView => self.can_view = value,
            PermissionField::CanAdd => self.can_add = value,
            PermissionField::CanEdit => self.can_edit = value,
            PermissionField::CanDelete => self.can_delete = value,
        }
    }

    /// The four flags without identity columns.
    #[must_use]
    pub const fn view(&self) -> PermissionView {
        PermissionView {
            can_view: self.can_view,
            can_add: self.can_add,
            can_edit: self.can_edit,
            can_delete: self.can_delete,
        }
    }
}

/// Effective permissions of a user on one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionView {
    pub can_view: bool,
    pub can_add: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl PermissionView {
    /// Fully restrictive view.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            can_view: false,
            can_add: false,
            can_edit: false,
            can_delete: false,
        }
    }

    /// Fully permissive view.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            can_view: true,
            can_add: true,
            can_edit: true,
            can_delete: true,
        }
    }

    /// Read a single flag.
    #[must_use]
    pub const fn has(&self, field: PermissionField) -> bool {
        match field {
            PermissionField::CanView => self.can_view,
            PermissionField::CanAdd => self.can_add,
            PermissionField::CanEdit => self.can_edit,
            PermissionField::CanDelete => self.can_delete,
        }
    }
}

impl From<&PermissionRecord> for PermissionView {
    fn from(record: &PermissionRecord) -> Self {
        record.view()
    }
}

/// One of the four toggleable permission columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionField {
    CanView,
    CanAdd,
    CanEdit,
    CanDelete,
}

impl PermissionField {
    /// Every field, in matrix column order.
    pub const ALL: [Self; 4] = [Self::CanView, Self::CanAdd, Self::CanEdit, Self::CanDelete];

    /// Column name in the permission table.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::CanView => "can_view",
            Self::CanAdd => "can_add",
            Self::CanEdit => "can_edit",
            Self::CanDelete => "can_delete",
        }
    }
}

impl fmt::Display for PermissionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for PermissionField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| Error::UnknownPermissionField(s.to_string()))
    }
}
