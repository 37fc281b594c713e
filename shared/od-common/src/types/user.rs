//! User Types

use serde::{Deserialize, Serialize};

/// Role name that bypasses every permission lookup and ownership check.
pub const ADMIN_ROLE: &str = "admin";

/// Role name for department managers.
pub const MANAGER_ROLE: &str = "manager";

/// Role name for regular staff accounts.
pub const USER_ROLE: &str = "user";

/// The authenticated user, as supplied by the authentication collaborator.
///
/// Roles are open-ended strings. Any value deserializes; only the known
/// roles carry meaning for the screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User ID.
    pub id: String,
    /// Role name (e.g. `admin`, `manager`, `user`).
    pub role: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub full_name: Option<String>,
}

impl CurrentUser {
    /// Create a user with only the fields the permission core reads.
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            email: None,
            full_name: None,
        }
    }

    /// Name to show in headers and audit columns.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Whether the user holds the superuser role.
///
/// Both the resolver and the ownership gate go through this predicate so the
/// admin bypass has exactly one definition.
#[must_use]
pub fn is_superuser(user: Option<&CurrentUser>) -> bool {
    user.is_some_and(|u| u.role == ADMIN_ROLE)
}
