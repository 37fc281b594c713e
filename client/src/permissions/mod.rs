//! Role permissions.
//!
//! Module-level rights come from one `(role, module)` row per pair; the
//! admin role bypasses the table entirely. Record-level rights come from the
//! ownership gate. The two are combined only in [`affordance`].

pub mod affordance;
pub mod cache;
pub mod matrix;
pub mod ownership;
pub mod resolver;
pub mod service;
pub mod store;

pub use affordance::{ModuleAffordances, OwnershipPolicy, RecordActions};
pub use cache::PermissionCache;
pub use matrix::{MatrixCell, MatrixRow, PendingChange, PermissionMatrix, RoleSection};
pub use ownership::can_modify;
pub use resolver::{resolve, resolve_from_records};
pub use service::PermissionService;
pub use store::{MemoryPermissionStore, PermissionStore, RestPermissionStore};
