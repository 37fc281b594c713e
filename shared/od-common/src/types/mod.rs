//! Shared Types

pub mod document;
pub mod module;
pub mod permission;
pub mod reward;
pub mod user;

pub use document::*;
pub use module::*;
pub use permission::*;
pub use reward::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// An entity whose mutation may be restricted to the user that created it.
pub trait Owned {
    /// Identifier of the user recorded as the creator, if any.
    fn created_by(&self) -> Option<&str>;
}

/// Deserialize a clearable column of a partial update.
///
/// - field absent → `#[serde(default)]` yields `None` (leave unchanged)
/// - `"field": null` → `Some(None)` (clear the column)
/// - `"field": value` → `Some(Some(value))` (set it)
#[allow(clippy::option_option)]
pub(crate) fn deserialize_double_option<'de, T, D>(
    deserializer: D,
) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
