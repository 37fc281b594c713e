//! Officedesk Common Library
//!
//! Shared types used by the admin client and any screen built on top of it.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
