//! Common Error Types

use thiserror::Error;

/// Errors raised while building or parsing shared domain values.
#[derive(Debug, Error)]
pub enum Error {
    /// A form payload failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A permission column name that is not one of the four flags.
    #[error("Unknown permission field: {0}")]
    UnknownPermissionField(String),

    /// A module key missing from the registry.
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// A string that does not name a known enum variant.
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Result alias for common operations.
pub type Result<T> = std::result::Result<T, Error>;
