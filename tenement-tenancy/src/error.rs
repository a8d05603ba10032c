//! Tenancy errors

use tenement_config::ConfigError;

/// Errors raised while resolving, registering or storing tenants
///
/// Absence (no configured root, a missing optional directory) is expressed
/// with `Option` by the resolver and never shows up here.
#[derive(Debug, thiserror::Error)]
pub enum TenancyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid tenant data: {0}")]
    Invalid(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for tenancy operations
pub type Result<T> = std::result::Result<T, TenancyError>;
