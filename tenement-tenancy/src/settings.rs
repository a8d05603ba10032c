//! Tenancy Settings
//!
//! Where tenant directories live, read from the host configuration.

use std::path::PathBuf;
use tenement_config::ConfigManager;

/// Configuration key overriding the tenant directory root
pub const TENANT_DIRECTORY_KEY: &str = "multi-tenant.tenant-directory";

/// Configuration key holding the application storage path
pub const STORAGE_PATH_KEY: &str = "app.storage_path";

/// Directory created under the storage path when no override is set
pub const DEFAULT_TENANT_FOLDER: &str = "multi-tenant";

/// Resolve the root holding every tenant directory
///
/// `multi-tenant.tenant-directory` wins when set to a non-empty string,
/// otherwise `{app.storage_path}/multi-tenant` is used. Without either key
/// the root is unknown and `None` is returned.
pub fn tenant_root(config: &ConfigManager) -> Option<PathBuf> {
    let non_empty = |key: &str| {
        config
            .get_string(key)
            .ok()
            .filter(|value| !value.trim().is_empty())
    };

    if let Some(directory) = non_empty(TENANT_DIRECTORY_KEY) {
        return Some(PathBuf::from(directory));
    }

    non_empty(STORAGE_PATH_KEY).map(|storage| PathBuf::from(storage).join(DEFAULT_TENANT_FOLDER))
}
