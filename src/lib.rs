// Tenement - multi-tenant website directories for Rust hosts
//
// This library resolves per-tenant directory trees and registers tenant
// config, views, translations, vendor code and routes into a host.

// Re-export tenancy functionality
pub use tenement_tenancy::*;

// Re-export the configuration crate
pub use tenement_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Application, ConfigManager, CreationReport, Customer, CustomerRepository, Directory,
        DirectoryKind, InMemoryCustomerRepository, TenancyError, TenantHost, Translator, Website,
        tenant_root,
    };
}
