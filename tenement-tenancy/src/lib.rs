//! Multi-Tenancy for Tenement
//!
//! Per-website directory trees, tenant registration into a host application
//! and a customer registry.
//!
//! # Features
//!
//! - 📁 **Tenant Directories** - `{root}/{id}-{identifier}/` with config, views,
//!   lang, vendor, cache and media subdirectories
//! - 🔁 **Rename Tracking** - Detects the tree left behind by an identifier rename
//! - ⚙️ **Config Overrides** - Tenant config files merged over host defaults
//! - 🌐 **Tenant Translations** - Language files with fallback locale
//! - 👥 **Customer Registry** - Repository contract with cascading delete
//!
//! # Quick Start
//!
//! ## 1. Resolve and create a tenant tree
//!
//! ```rust,ignore
//! use tenement_tenancy::*;
//!
//! let config = ConfigManager::new();
//! config.set("multi-tenant.tenant-directory", "/srv/tenants")?;
//!
//! let directory = Directory::from_config(Website::new(42, "acme"), &config);
//! let report = directory.create().expect("tenant root configured");
//! assert!(report.is_complete());
//! ```
//!
//! ## 2. Register the tenant into the host
//!
//! ```rust,ignore
//! let mut app = Application::new(config.clone());
//! directory.register(&mut app)?;
//!
//! // Tenant config wins, cache keys are scoped per tenant
//! let prefix = app.cache_prefix(); // "app-42"
//! ```
//!
//! ## 3. Follow a rename
//!
//! ```rust,ignore
//! let mut website = Website::new(42, "acme");
//! website.rename("acme-corp");
//!
//! let mut directory = Directory::from_config(website, &config);
//! if directory.old_base_path().is_some() {
//!     directory.migrate()?;
//! }
//! ```

pub mod customer;
pub mod directory;
pub mod error;
pub mod host;
pub mod settings;
pub mod tenant;
pub mod translation;

pub use customer::{
    CascadeHook, Customer, CustomerRepository, DirectoryCleanup, InMemoryCustomerRepository,
};
pub use directory::{CreationReport, Directory, DirectoryKind, DirectoryOutcome, ROUTES_FILE};
pub use error::{Result, TenancyError};
pub use host::{Application, RouteFile, TenantHost};
pub use settings::{TENANT_DIRECTORY_KEY, tenant_root};
pub use tenant::Website;
pub use translation::{FileLoader, Translator};

pub use tenement_config::ConfigManager;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::customer::{CustomerRepository, InMemoryCustomerRepository};
    pub use crate::directory::{Directory, DirectoryKind};
    pub use crate::host::{Application, TenantHost};
    pub use crate::tenant::Website;
    pub use crate::{Result, TenancyError};
}
