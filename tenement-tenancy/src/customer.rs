//! Customer Registry
//!
//! A customer owns one or more websites. The repository contract is
//! deliberately small: list, find by name, and a forced delete that takes
//! every related website down with the customer.
//!
//! ```rust,ignore
//! use tenement_tenancy::*;
//!
//! let repository = InMemoryCustomerRepository::new()
//!     .with_cascade(Arc::new(DirectoryCleanup::new(config)));
//!
//! let customer = repository.insert_customer("acme");
//! repository.insert_website(Website::new(1, "acme").with_customer(customer.id));
//!
//! repository.force_delete_by_name("acme").await?; // Some(true)
//! ```

use crate::Result;
use crate::directory::Directory;
use crate::tenant::Website;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tenement_config::ConfigManager;
use tracing::{debug, info, warn};

/// Customer record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    /// Unique customer id
    pub id: u64,

    /// Customer name, unique and case-sensitive
    pub name: String,

    /// Contact email
    pub email: Option<String>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Create a new customer
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            created_at: Utc::now(),
        }
    }

    /// Set contact email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Customer repository (implement with your database)
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Load all customers
    async fn all(&self) -> Result<Vec<Customer>>;

    /// Find a customer by exact name
    async fn find_by_name(&self, name: &str) -> Result<Option<Customer>>;

    /// Remove a customer and everything related to it
    ///
    /// Returns `None` when no customer has this name.
    async fn force_delete_by_name(&self, name: &str) -> Result<Option<bool>>;
}

/// Hook run for every website removed by a cascading delete
pub trait CascadeHook: Send + Sync {
    fn on_website_deleted(&self, website: &Website) -> Result<()>;
}

/// Cascade hook deleting the directory tree of each removed website
#[derive(Debug, Clone)]
pub struct DirectoryCleanup {
    root: Option<PathBuf>,
}

impl DirectoryCleanup {
    /// Clean up under the tenant root configured for the host
    pub fn new(config: &ConfigManager) -> Self {
        Self {
            root: crate::settings::tenant_root(config),
        }
    }

    /// Clean up under an explicit root
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl CascadeHook for DirectoryCleanup {
    fn on_website_deleted(&self, website: &Website) -> Result<()> {
        Directory::new(website.clone(), self.root.clone()).remove()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Registry {
    customers: BTreeMap<u64, Customer>,
    websites: BTreeMap<u64, Website>,
    next_customer_id: u64,
}

/// In-memory customer repository for testing and single-process hosts
#[derive(Default)]
pub struct InMemoryCustomerRepository {
    registry: RwLock<Registry>,
    cascade: Option<Arc<dyn CascadeHook>>,
}

impl InMemoryCustomerRepository {
    /// Create new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a hook for every website removed by a forced delete
    pub fn with_cascade(mut self, hook: Arc<dyn CascadeHook>) -> Self {
        self.cascade = Some(hook);
        self
    }

    /// Register a new customer with the next free id
    pub fn insert_customer(&self, name: impl Into<String>) -> Customer {
        let mut registry = self.registry.write();
        registry.next_customer_id += 1;
        let customer = Customer::new(registry.next_customer_id, name);
        registry.customers.insert(customer.id, customer.clone());
        customer
    }

    /// Register or replace a website
    pub fn insert_website(&self, website: Website) {
        self.registry.write().websites.insert(website.id, website);
    }

    /// Websites owned by a customer
    pub fn websites_for(&self, customer_id: u64) -> Vec<Website> {
        self.registry
            .read()
            .websites
            .values()
            .filter(|website| website.customer_id == Some(customer_id))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn all(&self) -> Result<Vec<Customer>> {
        Ok(self.registry.read().customers.values().cloned().collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Customer>> {
        Ok(self
            .registry
            .read()
            .customers
            .values()
            .find(|customer| customer.name == name)
            .cloned())
    }

    async fn force_delete_by_name(&self, name: &str) -> Result<Option<bool>> {
        let (customer, websites) = {
            let mut registry = self.registry.write();
            let Some(id) = registry
                .customers
                .values()
                .find(|customer| customer.name == name)
                .map(|customer| customer.id)
            else {
                debug!(name, "No customer to delete");
                return Ok(None);
            };

            let customer = registry.customers.remove(&id);
            let owned: Vec<u64> = registry
                .websites
                .values()
                .filter(|website| website.customer_id == Some(id))
                .map(|website| website.id)
                .collect();
            let websites: Vec<Website> = owned
                .iter()
                .filter_map(|website_id| registry.websites.remove(website_id))
                .collect();

            (customer, websites)
        };

        // Every removed website gets its hook; the first failure is reported.
        let mut failure = None;
        if let Some(hook) = &self.cascade {
            for website in &websites {
                if let Err(e) = hook.on_website_deleted(website) {
                    warn!(website = website.id, error = %e, "Cascade hook failed");
                    failure.get_or_insert(e);
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        info!(
            name,
            customer = ?customer.map(|c| c.id),
            websites = websites.len(),
            "Force deleted customer"
        );
        Ok(Some(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TenancyError;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingHook {
        deleted: Mutex<Vec<u64>>,
        fail_on: Option<u64>,
    }

    impl CascadeHook for RecordingHook {
        fn on_website_deleted(&self, website: &Website) -> Result<()> {
            self.deleted.lock().push(website.id);
            if self.fail_on == Some(website.id) {
                return Err(TenancyError::Storage(format!("cleanup of {} failed", website.id)));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_all_and_find_by_name() {
        let repository = InMemoryCustomerRepository::new();
        repository.insert_customer("acme");
        repository.insert_customer("globex");

        let all = repository.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "acme");

        let found = repository.find_by_name("globex").await.unwrap().unwrap();
        assert_eq!(found.id, 2);
    }

    #[tokio::test]
    async fn test_find_by_name_is_case_sensitive() {
        let repository = InMemoryCustomerRepository::new();
        repository.insert_customer("Acme");

        assert!(repository.find_by_name("acme").await.unwrap().is_none());
        assert!(repository.find_by_name("Acme").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_force_delete_cascades() {
        let hook = Arc::new(RecordingHook::default());
        let repository = InMemoryCustomerRepository::new().with_cascade(hook.clone());

        let acme = repository.insert_customer("acme");
        let globex = repository.insert_customer("globex");
        repository.insert_website(Website::new(10, "acme").with_customer(acme.id));
        repository.insert_website(Website::new(11, "acme-shop").with_customer(acme.id));
        repository.insert_website(Website::new(12, "globex").with_customer(globex.id));

        let result = repository.force_delete_by_name("acme").await.unwrap();
        assert_eq!(result, Some(true));

        assert!(repository.find_by_name("acme").await.unwrap().is_none());
        assert!(repository.websites_for(acme.id).is_empty());
        assert_eq!(repository.websites_for(globex.id).len(), 1);

        let mut deleted = hook.deleted.lock().clone();
        deleted.sort();
        assert_eq!(deleted, vec![10, 11]);
    }

    #[tokio::test]
    async fn test_force_delete_runs_every_hook_after_failure() {
        let hook = Arc::new(RecordingHook {
            fail_on: Some(10),
            ..Default::default()
        });
        let repository = InMemoryCustomerRepository::new().with_cascade(hook.clone());

        let acme = repository.insert_customer("acme");
        repository.insert_website(Website::new(10, "acme").with_customer(acme.id));
        repository.insert_website(Website::new(11, "acme-shop").with_customer(acme.id));

        let result = repository.force_delete_by_name("acme").await;
        assert!(matches!(result, Err(TenancyError::Storage(_))));
        assert_eq!(*hook.deleted.lock(), vec![10, 11]);
        assert!(repository.websites_for(acme.id).is_empty());
    }

    #[tokio::test]
    async fn test_force_delete_unknown() {
        let repository = InMemoryCustomerRepository::new();
        assert_eq!(repository.force_delete_by_name("nobody").await.unwrap(), None);
    }
}
