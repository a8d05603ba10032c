//! Integration tests for common Tenement workflows.
//!
//! These tests walk a tenant through its lifecycle using the facade crate.

use serde_json::json;
use std::fs;
use std::sync::Arc;
use tenement::prelude::*;
use tenement::{DirectoryCleanup, TENANT_DIRECTORY_KEY};

// =============================================================================
// Host Setup
// =============================================================================

fn host_config(dir: &std::path::Path) -> ConfigManager {
    let config_dir = dir.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("app.toml"),
        "env = \"prod\"\ndebug = false\nlocale = \"en\"\n",
    )
    .unwrap();
    fs::write(config_dir.join("cache.json"), r#"{"prefix": "shop"}"#).unwrap();

    let config = ConfigManager::new();
    config.load_dir(&config_dir).unwrap();
    config
        .set(
            TENANT_DIRECTORY_KEY,
            dir.join("tenants").to_string_lossy().to_string(),
        )
        .unwrap();
    config
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_provision_and_register_tenant() {
    let dir = tempfile::tempdir().unwrap();
    let config = host_config(dir.path());

    let directory = Directory::from_config(Website::new(42, "acme"), &config);
    let report = directory.create().unwrap();
    assert!(report.is_complete());
    assert_eq!(report.total(), 1 + DirectoryKind::ALL.len());

    fs::write(
        directory.config().unwrap().join("app.json"),
        r#"{"debug": true}"#,
    )
    .unwrap();

    let mut app = Application::new(config);
    directory.register(&mut app).unwrap();

    assert_eq!(
        app.config().value("app"),
        Some(json!({"env": "prod", "debug": true, "locale": "en"}))
    );
    assert_eq!(app.cache_prefix(), "shop-42");
    assert_eq!(app.view_locations(), &[directory.views().unwrap()]);
}

#[test]
fn test_rename_then_migrate() {
    let dir = tempfile::tempdir().unwrap();
    let config = host_config(dir.path());

    let mut website = Website::new(7, "globex");
    Directory::from_config(website.clone(), &config)
        .create()
        .unwrap();

    website.rename("globex-corp");
    let mut directory = Directory::from_config(website, &config);
    let old = directory.old_base_path().unwrap().to_path_buf();
    assert!(old.to_string_lossy().ends_with("/7-globex/"));

    assert!(directory.migrate().unwrap());
    assert!(!old.exists());
    assert!(directory.views().unwrap().is_dir());

    let report = directory.create().unwrap();
    assert!(report.is_complete());
    assert_eq!(report.created(), 0);
}

#[test]
fn test_rename_without_old_tree() {
    let dir = tempfile::tempdir().unwrap();
    let config = host_config(dir.path());

    let mut website = Website::new(8, "initech");
    website.rename("initrode");
    let directory = Directory::from_config(website, &config);

    assert!(directory.website().is_identifier_dirty());
    assert!(directory.old_base_path().is_none());
}

#[tokio::test]
async fn test_force_delete_customer() {
    let dir = tempfile::tempdir().unwrap();
    let config = host_config(dir.path());

    let repository = InMemoryCustomerRepository::new()
        .with_cascade(Arc::new(DirectoryCleanup::new(&config)));
    let customer = repository.insert_customer("Umbrella");

    let website = Website::new(3, "umbrella").with_customer(customer.id);
    let directory = Directory::from_config(website.clone(), &config);
    directory.create().unwrap();
    repository.insert_website(website);

    assert_eq!(repository.all().await.unwrap().len(), 1);
    assert!(repository.find_by_name("umbrella").await.unwrap().is_none());
    assert_eq!(
        repository.force_delete_by_name("Umbrella").await.unwrap(),
        Some(true)
    );
    assert!(repository.all().await.unwrap().is_empty());
    assert!(!directory.base_path().unwrap().exists());
}
