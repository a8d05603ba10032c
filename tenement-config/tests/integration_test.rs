//! Integration tests for tenement-config

use serde_json::json;
use std::fs;
use tenement_config::*;

#[test]
fn test_load_file_uses_stem_as_namespace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mail.toml");
    fs::write(&path, "driver = \"smtp\"\nport = 587\n").unwrap();

    let manager = ConfigManager::new();
    let namespace = manager.load_file(&path).unwrap();

    assert_eq!(namespace, "mail");
    assert_eq!(manager.get_string("mail.driver").unwrap(), "smtp");
    assert_eq!(manager.get_int("mail.port").unwrap(), 587);
}

#[test]
fn test_load_dir_skips_unsupported_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("app.json"), r#"{"env": "local"}"#).unwrap();
    fs::write(dir.path().join("cache.toml"), "prefix = \"app\"\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let manager = ConfigManager::new();
    let loaded = manager.load_dir(dir.path()).unwrap();

    assert_eq!(loaded, vec!["app".to_string(), "cache".to_string()]);
    assert_eq!(manager.keys(), vec!["app".to_string(), "cache".to_string()]);
}

#[test]
fn test_load_file_merges_over_existing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.json");
    fs::write(&path, r#"{"debug": true}"#).unwrap();

    let manager = ConfigManager::new();
    manager.set("app", json!({"env": "prod", "debug": false})).unwrap();
    manager.load_file(&path).unwrap();

    assert_eq!(manager.value("app"), Some(json!({"env": "prod", "debug": true})));
}

#[test]
fn test_load_file_reports_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{not json").unwrap();

    let manager = ConfigManager::new();
    assert!(matches!(
        manager.load_file(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_load_dotenv_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".env");
    fs::write(&path, "TENEMENT_DOTENV_IT_SESSION__DRIVER=cookie\n").unwrap();

    let manager = ConfigManager::with_prefix("TENEMENT_DOTENV_IT");
    manager.load_dotenv(Some(&path)).unwrap();

    assert_eq!(manager.get_string("session.driver").unwrap(), "cookie");
}

#[test]
fn test_clones_share_state() {
    let manager = ConfigManager::new();
    let clone = manager.clone();

    clone.set("cache.prefix", "shared").unwrap();
    assert_eq!(manager.get_string("cache.prefix").unwrap(), "shared");
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::KeyNotFound("cache.prefix".to_string());
    let display = format!("{}", err);
    assert!(display.contains("cache.prefix"));
}
