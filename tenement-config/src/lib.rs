// Configuration management for Tenement hosts
//
// Values live in namespaces (`app`, `cache`, `multi-tenant`, ...) and are
// addressed with dotted keys such as `cache.prefix`.

pub mod env;
pub mod error;
pub mod loader;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Main configuration manager
#[derive(Clone, Debug, Default)]
pub struct ConfigManager {
    config: Arc<RwLock<HashMap<String, Value>>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with environment variable prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            config: Arc::new(RwLock::new(HashMap::new())),
            env_prefix: Some(prefix.into()),
        }
    }

    /// Load configuration from environment variables
    pub fn load_env(&self) -> Result<()> {
        let loader = EnvLoader::new(self.env_prefix.clone());

        for (key, value) in loader.load()? {
            self.set(&key, value)?;
        }

        Ok(())
    }

    /// Load configuration from .env file
    pub fn load_dotenv(&self, path: Option<&Path>) -> Result<()> {
        if let Some(path) = path {
            dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        } else {
            dotenvy::dotenv().ok(); // Ignore if .env doesn't exist
        }
        self.load_env()
    }

    /// Load a namespace file; the file stem names the namespace
    ///
    /// Values from the file take precedence over values already registered
    /// under the same namespace.
    pub fn load_file(&self, path: &Path) -> Result<String> {
        let namespace = namespace_of(path)?;
        let values = ConfigLoader::auto(path)?.load_mapping(path)?;

        self.merge_namespace(&namespace, values);
        Ok(namespace)
    }

    /// Load every supported file directly under `dir`, in name order
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && FileFormat::from_path(&path).is_some() {
                files.push(path);
            }
        }
        files.sort();

        files.iter().map(|path| self.load_file(path)).collect()
    }

    /// Set a configuration value under a dotted key
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        if key.split('.').next().is_none_or(str::is_empty) {
            return Err(ConfigError::KeyNotFound(key.to_string()));
        }

        self.put(key, json_value);
        Ok(())
    }

    /// Store an already-built value under a dotted key
    ///
    /// Intermediate tables are created as needed; scalars in the way are
    /// replaced by tables.
    pub fn put(&self, key: &str, value: Value) {
        let mut segments = key.split('.');
        let namespace = segments.next().unwrap_or_default();
        let rest: Vec<&str> = segments.collect();

        let mut config = self.config.write();
        if rest.is_empty() {
            config.insert(namespace.to_string(), value);
            return;
        }

        let root = config
            .entry(namespace.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !root.is_object() {
            *root = Value::Object(Map::new());
        }
        if let Value::Object(map) = root {
            insert_path(map, &rest, value);
        }
    }

    /// Get the raw value under a dotted key
    pub fn value(&self, key: &str) -> Option<Value> {
        let config = self.config.read();
        let mut segments = key.split('.');
        let mut current = config.get(segments.next()?)?;

        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }

        Some(current.clone())
    }

    /// Get a configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .value(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value).map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Get a string value
    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    /// Get an integer value
    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get(key)
    }

    /// Get a boolean value
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)
    }

    /// Get a float value
    pub fn get_float(&self, key: &str) -> Result<f64> {
        self.get(key)
    }

    /// Check if a key exists
    pub fn has(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Get all registered namespaces
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.config.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Get a namespace as a mapping
    ///
    /// Returns `None` when the namespace is missing or holds a scalar.
    pub fn namespace(&self, namespace: &str) -> Option<Map<String, Value>> {
        match self.config.read().get(namespace) {
            Some(Value::Object(map)) => Some(map.clone()),
            _ => None,
        }
    }

    /// Replace a namespace wholesale
    pub fn set_namespace(&self, namespace: &str, values: Map<String, Value>) {
        self.config
            .write()
            .insert(namespace.to_string(), Value::Object(values));
    }

    /// Merge `overrides` over a namespace
    ///
    /// Top-level keys present in `overrides` replace the registered ones;
    /// all other registered keys are kept.
    pub fn merge_namespace(&self, namespace: &str, overrides: Map<String, Value>) {
        let mut config = self.config.write();
        let merged = match config.remove(namespace) {
            Some(Value::Object(existing)) => merge_maps(existing, overrides),
            _ => overrides,
        };
        config.insert(namespace.to_string(), Value::Object(merged));
    }
}

/// Overlay `overrides` on `base`, the overriding side winning per key
pub fn merge_maps(
    mut base: Map<String, Value>,
    overrides: Map<String, Value>,
) -> Map<String, Value> {
    for (key, value) in overrides {
        base.insert(key, value);
    }
    base
}

fn insert_path(target: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            target.insert(last.to_string(), value);
        }
        [first, rest @ ..] => {
            let child = target
                .entry(first.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            }
        }
    }
}

fn namespace_of(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::LoadError(format!("Invalid config file name: {:?}", path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_and_get() {
        let manager = ConfigManager::new();
        manager.set("app.name", "tenement").unwrap();

        let value: String = manager.get("app.name").unwrap();
        assert_eq!(value, "tenement");
    }

    #[test]
    fn test_get_or_default() {
        let manager = ConfigManager::new();

        let value: String = manager.get_or("app.missing", "default_value".to_string());
        assert_eq!(value, "default_value");
    }

    #[test]
    fn test_has_key() {
        let manager = ConfigManager::new();
        manager.set("cache.prefix", "app").unwrap();

        assert!(manager.has("cache.prefix"));
        assert!(manager.has("cache"));
        assert!(!manager.has("cache.driver"));
        assert!(!manager.has("session"));
    }

    #[test]
    fn test_type_conversions() {
        let manager = ConfigManager::new();

        manager.set("app.string_key", "hello").unwrap();
        manager.set("app.int_key", 42i64).unwrap();
        manager.set("app.bool_key", true).unwrap();
        manager.set("app.float_key", 3.5).unwrap();

        assert_eq!(manager.get_string("app.string_key").unwrap(), "hello");
        assert_eq!(manager.get_int("app.int_key").unwrap(), 42);
        assert!(manager.get_bool("app.bool_key").unwrap());
        assert_eq!(manager.get_float("app.float_key").unwrap(), 3.5);
    }

    #[test]
    fn test_nested_set_creates_parents() {
        let manager = ConfigManager::new();
        manager.set("database.connections.mysql.port", 3306).unwrap();

        assert_eq!(
            manager.value("database"),
            Some(json!({"connections": {"mysql": {"port": 3306}}}))
        );
    }

    #[test]
    fn test_set_rejects_empty_namespace() {
        let manager = ConfigManager::new();

        assert!(matches!(
            manager.set(".prefix", "app"),
            Err(ConfigError::KeyNotFound(_))
        ));
        assert!(manager.keys().is_empty());
    }

    #[test]
    fn test_put_replaces_scalar_parents() {
        let manager = ConfigManager::new();
        manager.put("cache", Value::String("file".to_string()));
        manager.put("cache.prefix", json!("app-42"));

        assert_eq!(manager.value("cache"), Some(json!({"prefix": "app-42"})));
    }

    #[test]
    fn test_hyphenated_namespace() {
        let manager = ConfigManager::new();
        manager
            .set("multi-tenant.tenant-directory", "/srv/tenants")
            .unwrap();

        assert_eq!(
            manager.get_string("multi-tenant.tenant-directory").unwrap(),
            "/srv/tenants"
        );
    }

    #[test]
    fn test_merge_namespace_overrides_win() {
        let manager = ConfigManager::new();
        manager.set("app", json!({"env": "prod", "debug": false})).unwrap();

        let overrides = json!({"debug": true}).as_object().cloned().unwrap();
        manager.merge_namespace("app", overrides);

        assert_eq!(
            manager.value("app"),
            Some(json!({"debug": true, "env": "prod"}))
        );
    }

    #[test]
    fn test_merge_namespace_into_missing() {
        let manager = ConfigManager::new();
        let overrides = json!({"driver": "file"}).as_object().cloned().unwrap();
        manager.merge_namespace("cache", overrides);

        assert_eq!(manager.get_string("cache.driver").unwrap(), "file");
    }

    #[test]
    fn test_namespace_of_scalar_is_none() {
        let manager = ConfigManager::new();
        manager.set("flag", true).unwrap();

        assert!(manager.namespace("flag").is_none());
        assert!(manager.namespace("missing").is_none());
    }
}
