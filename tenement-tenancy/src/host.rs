//! Host Application Capabilities
//!
//! The resolver never reaches into a global container. It talks to the host
//! through the narrow [`TenantHost`] trait, and [`Application`] is the
//! in-process host shipped with this crate.

use crate::Result;
use crate::translation::Translator;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tenement_config::ConfigManager;
use tracing::debug;

/// Configuration key holding the cache key prefix
pub const CACHE_PREFIX_KEY: &str = "cache.prefix";

/// Configuration key holding the active locale
pub const LOCALE_KEY: &str = "app.locale";

/// Configuration key holding the fallback locale
pub const FALLBACK_LOCALE_KEY: &str = "app.fallback_locale";

const DEFAULT_LOCALE: &str = "en";

/// Capabilities a host exposes to tenant registration
pub trait TenantHost {
    /// Current values of a config namespace
    fn config_namespace(&self, namespace: &str) -> Option<Map<String, Value>>;

    /// Replace a config namespace
    fn set_config_namespace(&mut self, namespace: &str, values: Map<String, Value>);

    /// Append a view lookup location
    fn add_view_location(&mut self, path: PathBuf);

    /// Append an autoload source directory
    fn add_vendor_path(&mut self, path: PathBuf);

    /// Current cache key prefix
    fn cache_prefix(&self) -> String;

    /// Replace the cache key prefix
    fn set_cache_prefix(&mut self, prefix: String);

    /// Active locale
    fn locale(&self) -> String;

    /// Locale used when a line is missing in the active one
    fn fallback_locale(&self) -> Option<String>;

    /// Replace the translator binding
    fn set_translator(&mut self, translator: Translator);

    /// Load a routes file; loading the same file twice is a no-op
    fn load_routes(&mut self, path: &Path) -> Result<()>;
}

/// A routes file loaded into the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFile {
    pub path: PathBuf,
    pub source: String,
}

/// In-process host backed by a [`ConfigManager`]
#[derive(Debug, Default)]
pub struct Application {
    config: ConfigManager,
    view_locations: Vec<PathBuf>,
    vendor_paths: Vec<PathBuf>,
    translator: Option<Translator>,
    routes: Vec<RouteFile>,
}

impl Application {
    /// Create a host over an existing configuration
    pub fn new(config: ConfigManager) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Add a view location before any tenant is registered
    pub fn with_view_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.view_locations.push(path.into());
        self
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    /// View locations in lookup order
    pub fn view_locations(&self) -> &[PathBuf] {
        &self.view_locations
    }

    pub fn vendor_paths(&self) -> &[PathBuf] {
        &self.vendor_paths
    }

    pub fn translator(&self) -> Option<&Translator> {
        self.translator.as_ref()
    }

    /// Route files in load order
    pub fn routes(&self) -> &[RouteFile] {
        &self.routes
    }

    /// Find a view by relative name, searching locations in order
    pub fn find_view(&self, name: &str) -> Option<PathBuf> {
        self.view_locations
            .iter()
            .map(|location| location.join(name))
            .find(|candidate| candidate.is_file())
    }
}

impl TenantHost for Application {
    fn config_namespace(&self, namespace: &str) -> Option<Map<String, Value>> {
        self.config.namespace(namespace)
    }

    fn set_config_namespace(&mut self, namespace: &str, values: Map<String, Value>) {
        self.config.set_namespace(namespace, values);
    }

    fn add_view_location(&mut self, path: PathBuf) {
        self.view_locations.push(path);
    }

    fn add_vendor_path(&mut self, path: PathBuf) {
        if !self.vendor_paths.contains(&path) {
            self.vendor_paths.push(path);
        }
    }

    fn cache_prefix(&self) -> String {
        self.config.get_or(CACHE_PREFIX_KEY, String::new())
    }

    fn set_cache_prefix(&mut self, prefix: String) {
        self.config.put(CACHE_PREFIX_KEY, Value::String(prefix));
    }

    fn locale(&self) -> String {
        self.config.get_or(LOCALE_KEY, DEFAULT_LOCALE.to_string())
    }

    fn fallback_locale(&self) -> Option<String> {
        self.config.get_string(FALLBACK_LOCALE_KEY).ok()
    }

    fn set_translator(&mut self, translator: Translator) {
        self.translator = Some(translator);
    }

    fn load_routes(&mut self, path: &Path) -> Result<()> {
        if self.routes.iter().any(|route| route.path == path) {
            debug!(path = ?path, "Routes already loaded");
            return Ok(());
        }

        let source = fs::read_to_string(path)?;
        debug!(path = ?path, bytes = source.len(), "Loaded routes");
        self.routes.push(RouteFile {
            path: path.to_path_buf(),
            source,
        });
        Ok(())
    }
}
