// Environment variable loading

use crate::Result;
use std::env;

/// Separator between the namespace and the key inside a variable name.
pub const NAMESPACE_SEPARATOR: &str = "__";

/// Environment variable loader
///
/// Variables are mapped onto dotted configuration keys: with the prefix
/// `TENEMENT`, `TENEMENT_CACHE__PREFIX=app` becomes `cache.prefix = "app"`.
/// Variables without a namespace separator are ignored.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load all matching environment variables as `(dotted_key, value)` pairs
    pub fn load(&self) -> Result<Vec<(String, String)>> {
        Ok(env::vars()
            .filter_map(|(name, value)| self.config_key(&name).map(|key| (key, value)))
            .collect())
    }

    /// Translate a variable name into a dotted configuration key
    pub fn config_key(&self, name: &str) -> Option<String> {
        let rest = match self.prefix {
            Some(ref prefix) => name.strip_prefix(prefix.as_str())?.strip_prefix('_')?,
            None => name,
        };

        let (namespace, key) = rest.split_once(NAMESPACE_SEPARATOR)?;
        if namespace.is_empty() || key.is_empty() {
            return None;
        }

        Some(format!(
            "{}.{}",
            namespace.to_lowercase(),
            key.replace(NAMESPACE_SEPARATOR, ".").to_lowercase()
        ))
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
