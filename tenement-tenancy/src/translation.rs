//! Tenant Translations
//!
//! File-backed translation lookup. Language files live at
//! `{lang}/{locale}/{group}.json` (or `.toml`) and keys are addressed as
//! `group.item`, with nested tables flattened using dots.

use crate::Result;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tenement_config::{ConfigLoader, FileFormat};
use tracing::{debug, warn};

type Lines = Arc<HashMap<String, String>>;

/// Loads translation groups from a language directory
#[derive(Debug, Clone)]
pub struct FileLoader {
    path: PathBuf,
}

impl FileLoader {
    /// Create a loader rooted at a language directory
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Language directory this loader reads from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load one group for a locale
    ///
    /// A missing group file yields an empty set of lines.
    pub fn load(&self, locale: &str, group: &str) -> Result<HashMap<String, String>> {
        let mut lines = HashMap::new();

        for format in [FileFormat::Json, FileFormat::Toml] {
            let file = self.group_file(locale, group, format);
            if !file.is_file() {
                continue;
            }

            let values = ConfigLoader::new(format).load_mapping(&file)?;
            flatten(&mut lines, None, values);
            debug!(path = ?file, locale, group, lines = lines.len(), "Loaded translation group");
            break;
        }

        Ok(lines)
    }

    fn group_file(&self, locale: &str, group: &str, format: FileFormat) -> PathBuf {
        let ext = match format {
            FileFormat::Json => "json",
            FileFormat::Toml => "toml",
        };
        self.path.join(locale).join(format!("{}.{}", group, ext))
    }
}

fn flatten(lines: &mut HashMap<String, String>, prefix: Option<&str>, values: Map<String, Value>) {
    for (key, value) in values {
        let key = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key,
        };

        match value {
            Value::String(line) => {
                lines.insert(key, line);
            }
            Value::Object(nested) => flatten(lines, Some(&key), nested),
            Value::Number(n) => {
                lines.insert(key, n.to_string());
            }
            Value::Bool(b) => {
                lines.insert(key, b.to_string());
            }
            Value::Null | Value::Array(_) => {}
        }
    }
}

/// Translator resolving keys against a locale and an optional fallback
#[derive(Debug)]
pub struct Translator {
    loader: FileLoader,
    locale: String,
    fallback: Option<String>,
    loaded: RwLock<HashMap<(String, String), Lines>>,
}

impl Translator {
    /// Create a translator for a locale
    ///
    /// # Examples
    ///
    /// ```
    /// use tenement_tenancy::{FileLoader, Translator};
    ///
    /// let translator = Translator::new(FileLoader::new("lang"), "nl").with_fallback("en");
    /// assert_eq!(translator.fallback(), Some("en"));
    /// ```
    pub fn new(loader: FileLoader, locale: impl Into<String>) -> Self {
        Self {
            loader,
            locale: locale.into(),
            fallback: None,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Set the fallback locale
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Active locale
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Fallback locale, if any
    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    /// Switch the active locale
    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = locale.into();
    }

    /// The loader backing this translator
    pub fn loader(&self) -> &FileLoader {
        &self.loader
    }

    /// Translate a key, echoing the key when no line exists
    pub fn get(&self, key: &str) -> String {
        self.get_with(key, &[])
    }

    /// Translate a key and substitute `:name` placeholders
    pub fn get_with(&self, key: &str, replacements: &[(&str, &str)]) -> String {
        match self.try_get(key) {
            Ok(Some(line)) => replace_placeholders(line, replacements),
            Ok(None) => key.to_string(),
            Err(e) => {
                warn!(key, error = %e, "Failed to load translation");
                key.to_string()
            }
        }
    }

    /// Whether a line exists for the key in the locale or fallback
    pub fn has(&self, key: &str) -> bool {
        matches!(self.try_get(key), Ok(Some(_)))
    }

    /// Look a key up, surfacing load errors
    pub fn try_get(&self, key: &str) -> Result<Option<String>> {
        let Some((group, item)) = key.split_once('.') else {
            return Ok(None);
        };

        let locales = std::iter::once(self.locale.as_str()).chain(self.fallback.as_deref());
        for locale in locales {
            if let Some(line) = self.lines(locale, group)?.get(item) {
                return Ok(Some(line.clone()));
            }
        }

        Ok(None)
    }

    fn lines(&self, locale: &str, group: &str) -> Result<Lines> {
        let cache_key = (locale.to_string(), group.to_string());
        if let Some(lines) = self.loaded.read().get(&cache_key) {
            return Ok(Arc::clone(lines));
        }

        let lines = Arc::new(self.loader.load(locale, group)?);
        self.loaded.write().insert(cache_key, Arc::clone(&lines));
        Ok(lines)
    }
}

fn replace_placeholders(mut line: String, replacements: &[(&str, &str)]) -> String {
    let mut replacements = replacements.to_vec();
    // Longest names first so `:name` does not clobber `:names`.
    replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    for (name, value) in replacements {
        line = line.replace(&format!(":{}", name), value);
    }
    line
}
