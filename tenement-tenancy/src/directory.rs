//! Tenant Directories
//!
//! Every website owns a tree under the tenant root:
//!
//! ```text
//! {root}/{id}-{identifier}/
//!     config/  views/  lang/  vendor/  cache/  media/
//!     routes.php
//! ```
//!
//! [`Directory`] derives those paths, creates the tree, follows identifier
//! renames and wires the tenant's resources into a [`TenantHost`].

use crate::host::TenantHost;
use crate::settings::tenant_root;
use crate::tenant::Website;
use crate::translation::{FileLoader, Translator};
use crate::Result;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tenement_config::{merge_maps, ConfigLoader, ConfigManager, FileFormat};
use tracing::{debug, info, warn};

/// Routes file looked up at the tenant base
pub const ROUTES_FILE: &str = "routes.php";

/// Permissions for created tenant directories
#[cfg(unix)]
const DIRECTORY_MODE: u32 = 0o755;

/// Fixed subdirectories of a tenant base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryKind {
    Config,
    Views,
    Lang,
    Vendor,
    Cache,
    Media,
}

impl DirectoryKind {
    /// All kinds, in creation order
    pub const ALL: [DirectoryKind; 6] = [
        DirectoryKind::Config,
        DirectoryKind::Views,
        DirectoryKind::Lang,
        DirectoryKind::Vendor,
        DirectoryKind::Cache,
        DirectoryKind::Media,
    ];

    /// Directory name on disk
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Views => "views",
            Self::Lang => "lang",
            Self::Vendor => "vendor",
            Self::Cache => "cache",
            Self::Media => "media",
        }
    }
}

impl std::fmt::Display for DirectoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one directory during [`Directory::create`]
#[derive(Debug)]
pub enum DirectoryOutcome {
    Created,
    AlreadyExisted,
    Failed(io::Error),
}

impl DirectoryOutcome {
    /// Whether the directory is present afterwards
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Per-directory result of creating a tenant tree
#[derive(Debug)]
pub struct CreationReport {
    entries: Vec<(PathBuf, DirectoryOutcome)>,
}

impl CreationReport {
    /// Every attempted directory with its outcome, base first
    pub fn entries(&self) -> &[(PathBuf, DirectoryOutcome)] {
        &self.entries
    }

    /// Number of directories attempted
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Number of directories present afterwards
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|(_, outcome)| outcome.is_ok()).count()
    }

    /// Number of directories created by this run
    pub fn created(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, outcome)| matches!(outcome, DirectoryOutcome::Created))
            .count()
    }

    /// Directories that could not be created
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &io::Error)> {
        self.entries.iter().filter_map(|(path, outcome)| match outcome {
            DirectoryOutcome::Failed(e) => Some((path.as_path(), e)),
            _ => None,
        })
    }

    /// Whether every directory of the tree is present
    pub fn is_complete(&self) -> bool {
        self.succeeded() == self.total()
    }
}

/// Resolver for one website's directory tree
#[derive(Debug, Clone)]
pub struct Directory {
    website: Website,
    base_path: Option<PathBuf>,
    old_path: Option<PathBuf>,
}

impl Directory {
    /// Resolve directories under an explicit root
    ///
    /// The old base is only kept when the identifier changed and the
    /// directory for the previous identifier is actually on disk.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use tenement_tenancy::{Directory, DirectoryKind, Website};
    ///
    /// let directory = Directory::new(Website::new(42, "acme"), Some(PathBuf::from("/srv/tenants")));
    /// assert_eq!(directory.base_path().unwrap().to_str(), Some("/srv/tenants/42-acme/"));
    /// assert_eq!(
    ///     directory.path(DirectoryKind::Views).unwrap().to_str(),
    ///     Some("/srv/tenants/42-acme/views/")
    /// );
    /// ```
    pub fn new(website: Website, root: Option<PathBuf>) -> Self {
        let old_path = match (&root, website.previous_identifier.as_deref()) {
            (Some(root), Some(previous)) if website.is_identifier_dirty() => {
                Some(tenant_path(root, website.id, previous)).filter(|path| path.is_dir())
            }
            _ => None,
        };

        let base_path = root
            .as_deref()
            .map(|root| tenant_path(root, website.id, &website.identifier));

        Self {
            website,
            base_path,
            old_path,
        }
    }

    /// Resolve directories under the root configured for the host
    pub fn from_config(website: Website, config: &ConfigManager) -> Self {
        Self::new(website, tenant_root(config))
    }

    pub fn website(&self) -> &Website {
        &self.website
    }

    /// Tenant base path, `{root}/{id}-{identifier}/`
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    /// Base path under the previous identifier, if it still exists
    pub fn old_base_path(&self) -> Option<&Path> {
        self.old_path.as_deref()
    }

    /// Path of a fixed subdirectory, `{base}{kind}/`
    pub fn path(&self, kind: DirectoryKind) -> Option<PathBuf> {
        let base = self.base_path.as_ref()?;
        let mut path: OsString = base.as_os_str().to_os_string();
        path.push(kind.as_str());
        path.push("/");
        Some(PathBuf::from(path))
    }

    pub fn config(&self) -> Option<PathBuf> {
        self.path(DirectoryKind::Config)
    }

    pub fn views(&self) -> Option<PathBuf> {
        self.path(DirectoryKind::Views)
    }

    pub fn lang(&self) -> Option<PathBuf> {
        self.path(DirectoryKind::Lang)
    }

    pub fn vendor(&self) -> Option<PathBuf> {
        self.path(DirectoryKind::Vendor)
    }

    pub fn cache(&self) -> Option<PathBuf> {
        self.path(DirectoryKind::Cache)
    }

    pub fn media(&self) -> Option<PathBuf> {
        self.path(DirectoryKind::Media)
    }

    /// Path of `routes.php` at the base, only when the file exists
    pub fn routes_path(&self) -> Option<PathBuf> {
        let mut path: OsString = self.base_path.as_ref()?.as_os_str().to_os_string();
        path.push(ROUTES_FILE);
        Some(PathBuf::from(path)).filter(|path| path.is_file())
    }

    /// Create the base and every fixed subdirectory
    ///
    /// Existing directories count as success, so running this twice is
    /// harmless. Directories created before a failure are left in place.
    /// Returns `None` when the base path is unknown.
    pub fn create(&self) -> Option<CreationReport> {
        let base = self.base_path.clone()?;

        let entries: Vec<(PathBuf, DirectoryOutcome)> = std::iter::once(base)
            .chain(DirectoryKind::ALL.iter().filter_map(|kind| self.path(*kind)))
            .map(|path| {
                let outcome = create_directory(&path);
                (path, outcome)
            })
            .collect();

        let report = CreationReport { entries };
        if report.is_complete() {
            info!(
                tenant = self.website.id,
                created = report.created(),
                "Tenant directories ready"
            );
        } else {
            for (path, error) in report.failures() {
                warn!(tenant = self.website.id, path = ?path, error = %error, "Failed to create tenant directory");
            }
        }

        Some(report)
    }

    /// Move the tree of the previous identifier onto the current base
    ///
    /// Only happens when the old tree exists and the new base does not.
    /// Returns whether anything was moved.
    pub fn migrate(&mut self) -> Result<bool> {
        let (Some(old), Some(base)) = (self.old_path.as_deref(), self.base_path.as_deref()) else {
            return Ok(false);
        };

        if base.exists() {
            warn!(
                tenant = self.website.id,
                from = ?old,
                to = ?base,
                "Tenant base already exists, leaving old directory in place"
            );
            return Ok(false);
        }

        let (old, base) = (without_trailing_slash(old), without_trailing_slash(base));
        if let Some(parent) = base.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&old, &base)?;

        info!(tenant = self.website.id, from = ?old, to = ?base, "Moved tenant directory");
        self.old_path = None;
        self.website.sync_original();
        Ok(true)
    }

    /// Delete the tenant tree, including a leftover tree of the previous identifier
    ///
    /// Returns whether anything was removed.
    pub fn remove(&self) -> Result<bool> {
        let mut removed = false;

        for path in [self.base_path.as_deref(), self.old_path.as_deref()]
            .into_iter()
            .flatten()
        {
            if path.is_dir() {
                fs::remove_dir_all(path)?;
                info!(tenant = self.website.id, path = ?path, "Removed tenant directory");
                removed = true;
            }
        }

        Ok(removed)
    }

    /// Register the tenant's resources into the host
    ///
    /// Does nothing when the base path is unknown. Views, vendor code and
    /// language files are only wired in when their directory exists; config
    /// files are merged over the host's namespaces with tenant values winning.
    pub fn register<H: TenantHost + ?Sized>(&self, host: &mut H) -> Result<&Self> {
        if self.base_path.is_none() {
            debug!(tenant = self.website.id, "No tenant root, skipping registration");
            return Ok(self);
        }

        if let Some(views) = self.views().filter(|path| path.is_dir()) {
            debug!(tenant = self.website.id, path = ?views, "Adding view location");
            host.add_view_location(views);
        }

        if let Some(config) = self.config().filter(|path| path.is_dir()) {
            self.merge_config(host, &config)?;
        }

        if let Some(vendor) = self.vendor().filter(|path| path.is_dir()) {
            debug!(tenant = self.website.id, path = ?vendor, "Adding vendor path");
            host.add_vendor_path(vendor);
        }

        let prefix = format!("{}-{}", host.cache_prefix(), self.website.id);
        debug!(tenant = self.website.id, prefix = %prefix, "Scoping cache prefix");
        host.set_cache_prefix(prefix);

        if let Some(lang) = self.lang().filter(|path| path.is_dir()) {
            let mut translator = Translator::new(FileLoader::new(lang), host.locale());
            if let Some(fallback) = host.fallback_locale() {
                translator = translator.with_fallback(fallback);
            }
            host.set_translator(translator);
        }

        if let Some(routes) = self.routes_path() {
            host.load_routes(&routes)?;
        }

        info!(tenant = self.website.id, identifier = %self.website.identifier, "Registered tenant");
        Ok(self)
    }

    fn merge_config<H: TenantHost + ?Sized>(&self, host: &mut H, dir: &Path) -> Result<()> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        for path in files {
            let Some(format) = FileFormat::from_path(&path) else {
                warn!(path = ?path, "Skipping tenant config file with unsupported format");
                continue;
            };
            let Some(namespace) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let overrides = ConfigLoader::new(format).load_mapping(&path)?;
            let merged = merge_maps(host.config_namespace(namespace).unwrap_or_default(), overrides);
            debug!(tenant = self.website.id, namespace, "Merged tenant config");
            host.set_config_namespace(namespace, merged);
        }

        Ok(())
    }
}

fn tenant_path(root: &Path, id: u64, identifier: &str) -> PathBuf {
    let mut path = without_trailing_slash(root).into_os_string();
    // Only a bare root directory still ends with a separator here.
    if !path.as_encoded_bytes().ends_with(b"/") {
        path.push("/");
    }
    path.push(format!("{id}-{identifier}/"));
    PathBuf::from(path)
}

fn without_trailing_slash(path: &Path) -> PathBuf {
    path.components().collect()
}

fn create_directory(path: &Path) -> DirectoryOutcome {
    if path.is_dir() {
        return DirectoryOutcome::AlreadyExisted;
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIRECTORY_MODE);
    }

    match builder.create(path) {
        Ok(()) => DirectoryOutcome::Created,
        // Another process won the race.
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => {
            DirectoryOutcome::AlreadyExisted
        }
        Err(e) => DirectoryOutcome::Failed(e),
    }
}
