//! Package installer
//!
//! Owns the package cache layout `<cache-root>/<namespace>/<name>/<version>/`
//! and decides whether an install creates, skips or replaces an entry.

use crate::error::{TypiError, TypiResult};
use crate::package::fs::{place_tree, CopyOptions};
use crate::package::manifest::{ManifestParser, PackageId, TypstManifest, MANIFEST_FILE};
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What an install call did to the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// No entry existed; one was created
    Installed { id: PackageId, path: PathBuf },

    /// An existing entry was replaced with the new contents
    Updated { id: PackageId, path: PathBuf },

    /// An entry existed and updating was not requested; nothing changed
    AlreadyInstalled { id: PackageId, path: PathBuf },
}

impl InstallOutcome {
    /// The package this outcome is about
    pub fn id(&self) -> &PackageId {
        match self {
            Self::Installed { id, .. }
            | Self::Updated { id, .. }
            | Self::AlreadyInstalled { id, .. } => id,
        }
    }

    /// The cache entry directory
    pub fn path(&self) -> &Path {
        match self {
            Self::Installed { path, .. }
            | Self::Updated { path, .. }
            | Self::AlreadyInstalled { path, .. } => path,
        }
    }
}

/// Installs package directories into a package cache
pub struct PackageInstaller {
    cache_root: PathBuf,
    parser: Box<dyn ManifestParser>,
    copy_options: CopyOptions,
    honor_excludes: bool,
}

impl PackageInstaller {
    /// Create an installer for the cache at `cache_root`, reading `typst.toml`
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            parser: Box::new(TypstManifest),
            copy_options: CopyOptions::default(),
            honor_excludes: false,
        }
    }

    /// Use a different manifest format
    pub fn with_parser(mut self, parser: impl ManifestParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Set how source trees are copied
    pub fn with_copy_options(mut self, options: CopyOptions) -> Self {
        self.copy_options = options;
        self
    }

    /// Leave out files matching the manifest's `exclude` globs
    pub fn with_manifest_excludes(mut self, honor: bool) -> Self {
        self.honor_excludes = honor;
        self
    }

    /// The cache root this installer writes to
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Directory of the cache entry for `id`
    pub fn entry_path(&self, id: &PackageId) -> PathBuf {
        self.cache_root
            .join(&id.namespace)
            .join(&id.name)
            .join(&id.version)
    }

    /// Check whether an entry exists for `id`
    pub fn is_installed(&self, id: &PackageId) -> bool {
        self.entry_path(id).is_dir()
    }

    /// Install the package rooted at `source`.
    ///
    /// With `update` an existing entry for the same triple is replaced;
    /// without it the existing entry is left alone.
    pub fn install(&self, source: &Path, update: bool) -> TypiResult<InstallOutcome> {
        let id = self.parser.parse(source)?;
        let path = self.entry_path(&id);
        debug!("Package {} maps to {}", id, path.display());

        let exists = path.is_dir();
        if exists && !update {
            debug!("{} already installed, skipping", id);
            return Ok(InstallOutcome::AlreadyInstalled { id, path });
        }

        self.check_not_nested(source)?;
        let options = self.copy_options_for(source)?;

        let copied = place_tree(source, &path, &options)?;

        if exists {
            info!("Updated {} ({} files)", id, copied);
            Ok(InstallOutcome::Updated { id, path })
        } else {
            info!("Installed {} ({} files)", id, copied);
            Ok(InstallOutcome::Installed { id, path })
        }
    }

    fn copy_options_for(&self, source: &Path) -> TypiResult<CopyOptions> {
        let mut options = self.copy_options.clone();
        if !self.honor_excludes {
            return Ok(options);
        }

        for raw in self.parser.exclude_patterns(source)? {
            // Patterns are matched against paths relative to the package root
            let trimmed = raw.trim_start_matches("./").trim_start_matches('/');
            let pattern = Pattern::new(trimmed).map_err(|e| {
                TypiError::manifest(
                    source.join(MANIFEST_FILE),
                    format!("invalid exclude pattern '{}': {}", raw, e),
                )
            })?;
            options.exclude.push(pattern);
        }
        debug!("Excluding {} pattern(s)", options.exclude.len());
        Ok(options)
    }

    /// Refuse to copy a source tree that contains the cache root
    fn check_not_nested(&self, source: &Path) -> TypiResult<()> {
        let source = source
            .canonicalize()
            .map_err(|e| TypiError::io(format!("resolving {}", source.display()), e))?;
        let root = resolve_partial(&self.cache_root)
            .map_err(|e| TypiError::io(format!("resolving {}", self.cache_root.display()), e))?;

        if root.starts_with(&source) {
            return Err(TypiError::io(
                format!(
                    "installing {}: the package cache {} lies inside the package source",
                    source.display(),
                    root.display()
                ),
                std::io::Error::from(std::io::ErrorKind::InvalidInput),
            ));
        }
        Ok(())
    }

    /// List every installed `(namespace, name, version)` triple, sorted.
    ///
    /// Entries that do not look like packages are skipped.
    pub fn list_installed(&self) -> TypiResult<Vec<PackageId>> {
        let mut installed = Vec::new();

        if !self.cache_root.is_dir() {
            debug!("Package cache {} does not exist", self.cache_root.display());
            return Ok(installed);
        }

        let namespaces = fs::read_dir(&self.cache_root).map_err(|e| {
            TypiError::io(format!("reading {}", self.cache_root.display()), e)
        })?;

        for namespace in sorted_child_dirs(namespaces) {
            for name in sorted_child_dirs_of(&namespace) {
                for version in sorted_child_dirs_of(&name) {
                    if is_empty_dir(&version) {
                        debug!("Skipping empty version directory {}", version.display());
                        continue;
                    }

                    match PackageId::new(
                        segment(&namespace),
                        segment(&name),
                        segment(&version),
                    ) {
                        Ok(id) => installed.push(id),
                        Err(reason) => debug!("Skipping {}: {}", version.display(), reason),
                    }
                }
            }
        }

        installed.sort();
        Ok(installed)
    }
}

/// Canonicalize the longest existing prefix of `path` and append the rest
fn resolve_partial(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(resolved) => {
                return Ok(missing
                    .iter()
                    .rev()
                    .fold(resolved, |acc: PathBuf, name| acc.join(name)))
            }
            Err(e) => match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    missing.push(name);
                    existing = parent;
                }
                _ => return Err(e),
            },
        }
    }
}

fn sorted_child_dirs_of(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => sorted_child_dirs(entries),
        Err(e) => {
            debug!("Skipping unreadable {}: {}", dir.display(), e);
            Vec::new()
        }
    }
}

/// Directory children, without dot-prefixed names, in name order
fn sorted_child_dirs(entries: fs::ReadDir) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .collect();
    dirs.sort();
    dirs
}

fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true)
}

fn segment(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
