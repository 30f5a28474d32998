//! Package manifest parsing
//!
//! Each Typst package carries a `typst.toml` manifest at its root. The
//! installer needs the identity of the package from it, and optionally the
//! `exclude` globs. Parsing is hidden behind [`ManifestParser`] and
//! everything else in the file is ignored.

use crate::error::{TypiError, TypiResult};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name of the manifest at a package root
pub const MANIFEST_FILE: &str = "typst.toml";

/// Namespace used when the manifest does not name one
pub const DEFAULT_NAMESPACE: &str = "local";

/// Identity of a package: the `(namespace, name, version)` triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageId {
    pub namespace: String,
    pub name: String,
    pub version: String,
}

impl PackageId {
    /// Build an id, rejecting values that are not a single safe path segment
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, String> {
        let id = Self {
            namespace: namespace.into(),
            name: name.into(),
            version: version.into(),
        };
        validate_segment("namespace", &id.namespace)?;
        validate_segment("name", &id.name)?;
        validate_segment("version", &id.version)?;
        Ok(id)
    }

    /// `@namespace/name` without the version
    pub fn spec_name(&self) -> String {
        format!("@{}/{}", self.namespace, self.name)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}/{}:{}", self.namespace, self.name, self.version)
    }
}

impl Ord for PackageId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.namespace
            .cmp(&other.namespace)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| compare_versions(&self.version, &other.version))
    }
}

impl PartialOrd for PackageId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Semver versions sort first and by precedence, anything else after them
/// in plain string order.
fn compare_versions(a: &str, b: &str) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Ok(va), Ok(vb)) => va.cmp(&vb).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Check that a manifest value can be used as one directory name.
///
/// Dot-prefixed names are reserved for staging directories in the cache.
fn validate_segment(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("package {} cannot be empty", field));
    }
    if value.contains('/') || value.contains('\\') || value.contains('\0') {
        return Err(format!(
            "package {} '{}' must not contain path separators",
            field, value
        ));
    }
    if value.starts_with('.') {
        return Err(format!(
            "package {} '{}' must not start with '.'",
            field, value
        ));
    }
    Ok(())
}

/// Reads a package identity out of a source directory
pub trait ManifestParser {
    /// Parse the manifest found at the root of `source`
    fn parse(&self, source: &Path) -> TypiResult<PackageId>;

    /// Glob patterns of files the package does not want installed
    fn exclude_patterns(&self, _source: &Path) -> TypiResult<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Parser for Typst's `typst.toml`
#[derive(Debug, Clone, Copy, Default)]
pub struct TypstManifest;

#[derive(Debug, Deserialize)]
struct ManifestFile {
    package: Option<PackageSection>,
}

#[derive(Debug, Deserialize)]
struct PackageSection {
    name: String,
    version: String,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

impl TypstManifest {
    /// Parse manifest content; `path` is only used in error messages
    pub fn parse_str(content: &str, path: &Path) -> TypiResult<PackageId> {
        let package = Self::section(content, path)?;

        let namespace = package
            .namespace
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        PackageId::new(namespace, package.name, package.version)
            .map_err(|reason| TypiError::manifest(path, reason))
    }

    /// The `[package].exclude` list, empty when absent
    pub fn exclude_str(content: &str, path: &Path) -> TypiResult<Vec<String>> {
        Ok(Self::section(content, path)?.exclude)
    }

    fn section(content: &str, path: &Path) -> TypiResult<PackageSection> {
        let file: ManifestFile =
            toml::from_str(content).map_err(|e| TypiError::manifest(path, e.to_string()))?;

        file.package
            .ok_or_else(|| TypiError::manifest(path, "missing [package] table"))
    }

    fn read(source: &Path) -> TypiResult<(PathBuf, String)> {
        if !source.is_dir() {
            return Err(TypiError::SourceNotFound(source.to_path_buf()));
        }

        let manifest_path = source.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(TypiError::ManifestNotFound(source.to_path_buf()));
        }

        let content = std::fs::read_to_string(&manifest_path)
            .map_err(|e| TypiError::manifest(&manifest_path, e.to_string()))?;
        Ok((manifest_path, content))
    }
}

impl ManifestParser for TypstManifest {
    fn parse(&self, source: &Path) -> TypiResult<PackageId> {
        let (path, content) = Self::read(source)?;
        Self::parse_str(&content, &path)
    }

    fn exclude_patterns(&self, source: &Path) -> TypiResult<Vec<String>> {
        let (path, content) = Self::read(source)?;
        Self::exclude_str(&content, &path)
    }
}
