//! Package sources
//!
//! The install argument is either a local package directory or a
//! `git+<url>` reference that is shallow-cloned into a temporary directory
//! before installing.

use crate::error::{TypiError, TypiResult};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;
use tracing::debug;

/// Prefix marking a git source on the command line
pub const GIT_PREFIX: &str = "git+";

/// Where a package comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// Directory on the local filesystem
    Local(PathBuf),

    /// Git repository URL (without the `git+` prefix)
    Git(String),
}

impl PackageSource {
    /// Classify a command-line argument
    pub fn parse(arg: &str) -> Self {
        match arg.strip_prefix(GIT_PREFIX) {
            Some(url) => Self::Git(url.to_string()),
            None => Self::Local(PathBuf::from(arg)),
        }
    }

    /// Whether the fetched tree is a git checkout
    pub fn is_git(&self) -> bool {
        matches!(self, Self::Git(_))
    }

    /// Produce a local directory holding the package
    pub fn fetch(&self) -> TypiResult<FetchedSource> {
        match self {
            Self::Local(path) => {
                let resolved = path
                    .canonicalize()
                    .map_err(|_| TypiError::SourceNotFound(path.clone()))?;
                if !resolved.is_dir() {
                    return Err(TypiError::SourceNotFound(path.clone()));
                }
                Ok(FetchedSource {
                    path: resolved,
                    _checkout: None,
                })
            }
            Self::Git(url) => {
                let checkout = TempDir::new()
                    .map_err(|e| TypiError::io("creating temporary directory for clone", e))?;
                clone_shallow(url, checkout.path())?;
                Ok(FetchedSource {
                    path: checkout.path().to_path_buf(),
                    _checkout: Some(checkout),
                })
            }
        }
    }
}

impl fmt::Display for PackageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Git(url) => write!(f, "{}{}", GIT_PREFIX, url),
        }
    }
}

/// A package directory ready to install.
///
/// For git sources the clone is deleted when this is dropped.
#[derive(Debug)]
pub struct FetchedSource {
    path: PathBuf,
    _checkout: Option<TempDir>,
}

impl FetchedSource {
    /// Root of the package tree
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `git clone --depth 1 <url> <dest>`
fn clone_shallow(url: &str, dest: &Path) -> TypiResult<()> {
    debug!("Cloning {} into {}", url, dest.display());

    let output = Command::new("git")
        .args(["clone", "--depth", "1", "--quiet", url])
        .arg(dest)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => TypiError::GitNotFound(url.to_string()),
            _ => TypiError::io(format!("running git clone {}", url), e),
        })?;

    if !output.status.success() {
        return Err(TypiError::GitClone {
            url: url.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_local_path() {
        assert_eq!(
            PackageSource::parse("./my-package"),
            PackageSource::Local(PathBuf::from("./my-package"))
        );
    }

    #[test]
    fn parse_git_strips_prefix_once() {
        let source = PackageSource::parse("git+https://github.com/someone/pkg.git");
        assert_eq!(
            source,
            PackageSource::Git("https://github.com/someone/pkg.git".to_string())
        );
        assert!(source.is_git());

        // Only the leading marker is removed, not every leading g/i/t/+ character
        assert_eq!(
            PackageSource::parse("git+git@host:team/pkg.git"),
            PackageSource::Git("git@host:team/pkg.git".to_string())
        );
    }

    #[test]
    fn display_round_trips_prefix() {
        let source = PackageSource::parse("git+https://example.com/pkg.git");
        assert_eq!(source.to_string(), "git+https://example.com/pkg.git");
    }

    #[test]
    fn fetch_local_resolves_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let fetched = PackageSource::Local(temp.path().to_path_buf())
            .fetch()
            .unwrap();
        assert_eq!(fetched.path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn fetch_local_missing_is_source_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = PackageSource::Local(temp.path().join("missing"))
            .fetch()
            .unwrap_err();
        assert!(matches!(err, TypiError::SourceNotFound(_)));
        assert!(err.is_manifest_error());
    }

    #[test]
    fn fetch_local_file_is_source_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("typst.toml");
        std::fs::write(&file, "").unwrap();
        assert!(PackageSource::Local(file).fetch().is_err());
    }
}
