//! Error types for typi
//!
//! All modules use `TypiResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for typi operations
pub type TypiResult<T> = Result<T, TypiError>;

/// All errors that can occur in typi
#[derive(Error, Debug)]
pub enum TypiError {
    // Manifest errors
    #[error("Package source directory does not exist: {0}")]
    SourceNotFound(PathBuf),

    #[error("No typst.toml in {0}")]
    ManifestNotFound(PathBuf),

    #[error("Not a valid typst.toml at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    // Git errors
    #[error("Git is not installed, cannot clone {0}")]
    GitNotFound(String),

    #[error("git clone of {url} failed: {stderr}")]
    GitClone { url: String, stderr: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Could not determine the platform data directory")]
    NoDataDir,

    // IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TypiError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a manifest error for the given manifest path
    pub fn manifest(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ManifestInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for errors raised while reading the package manifest.
    ///
    /// These are always raised before the cache is touched.
    pub fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound(_) | Self::ManifestNotFound(_) | Self::ManifestInvalid { .. }
        )
    }

    /// True for copy, delete or directory-creation failures
    pub fn is_filesystem_error(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ManifestNotFound(_) => {
                Some("Point typi at the package root, the directory containing typst.toml")
            }
            Self::GitNotFound(_) => Some("Install git and make sure it is on PATH"),
            Self::NoDataDir => Some("Pass --cache-root or set TYPI_CACHE_ROOT"),
            _ => None,
        }
    }
}
