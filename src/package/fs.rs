//! Filesystem primitives for cache entries
//!
//! A cache entry is never written in place. The source tree is copied into
//! a staging directory next to the entry and renamed into position once the
//! copy is complete, so a failed copy leaves whatever was there before.

use crate::error::{TypiError, TypiResult};
use crate::package::manifest::MANIFEST_FILE;
use glob::{MatchOptions, Pattern};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Prefix of the staging directories created next to cache entries
pub const STAGING_PREFIX: &str = ".typi-staging-";

/// `*` crosses directory separators, like Typst's own exclude matching
const EXCLUDE_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Options for copying a package tree
#[derive(Debug, Clone, Default)]
pub struct CopyOptions {
    /// Leave out a top-level `.git` directory
    pub skip_git_dir: bool,

    /// Relative paths matching any of these are not copied
    pub exclude: Vec<Pattern>,
}

impl CopyOptions {
    fn skips(&self, entry: &DirEntry, rel: &Path) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        if entry.depth() == 1 && entry.file_name() == MANIFEST_FILE {
            return false;
        }
        if self.skip_git_dir
            && entry.depth() == 1
            && entry.file_type().is_dir()
            && entry.file_name() == ".git"
        {
            return true;
        }
        if self.exclude.is_empty() {
            return false;
        }
        let rel = rel.to_string_lossy().replace('\\', "/");
        self.exclude
            .iter()
            .any(|pattern| pattern.matches_with(&rel, EXCLUDE_MATCH))
    }
}

/// Copy `src` recursively into `dst`, creating `dst` if needed.
///
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path, options: &CopyOptions) -> TypiResult<u64> {
    fs::create_dir_all(dst)
        .map_err(|e| TypiError::io(format!("creating directory {}", dst.display()), e))?;

    let walker = WalkDir::new(src)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
            !options.skips(entry, rel)
        });

    let mut copied = 0;
    for entry in walker {
        let entry = entry.map_err(|e| {
            let context = match e.path() {
                Some(path) => format!("reading {}", path.display()),
                None => format!("reading {}", src.display()),
            };
            TypiError::io(context, e.into())
        })?;

        if entry.depth() == 0 {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| TypiError::io("relativizing source path", io::Error::other(e)))?;
        let target = dst.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| {
                TypiError::io(format!("creating directory {}", target.display()), e)
            })?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &target).map_err(|e| {
                TypiError::io(
                    format!(
                        "copying {} to {}",
                        entry.path().display(),
                        target.display()
                    ),
                    e,
                )
            })?;
            copied += 1;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        }
    }

    Ok(copied)
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> TypiResult<()> {
    let points_to = fs::read_link(link)
        .map_err(|e| TypiError::io(format!("reading symlink {}", link.display()), e))?;
    std::os::unix::fs::symlink(&points_to, target)
        .map_err(|e| TypiError::io(format!("creating symlink {}", target.display()), e))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, _target: &Path) -> TypiResult<()> {
    debug!("Skipping symlink {}", link.display());
    Ok(())
}

/// The two filesystem steps an entry is built from
trait PlaceSteps {
    fn copy(&self, src: &Path, dst: &Path, options: &CopyOptions) -> TypiResult<u64> {
        copy_tree(src, dst, options)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

struct DiskSteps;

impl PlaceSteps for DiskSteps {}

/// Put a copy of `source` at `dest`.
///
/// An existing `dest` is replaced wholesale, never merged. The caller
/// decides whether replacing is allowed.
pub fn place_tree(source: &Path, dest: &Path, options: &CopyOptions) -> TypiResult<u64> {
    place_tree_with(&DiskSteps, source, dest, options)
}

fn place_tree_with(
    steps: &impl PlaceSteps,
    source: &Path,
    dest: &Path,
    options: &CopyOptions,
) -> TypiResult<u64> {
    let parent = dest.parent().ok_or_else(|| {
        TypiError::io(
            format!("resolving parent of {}", dest.display()),
            io::Error::from(io::ErrorKind::InvalidInput),
        )
    })?;
    fs::create_dir_all(parent)
        .map_err(|e| TypiError::io(format!("creating directory {}", parent.display()), e))?;

    // Dropping the staging dir removes any partial copy
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(|e| {
            TypiError::io(
                format!("creating staging directory in {}", parent.display()),
                e,
            )
        })?;

    let staged = staging.path().join("package");
    let copied = steps.copy(source, &staged, options)?;
    debug!("Staged {} file(s) in {}", copied, staging.path().display());

    if fs::symlink_metadata(dest).is_ok() {
        let previous = staging.path().join("previous");
        steps
            .rename(dest, &previous)
            .map_err(|e| TypiError::io(format!("moving aside {}", dest.display()), e))?;

        if let Err(e) = steps.rename(&staged, dest) {
            if let Err(restore) = steps.rename(&previous, dest) {
                // Leave the old tree on disk rather than deleting it with the staging dir
                let kept = staging.keep();
                warn!(
                    "Could not restore {} ({}); previous contents kept in {}",
                    dest.display(),
                    restore,
                    kept.display()
                );
            }
            return Err(TypiError::io(
                format!("moving new contents into {}", dest.display()),
                e,
            ));
        }
    } else {
        steps
            .rename(&staged, dest)
            .map_err(|e| TypiError::io(format!("moving package into {}", dest.display()), e))?;
    }

    let staging_path = staging.path().to_path_buf();
    if let Err(e) = staging.close() {
        warn!(
            "Could not remove staging directory {}: {}",
            staging_path.display(),
            e
        );
    }

    Ok(copied)
}
