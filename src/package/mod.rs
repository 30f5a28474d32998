//! Package installation into the local Typst package cache
//!
//! Packages live at `<cache-root>/<namespace>/<name>/<version>/`, which is
//! where Typst resolves `#import "@namespace/name:version"` from.
//!
//! # Entry States
//!
//! | State | Reached by | Description |
//! |-------|------------|-------------|
//! | Absent | - | No directory for the triple |
//! | Installed | install, update | Full copy of the package source |
//!
//! Entries are only ever created or replaced by renaming a fully copied
//! staging directory into place. Nothing here deletes an entry.

pub mod fs;
pub mod installer;
pub mod manifest;

pub use installer::{InstallOutcome, PackageInstaller};
pub use manifest::{ManifestParser, PackageId, TypstManifest, DEFAULT_NAMESPACE, MANIFEST_FILE};
