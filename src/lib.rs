//! typi - Typst local package installer
//!
//! Installs package directories, local or cloned from git, into the
//! package cache Typst resolves `@namespace/name:version` imports from.

pub mod cli;
pub mod config;
pub mod error;
pub mod package;
pub mod source;
pub mod ui;

pub use error::{TypiError, TypiResult};
