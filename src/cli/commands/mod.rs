//! CLI command implementations

pub mod install;
pub mod list;

pub use install::execute as install;
pub use list::execute as list;
