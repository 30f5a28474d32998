//! Terminal output
//!
//! Uses `cliclack` for styled log lines and spinners in interactive
//! terminals, with plain prefixed lines in CI and when piped.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{intro, remark, step_info, step_ok_detail};
pub use progress::TaskSpinner;
