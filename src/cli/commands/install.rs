//! Install command - copy a package into the cache

use crate::error::TypiResult;
use crate::package::fs::CopyOptions;
use crate::package::{InstallOutcome, PackageInstaller};
use crate::source::{FetchedSource, PackageSource};
use crate::ui::{self, TaskSpinner, UiContext};
use std::path::Path;
use tracing::debug;

/// Execute the install command
pub fn execute(
    arg: &str,
    update: bool,
    honor_exclude: bool,
    cache_root: &Path,
) -> TypiResult<()> {
    let ctx = UiContext::detect();
    let source = PackageSource::parse(arg);
    debug!("Installing from {} into {}", source, cache_root.display());

    let fetched = fetch(&ctx, &source)?;

    let installer = PackageInstaller::new(cache_root)
        .with_copy_options(CopyOptions {
            skip_git_dir: source.is_git(),
            ..CopyOptions::default()
        })
        .with_manifest_excludes(honor_exclude);

    // The report below replaces the spinner line on success
    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Installing {}", source));
    let outcome = match installer.install(fetched.path(), update) {
        Ok(outcome) => {
            spinner.clear();
            outcome
        }
        Err(e) => {
            spinner.stop_error("Install failed");
            return Err(e);
        }
    };

    report(&ctx, &outcome);
    Ok(())
}

fn fetch(ctx: &UiContext, source: &PackageSource) -> TypiResult<FetchedSource> {
    if !source.is_git() {
        return source.fetch();
    }

    let mut spinner = TaskSpinner::new(ctx);
    spinner.start(&format!("Cloning {}", source));
    match source.fetch() {
        Ok(fetched) => {
            spinner.stop("Repository cloned");
            Ok(fetched)
        }
        Err(e) => {
            spinner.stop_error("Clone failed");
            Err(e)
        }
    }
}

fn report(ctx: &UiContext, outcome: &InstallOutcome) {
    let path = outcome.path().display().to_string();
    match outcome {
        InstallOutcome::Installed { id, .. } => {
            ui::step_ok_detail(ctx, &format!("Installed package {}", id), &path);
        }
        InstallOutcome::Updated { id, .. } => {
            ui::step_ok_detail(ctx, &format!("Updated package {}", id), &path);
        }
        InstallOutcome::AlreadyInstalled { id, .. } => {
            ui::step_info(
                ctx,
                &format!("Package {} already installed, skipping", id),
            );
            ui::remark(ctx, "To update use '-u' or '--update'");
        }
    }
}
