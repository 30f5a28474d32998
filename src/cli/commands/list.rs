//! List command - show installed packages

use crate::cli::args::OutputFormat;
use crate::error::TypiResult;
use crate::package::{PackageId, PackageInstaller};
use crate::ui::{self, UiContext};
use console::style;
use std::path::Path;

/// Execute the list command
pub fn execute(cache_root: &Path, format: OutputFormat) -> TypiResult<()> {
    let packages = PackageInstaller::new(cache_root).list_installed()?;

    if packages.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(
                    &ctx,
                    &format!("No packages installed in {}", cache_root.display()),
                );
            }
        }
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_table(&packages),
        OutputFormat::Json => print_json(&packages)?,
        OutputFormat::Plain => print_plain(&packages),
    }

    Ok(())
}

/// Versions per `@namespace/name`, keeping the input order
fn group_versions(packages: &[PackageId]) -> Vec<(String, Vec<&str>)> {
    let mut groups: Vec<(String, Vec<&str>)> = Vec::new();
    for pkg in packages {
        let name = pkg.spec_name();
        match groups.last_mut() {
            Some((last, versions)) if *last == name => versions.push(pkg.version.as_str()),
            _ => groups.push((name, vec![pkg.version.as_str()])),
        }
    }
    groups
}

fn print_table(packages: &[PackageId]) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Installed Typst packages and versions");

    let groups = group_versions(packages);
    let width = groups
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0)
        .max("PACKAGE".len());

    println!(
        "{:<width$}  {}",
        style("PACKAGE").bold(),
        style("VERSIONS").bold(),
        width = width
    );
    println!("{}", "-".repeat(width + 2 + "VERSIONS".len()));

    for (name, versions) in &groups {
        println!("{:<width$}  {}", name, versions.join(", "), width = width);
    }

    println!();
    println!(
        "{} package(s), {} version(s)",
        groups.len(),
        packages.len()
    );
}

fn print_json(packages: &[PackageId]) -> TypiResult<()> {
    let json = serde_json::to_string_pretty(packages)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(packages: &[PackageId]) {
    for pkg in packages {
        println!("{}", pkg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(namespace: &str, name: &str, version: &str) -> PackageId {
        PackageId::new(namespace, name, version).unwrap()
    }

    #[test]
    fn groups_versions_per_package() {
        let packages = vec![
            id("local", "alpha", "0.1.0"),
            id("local", "alpha", "0.2.0"),
            id("local", "beta", "1.0.0"),
            id("work", "alpha", "3.0.0"),
        ];

        let groups = group_versions(&packages);
        assert_eq!(
            groups,
            vec![
                ("@local/alpha".to_string(), vec!["0.1.0", "0.2.0"]),
                ("@local/beta".to_string(), vec!["1.0.0"]),
                ("@work/alpha".to_string(), vec!["3.0.0"]),
            ]
        );
    }

    #[test]
    fn json_has_triple_fields() {
        let json = serde_json::to_value(vec![id("local", "mypkg", "1.0.0")]).unwrap();
        assert_eq!(json[0]["namespace"], "local");
        assert_eq!(json[0]["name"], "mypkg");
        assert_eq!(json[0]["version"], "1.0.0");
    }
}
