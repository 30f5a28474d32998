//! Integration tests for typi

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// typi pointed at a private cache and config inside `temp`
    fn typi(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("typi");
        cmd.env("TYPI_CACHE_ROOT", temp.path().join("cache"))
            .env("TYPI_CONFIG", temp.path().join("config.toml"))
            .env("CI", "1");
        cmd
    }

    fn write_package(dir: &Path, name: &str, version: &str, lib: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("typst.toml"),
            format!(
                "[package]\nname = \"{}\"\nversion = \"{}\"\nentrypoint = \"lib.typ\"\n",
                name, version
            ),
        )
        .unwrap();
        fs::write(dir.join("lib.typ"), lib).unwrap();
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        typi(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Typst local package installer"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        typi(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("typi"));
    }

    #[test]
    fn path_required_without_list() {
        let temp = TempDir::new().unwrap();
        typi(&temp).assert().failure().code(2);
    }

    #[test]
    fn install_then_skip_then_update() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("pkgA");
        write_package(&src, "mypkg", "1.0.0", "#let v = 1");
        let installed = temp.path().join("cache/local/mypkg/1.0.0/lib.typ");

        typi(&temp)
            .arg(&src)
            .assert()
            .success()
            .stdout(predicate::str::contains("Installed package @local/mypkg:1.0.0"));
        assert_eq!(fs::read_to_string(&installed).unwrap(), "#let v = 1");

        fs::write(src.join("lib.typ"), "#let v = 2").unwrap();
        typi(&temp)
            .arg(&src)
            .assert()
            .success()
            .stdout(predicate::str::contains("already installed"));
        assert_eq!(fs::read_to_string(&installed).unwrap(), "#let v = 1");

        typi(&temp)
            .arg(&src)
            .arg("--update")
            .assert()
            .success()
            .stdout(predicate::str::contains("Updated package @local/mypkg:1.0.0"));
        assert_eq!(fs::read_to_string(&installed).unwrap(), "#let v = 2");
    }

    #[test]
    fn missing_manifest_fails() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("not-a-package");
        fs::create_dir_all(&src).unwrap();

        typi(&temp)
            .arg(&src)
            .assert()
            .failure()
            .stderr(predicate::str::contains("No typst.toml"));
        assert!(!temp.path().join("cache/local").exists());
    }

    #[test]
    fn missing_source_fails() {
        let temp = TempDir::new().unwrap();
        typi(&temp)
            .arg(temp.path().join("nope"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not exist"));
    }

    #[test]
    fn filesystem_error_shows_cause() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("pkgA");
        write_package(&src, "mypkg", "1.0.0", "");
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        typi(&temp)
            .env("TYPI_CACHE_ROOT", blocker.join("cache"))
            .arg(&src)
            .assert()
            .failure()
            .code(1)
            .stderr(
                predicate::str::contains("creating directory")
                    .and(predicate::str::contains("Not a directory")),
            );
    }

    #[test]
    fn honor_exclude_filters_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("pkgA");
        write_package(&src, "mypkg", "1.0.0", "");
        let manifest = fs::read_to_string(src.join("typst.toml")).unwrap();
        fs::write(
            src.join("typst.toml"),
            format!("{}exclude = [\"*.pdf\"]\n", manifest),
        )
        .unwrap();
        fs::write(src.join("manual.pdf"), "").unwrap();
        let entry = temp.path().join("cache/local/mypkg/1.0.0");

        typi(&temp).arg(&src).assert().success();
        assert!(entry.join("manual.pdf").is_file());

        typi(&temp).arg(&src).args(["-u", "--honor-exclude"]).assert().success();
        assert!(entry.join("lib.typ").is_file());
        assert!(!entry.join("manual.pdf").exists());
    }

    #[test]
    fn list_empty() {
        let temp = TempDir::new().unwrap();
        typi(&temp)
            .arg("--list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No packages installed"));
    }

    #[test]
    fn list_after_installs() {
        let temp = TempDir::new().unwrap();
        for (dir, version) in [("v1", "0.1.0"), ("v2", "0.2.0")] {
            let src = temp.path().join(dir);
            write_package(&src, "mypkg", version, "");
            typi(&temp).arg(&src).assert().success();
        }

        typi(&temp)
            .args(["--list", "--format", "plain"])
            .assert()
            .success()
            .stdout("@local/mypkg:0.1.0\n@local/mypkg:0.2.0\n");

        typi(&temp)
            .arg("-l")
            .assert()
            .success()
            .stdout(predicate::str::contains("@local/mypkg").and(predicate::str::contains("0.1.0, 0.2.0")));
    }

    #[test]
    fn list_skips_install() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("pkgA");
        write_package(&src, "mypkg", "1.0.0", "");

        typi(&temp)
            .arg(&src)
            .args(["--list", "--format", "json"])
            .assert()
            .success()
            .stdout("[]\n");
        assert!(!temp.path().join("cache/local/mypkg").exists());
    }

    #[test]
    fn invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.toml"), "[cache\n").unwrap();

        typi(&temp)
            .arg("--list")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
