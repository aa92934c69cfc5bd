//! Integration tests for `extval validate`
//!
//! Runs the built binary against extension directories created on the fly and
//! checks the exit status and the verdict printed on stdout or stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `<tmp>/<name>/manifest.yaml` and an empty `rootfs/`
fn extension(name: &str, version: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(name);
    fs::create_dir_all(path.join("rootfs/usr/local/lib")).unwrap();
    fs::write(
        path.join("manifest.yaml"),
        format!(
            "version: v1alpha1\nmetadata:\n  name: {}\n  version: \"{}\"\n  author: Test\n",
            name, version
        ),
    )
    .unwrap();
    (temp, path)
}

fn add_spec(path: &Path, file: &str, content: &str) {
    let dir = path.join("rootfs/usr/local/etc/containers");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), content).unwrap();
}

fn extval() -> Command {
    let mut cmd = Command::cargo_bin("extval").unwrap();
    cmd.env_remove("EXTVAL_VERSION_POLICY")
        .env_remove("EXTVAL_PLATFORM_VERSION")
        .env_remove("EXTVAL_SERVICE_SPEC_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_valid_extension_passes() {
    let (_temp, path) = extension("gvisor", "20230914.1");
    add_spec(&path, "gvisor.yaml", "name: gvisor\ncontainer:\n  entrypoint: ./runsc\n");

    extval()
        .args(["validate", "--rootfs"])
        .arg(&path)
        .args(["--pkg-name", "gvisor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Extension gvisor 20230914.1 is valid"))
        .stdout(predicate::str::contains("services: gvisor"));
}

#[test]
fn test_quiet_prints_only_verdict() {
    let (_temp, path) = extension("gvisor", "1.0.0");

    extval()
        .args(["-q", "validate", "--rootfs"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("Validating").not());
}

#[test]
fn test_invalid_version_fails() {
    let (_temp, path) = extension("gvisor", "latest");

    extval()
        .args(["validate", "--rootfs"])
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "invalid version format latest for extension: gvisor",
        ));
}

#[test]
fn test_identity_mismatch_fails() {
    let (_temp, path) = extension("bar", "1.0.0");

    extval()
        .args(["validate", "--rootfs"])
        .arg(&path)
        .args(["--pkg-name", "foo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "pkg name does not match extension name: foo != bar",
        ));
}

#[test]
fn test_pkg_file_supplies_expected_name() {
    let (temp, path) = extension("gvisor", "1.0.0");
    let pkg = temp.path().join("pkg.yaml");
    fs::write(&pkg, "name: gvisor\nvariant: scratch\n").unwrap();

    extval()
        .args(["validate", "--rootfs"])
        .arg(&path)
        .arg("--pkg-file")
        .arg(&pkg)
        .assert()
        .success();

    fs::write(&pkg, "name: nvidia\n").unwrap();
    extval()
        .args(["validate", "--rootfs"])
        .arg(&path)
        .arg("--pkg-file")
        .arg(&pkg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nvidia != gvisor"));
}

#[test]
fn test_empty_rootfs_is_rejected() {
    extval()
        .args(["validate", "--rootfs", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rootfs path is required"));
}

#[test]
fn test_empty_rootfs_checked_before_pkg_file() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing-pkg.yaml");

    extval()
        .args(["validate", "--rootfs", ""])
        .arg("--pkg-file")
        .arg(&missing)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("rootfs path is required"))
        .stderr(predicate::str::contains("pkg file").not());
}

#[test]
fn test_unreadable_pkg_file_is_not_blamed_on_extension() {
    let (temp, path) = extension("gvisor", "1.0.0");
    let missing = temp.path().join("missing-pkg.yaml");

    extval()
        .args(["validate", "--rootfs"])
        .arg(&path)
        .arg("--pkg-file")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error reading pkg file"))
        .stderr(predicate::str::contains("error loading extension").not());
}

#[test]
fn test_unquoted_version_reported_as_written() {
    let (_temp, path) = extension("nvidia", "1.0.0");
    fs::write(
        path.join("manifest.yaml"),
        "version: v1alpha1\nmetadata:\n  name: nvidia\n  version: 1.10\n",
    )
    .unwrap();

    extval()
        .args(["validate", "--rootfs"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Extension nvidia 1.10 is valid"));
}

#[test]
fn test_missing_rootfs_flag_is_usage_error() {
    extval().arg("validate").assert().failure().code(2);
}

#[test]
fn test_conflicting_identity_flags() {
    extval()
        .args([
            "validate",
            "--rootfs",
            "/tmp/ext",
            "--pkg-name",
            "a",
            "--pkg-file",
            "pkg.yaml",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_strict_policy_flag() {
    let (_temp, path) = extension("nvidia", "1.2");

    extval()
        .args(["validate", "--rootfs"])
        .arg(&path)
        .assert()
        .success();

    extval()
        .args(["validate", "--version-policy", "strict", "--rootfs"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid version format 1.2"));
}

#[test]
fn test_strict_policy_from_env() {
    let (_temp, path) = extension("nvidia", "1.2");

    extval()
        .env("EXTVAL_VERSION_POLICY", "strict")
        .args(["validate", "--rootfs"])
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn test_config_file_layer() {
    let (temp, path) = extension("nvidia", "1.2");
    let config = temp.path().join("extval.yaml");
    fs::write(&config, "version-policy: strict\n").unwrap();

    extval()
        .arg("--config")
        .arg(&config)
        .args(["validate", "--rootfs"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid version format"));

    // Flags win over the file
    extval()
        .arg("--config")
        .arg(&config)
        .args(["validate", "--version-policy", "permissive", "--rootfs"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_bad_spec_fails() {
    let (_temp, path) = extension("gvisor", "1.0.0");
    add_spec(&path, "broken.yaml", "name: [oops\n");

    extval()
        .args(["validate", "--rootfs"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.yaml"));
}

#[test]
fn test_platform_constraint_and_skip() {
    let (_temp, path) = extension("gvisor", "1.0.0");
    fs::write(
        path.join("manifest.yaml"),
        "version: v1alpha1\nmetadata:\n  name: gvisor\n  version: 1.0.0\n  compatibility:\n    platform:\n      version: \">= v1.5.0\"\n",
    )
    .unwrap();

    extval()
        .args(["validate", "--platform-version", "v1.4.0", "--rootfs"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("extension gvisor failed validation"));

    extval()
        .args([
            "validate",
            "--platform-version",
            "v1.4.0",
            "--skip-constraints",
            "--rootfs",
        ])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_disallowed_path_and_skip_contents() {
    let (_temp, path) = extension("gvisor", "1.0.0");
    fs::create_dir_all(path.join("rootfs/etc")).unwrap();
    fs::write(path.join("rootfs/etc/shadow"), "x").unwrap();

    extval()
        .args(["validate", "--rootfs"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("/etc/shadow"));

    extval()
        .args(["validate", "--skip-contents", "--rootfs"])
        .arg(&path)
        .assert()
        .success();
}
