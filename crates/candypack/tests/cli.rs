//! CLI tests for candypack.
//!
//! Pack runs use `true` and `false` as stand-ins for the build, test and
//! packaging tools, so those tests only run on Unix.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn candypack() -> Command {
    cargo_bin_cmd!("candypack")
}

const ASSEMBLY_INFO: &str = r#"
[assembly: AssemblyTitle("Candy")]
[assembly: AssemblyVersion("1.2.3.4")]
[assembly: AssemblyFileVersion("1.2.3.4")]
"#;

/// A project with two targets, two artifacts and a version file, configured
/// to run the given tools.
fn project(build: &str, test: &str, package: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir(root.join(".git")).unwrap();
    fs::create_dir_all(root.join("out")).unwrap();
    fs::write(root.join("out/Candy.dll"), b"MZ assembly bytes").unwrap();
    fs::write(root.join("out/Candy.xml"), b"<doc/>").unwrap();
    fs::write(root.join("AssemblyInfo.cs"), ASSEMBLY_INFO).unwrap();
    fs::write(
        root.join("candypack.toml"),
        format!(
            r#"
[project]
version_file = "AssemblyInfo.cs"

[tools]
build = "{build}"
test = "{test}"
package = "{package}"

[build]
test_assembly = "out/Candy.Tests.dll"
artifacts = ["out/Candy.dll", "out/Candy.xml"]

[[targets]]
solution = "net35.sln"
framework = "net35"

[[targets]]
solution = "net45.sln"
framework = "net45"
"#
        ),
    )
    .unwrap();
    temp
}

fn assert_copied(root: &Path, framework: &str) {
    for name in ["Candy.dll", "Candy.xml"] {
        assert_eq!(
            fs::read(root.join("lib").join(framework).join(name)).unwrap(),
            fs::read(root.join("out").join(name)).unwrap()
        );
    }
}

// =============================================================================
// Dispatch
// =============================================================================

#[test]
fn no_command_prints_usage_and_succeeds() {
    let temp = TempDir::new().unwrap();
    // An unparsable config proves nothing was loaded.
    fs::write(temp.path().join("candypack.toml"), "not = [valid").unwrap();

    candypack()
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Available commands: pack"));
}

#[test]
fn empty_command_prints_usage_and_succeeds() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("candypack.toml"), "not = [valid").unwrap();

    candypack()
        .current_dir(temp.path())
        .arg("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available commands: pack"));
}

#[test]
fn unknown_command_fails() {
    candypack()
        .arg("publish")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn help_flag_works() {
    candypack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

// =============================================================================
// version / targets / init
// =============================================================================

#[test]
fn version_prints_three_components() {
    let temp = project("true", "true", "true");
    candypack()
        .current_dir(temp.path())
        .arg("version")
        .assert()
        .success()
        .stdout("1.2.3\n");
}

#[test]
fn version_without_declaration_fails() {
    let temp = project("true", "true", "true");
    fs::write(temp.path().join("AssemblyInfo.cs"), "// nothing here\n").unwrap();

    candypack()
        .current_dir(temp.path())
        .arg("version")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no AssemblyVersion"));
}

#[test]
fn targets_are_listed_in_order() {
    let temp = project("true", "true", "true");
    candypack()
        .current_dir(temp.path())
        .arg("targets")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. net35.sln -> lib/net35"))
        .stdout(predicate::str::contains("2. net45.sln -> lib/net45"));
}

#[test]
fn init_writes_config_once() {
    let temp = TempDir::new().unwrap();
    candypack()
        .current_dir(temp.path())
        .arg("init")
        .assert()
        .success();
    assert!(temp.path().join("candypack.toml").is_file());

    candypack()
        .current_dir(temp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite"));
}

// =============================================================================
// pack
// =============================================================================

#[cfg(unix)]
#[test]
fn pack_copies_every_target_and_writes_summary() {
    let temp = project("true", "true", "true");
    candypack()
        .current_dir(temp.path())
        .args(["pack", "--summary", "reports/pack.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Package 1.2.3 created"));

    assert_copied(temp.path(), "net35");
    assert_copied(temp.path(), "net45");

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("reports/pack.json")).unwrap())
            .unwrap();
    assert_eq!(summary["version"], "1.2.3");
    assert_eq!(summary["targets"].as_array().unwrap().len(), 2);
}

#[cfg(unix)]
#[test]
fn pack_stops_at_first_build_failure() {
    let temp = project("false", "true", "true");
    candypack()
        .current_dir(temp.path())
        .arg("pack")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("[!] Cannot build net35.sln"))
        .stdout(predicate::str::contains("net45").not());

    assert!(!temp.path().join("lib").exists());
}

#[cfg(unix)]
#[test]
fn pack_reports_test_failure() {
    let temp = project("true", "false", "true");
    candypack()
        .current_dir(temp.path())
        .arg("pack")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("[!] Cannot run tests for net35.sln"));

    assert!(!temp.path().join("lib/net35").exists());
}

#[cfg(unix)]
#[test]
fn pack_reports_package_failure_after_all_targets() {
    let temp = project("true", "true", "false");
    candypack()
        .current_dir(temp.path())
        .arg("pack")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("[!] Cannot make package"));

    assert_copied(temp.path(), "net35");
    assert_copied(temp.path(), "net45");
}

#[test]
fn pack_dry_run_changes_nothing() {
    let temp = project("false", "false", "false");
    candypack()
        .current_dir(temp.path())
        .args(["pack", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run] false net35.sln"))
        .stdout(predicate::str::contains("-Version 1.2.3"));

    assert!(!temp.path().join("lib").exists());
}

#[test]
fn pack_dry_run_writes_no_summary() {
    let temp = project("true", "true", "true");
    candypack()
        .current_dir(temp.path())
        .args(["pack", "--dry-run", "--summary", "reports/pack.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would write run summary"));

    assert!(!temp.path().join("reports").exists());
}

#[test]
fn pack_with_missing_tool_fails() {
    let temp = project("candypack-missing-build-tool", "true", "true");
    candypack()
        .current_dir(temp.path())
        .arg("pack")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "failed to start candypack-missing-build-tool",
        ));
}

#[test]
fn explicit_config_path_sets_root() {
    let temp = project("true", "true", "true");
    let elsewhere = TempDir::new().unwrap();
    candypack()
        .current_dir(elsewhere.path())
        .arg("--config")
        .arg(temp.path().join("candypack.toml"))
        .arg("version")
        .assert()
        .success()
        .stdout("1.2.3\n");
}
