//! Integration tests for the addon-pack binary.
//!
//! These tests exercise the compiled binary using assert_cmd.

use addon_test_utils::{ManifestBuilder, TestRelease};
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

/// Get a Command for the addon-pack binary
fn pack_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("addon-pack"));
    cmd.env_remove("RUST_LOG").env_remove("ADDON_PACK_CONFIG");
    cmd
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_output() {
    pack_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("addons.xml"));
}

#[test]
fn test_version_output() {
    pack_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("addon-pack"));
}

// ============================================================================
// Packaging Tests
// ============================================================================

#[test]
fn test_default_roots_are_packaged() {
    let release = TestRelease::new("matrix");
    release.add_addon("plugin.video.a", &ManifestBuilder::new("plugin.video.a", "1.0.0"));

    pack_cmd()
        .current_dir(release.workspace())
        .arg("--no-color")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Processing matrix"))
        .stdout(predicate::str::contains("Updated plugin.video.a 1.0.0"))
        .stdout(predicate::str::contains("OK matrix: 1 updated"));

    release.assert_file_exists("zips/addons.xml");
    release.assert_file_exists("zips/addons.xml.md5");
    release.assert_file_exists("zips/plugin.video.a/plugin.video.a-1.0.0.zip");
}

#[test]
fn test_second_run_reports_no_changes() {
    let release = TestRelease::new("leia");
    release.add_addon("plugin.video.a", &ManifestBuilder::new("plugin.video.a", "1.0.0"));

    pack_cmd().current_dir(release.workspace()).assert().code(0);
    let index = release.index_text();

    pack_cmd()
        .current_dir(release.workspace())
        .arg("--no-color")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No changes to"))
        .stdout(predicate::str::contains("0 updated, 0 archive(s) created"));

    assert_eq!(release.index_text(), index);
}

#[test]
fn test_explicit_root_argument() {
    let release = TestRelease::new("nexus");
    release.add_addon("script.b", &ManifestBuilder::new("script.b", "0.1.0"));

    pack_cmd()
        .current_dir(release.workspace())
        .arg("nexus")
        .assert()
        .code(0);

    release.assert_file_exists("zips/script.b/script.b-0.1.0.zip");
}

#[test]
fn test_partial_failure_exit_code() {
    let release = TestRelease::new("matrix");
    release.add_addon("plugin.a", &ManifestBuilder::new("plugin.a", "1.0.0"));
    release.add_raw_addon("plugin.broken", "<addon version=\"1.0.0\"/>");

    pack_cmd()
        .current_dir(release.workspace())
        .arg("--no-color")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error: Skipped"))
        .stderr(predicate::str::contains("plugin.broken"))
        .stdout(predicate::str::contains("FAILED matrix"));

    assert!(release.index_text().contains("plugin.a"));
}

#[test]
fn test_missing_explicit_root_is_partial_failure() {
    let release = TestRelease::new("matrix");

    pack_cmd()
        .current_dir(release.workspace())
        .args(["--no-color", "krypton"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Cannot process krypton"));
}

#[test]
fn test_no_release_roots_is_fatal() {
    let dir = tempfile::tempdir().unwrap();

    pack_cmd()
        .current_dir(dir.path())
        .arg("--no-color")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No release roots found"));
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_config_file_in_working_directory() {
    let release = TestRelease::new("custom");
    release.write(
        "plugin.a/addon.xml",
        &ManifestBuilder::new("plugin.a", "1.0.0").build(),
    );
    fs::write(
        release.workspace().join("addon-pack.toml"),
        "release_roots = [\"custom\"]\nmanifest_file = \"addon.xml\"\n",
    )
    .unwrap();

    pack_cmd().current_dir(release.workspace()).assert().code(0);

    release.assert_file_exists("zips/plugin.a/plugin.a-1.0.0.zip");
    release.assert_file_exists("zips/plugin.a/addon.xml");
}

#[test]
fn test_config_flag_with_json() {
    let release = TestRelease::new("repo");
    release.add_addon("plugin.a", &ManifestBuilder::new("plugin.a", "1.0.0"));
    let config = release.workspace().join("packager.json");
    fs::write(&config, r#"{"output_dir": "dist"}"#).unwrap();

    pack_cmd()
        .current_dir(release.workspace())
        .arg("--config")
        .arg(&config)
        .assert()
        .code(0);

    release.assert_file_exists("dist/addons.xml");
    release.assert_file_not_exists("zips");
}

#[test]
fn test_invalid_config_is_fatal() {
    let release = TestRelease::new("matrix");
    fs::write(
        release.workspace().join("addon-pack.toml"),
        "archive_policy = \"sometimes\"\n",
    )
    .unwrap();

    pack_cmd()
        .current_dir(release.workspace())
        .arg("--no-color")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error:"));
}

#[test]
fn test_log_mode_emits_structured_records() {
    let release = TestRelease::new("matrix");
    release.add_addon("plugin.a", &ManifestBuilder::new("plugin.a", "1.0.0"));

    pack_cmd()
        .current_dir(release.workspace())
        .args(["--no-color", "--log"])
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Updated plugin.a 1.0.0"))
        .stderr(predicate::str::contains("addon=plugin.a"))
        .stderr(predicate::str::contains("version=1.0.0"))
        .stderr(predicate::str::contains("bytes="))
        .stderr(predicate::str::contains("context=").not());
}
