//! PackagerConfig loading through the format-agnostic store

use addon_archive::ArchivePolicy;
use addon_core::{CONFIG_FILE_NAME, DEFAULT_RELEASE_ROOTS, PackagerConfig};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

#[test]
fn absent_file_gives_defaults() {
    let temp = TempDir::new().unwrap();

    let config = PackagerConfig::discover(temp.path()).unwrap();

    assert_eq!(config, PackagerConfig::default());
    assert_eq!(config.release_roots, DEFAULT_RELEASE_ROOTS);
}

#[test]
fn discovered_file_is_used() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(CONFIG_FILE_NAME),
        "release_roots = [\"nexus\"]\narchive_policy = \"rebuild\"\n",
    )
    .unwrap();

    let config = PackagerConfig::discover(temp.path()).unwrap();

    assert_eq!(config.release_roots, vec!["nexus"]);
    assert_eq!(config.archive_policy, ArchivePolicy::Rebuild);
}

#[rstest]
#[case::json("packager.json", r#"{"copy_metadata": false, "migrations": []}"#)]
#[case::yaml("packager.yaml", "copy_metadata: false\nmigrations: []\n")]
fn other_formats(#[case] file: &str, #[case] content: &str) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(file);
    fs::write(&path, content).unwrap();

    let config = PackagerConfig::load(&path).unwrap();

    assert!(!config.copy_metadata);
    assert!(config.migrations.is_empty());
}

#[test]
fn invalid_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(CONFIG_FILE_NAME), "archive_policy = \"sometimes\"").unwrap();

    assert!(PackagerConfig::discover(temp.path()).is_err());
}
