use addon_fs::io::{self, RunLock};
use addon_fs::{Error, ReleaseLayout};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file_and_parents() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("zips").join("addons.xml");

    io::write_atomic(&path, b"<addons />").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "<addons />");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("addons.xml");
    fs::write(&path, "original").unwrap();

    io::write_atomic(&path, b"updated").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "updated");
}

#[test]
fn test_write_atomic_leaves_no_temp_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("addons.xml");

    io::write_atomic(&path, b"content").unwrap();

    assert!(!io::temp_path_for(&path).exists());
    let names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("addons.xml")]);
}

#[test]
fn test_read_text_nonexistent_file() {
    let temp = TempDir::new().unwrap();
    let result = io::read_text(&temp.path().join("missing.xml"));
    assert!(matches!(result, Err(Error::Io { .. })));
}

#[test]
fn test_run_lock_is_exclusive() {
    let temp = TempDir::new().unwrap();
    let layout = ReleaseLayout::new(temp.path());

    let first = RunLock::acquire(&layout.lock_path()).unwrap();
    let second = RunLock::acquire(&layout.lock_path());
    assert!(matches!(second, Err(Error::Locked { .. })));

    drop(first);
    assert!(RunLock::acquire(&layout.lock_path()).is_ok());
}
