//! Machine-readable run summary

use addon_fs::ChecksumRecord;
use std::path::PathBuf;

/// An addon that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonFailure {
    pub directory: PathBuf,
    pub message: String,
}

/// Summary of one release root's run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Release root that was processed
    pub root: PathBuf,
    /// Addon directories found by discovery
    pub discovered: Vec<PathBuf>,
    /// Ids whose index entry was inserted or replaced
    pub updated: Vec<String>,
    pub archives_created: Vec<PathBuf>,
    pub archives_reused: Vec<PathBuf>,
    pub failed: Vec<AddonFailure>,
    /// Whether the index file was written
    pub index_written: bool,
    /// Set once the checksum of the written index was written too
    pub checksum: Option<ChecksumRecord>,
    pub persist_errors: Vec<String>,
}

impl SyncReport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Whether any merge changed the index.
    pub fn index_changed(&self) -> bool {
        !self.updated.is_empty()
    }

    /// No addon or persist step failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.persist_errors.is_empty()
    }
}
