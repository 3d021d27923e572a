//! Index checksum
//!
//! Downstream installers compare `addons.xml.md5` against their cached copy
//! to decide whether to re-download the index. The digest is MD5 over the
//! exact bytes of the index file, lowercase hex, no trailing newline.

use crate::{Error, Result, io};
use md5::{Digest, Md5};
use std::fs;
use std::path::Path;

/// A hex digest of the serialized index document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumRecord(String);

impl ChecksumRecord {
    /// Digest the given bytes.
    pub fn compute(bytes: &[u8]) -> Self {
        let mut hasher = Md5::new();
        hasher.update(bytes);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChecksumRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes and persists checksum records.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChecksumWriter;

impl ChecksumWriter {
    pub fn new() -> Self {
        Self
    }

    /// Digest `serialized_index` and write the hex string to `destination`.
    ///
    /// The bytes must be the ones written to the index file; any
    /// re-encoding in between breaks verification downstream.
    pub fn write(&self, serialized_index: &[u8], destination: &Path) -> Result<ChecksumRecord> {
        let record = ChecksumRecord::compute(serialized_index);
        io::write_atomic(destination, record.as_str().as_bytes()).map_err(|e| match e {
            Error::Io { path, source } => Error::Checksum { path, source },
            other => other,
        })?;
        tracing::debug!(path = %destination.display(), checksum = %record, "wrote checksum");
        Ok(record)
    }

    /// Recompute the digest of `index_path` and compare it with the record
    /// stored at `checksum_path`.
    pub fn verify(&self, index_path: &Path, checksum_path: &Path) -> Result<ChecksumRecord> {
        let index = fs::read(index_path).map_err(|e| Error::io(index_path, e))?;
        let recorded = io::read_text(checksum_path)?;
        let computed = ChecksumRecord::compute(&index);

        if recorded.trim() != computed.as_str() {
            return Err(Error::ChecksumMismatch {
                path: checksum_path.to_path_buf(),
                recorded: recorded.trim().to_string(),
                computed: computed.0,
            });
        }
        Ok(computed)
    }
}
