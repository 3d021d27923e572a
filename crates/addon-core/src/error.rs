//! Error types for addon-core

use std::path::PathBuf;

/// Result type for addon-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in addon-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The persisted index document cannot be used
    #[error("Invalid index document {path}: {message}")]
    Index { path: PathBuf, message: String },

    /// The release root cannot be enumerated
    #[error("Cannot read release root {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Copying manifest or art files failed
    #[error("Failed to copy {path}: {source}")]
    MetadataCopy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from addon-fs
    #[error(transparent)]
    Fs(#[from] addon_fs::Error),

    /// Manifest error from addon-manifest
    #[error(transparent)]
    Manifest(#[from] addon_manifest::Error),

    /// Archive error from addon-archive
    #[error(transparent)]
    Archive(#[from] addon_archive::Error),
}
