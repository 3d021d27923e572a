//! Error types for addon-archive

use std::path::PathBuf;

/// Result type for addon-archive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building archives
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk addon directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to write archive {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// An archive for this version exists but its content differs
    #[error("{path} already exists with different content; bump the addon version")]
    VersionCollision { path: PathBuf },

    #[error(transparent)]
    Fs(#[from] addon_fs::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
