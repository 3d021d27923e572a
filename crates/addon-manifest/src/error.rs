//! Error types for addon-manifest

use std::path::PathBuf;

/// Result type for addon-manifest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading manifests
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed XML, including a document without a single root element
    #[error("Malformed XML: {message}")]
    Xml { message: String },

    /// A manifest could not be read or lacks its identity attributes
    #[error("Invalid manifest in {directory}: {message}")]
    Parse { directory: PathBuf, message: String },
}

impl Error {
    pub(crate) fn xml(message: impl std::fmt::Display) -> Self {
        Self::Xml {
            message: message.to_string(),
        }
    }

    pub(crate) fn parse(directory: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            directory: directory.into(),
            message: message.into(),
        }
    }
}
