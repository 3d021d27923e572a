//! Filesystem layer for the addon repository packager
//!
//! Provides the release-root layout, atomic writes with advisory locking,
//! the index checksum, and format-agnostic configuration loading.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod layout;

pub use checksum::{ChecksumRecord, ChecksumWriter};
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::RunLock;
pub use layout::{ReleaseLayout, ReleasePath};
