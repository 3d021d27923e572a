//! Addon archives
//!
//! Packages an addon directory into `<id>/<id>-<version>.zip`, leaving out
//! version-control metadata, OS and editor artifacts, virtual environments
//! and compiled bytecode.

mod builder;
mod error;
mod ignore;

pub use builder::{ArchiveArtifact, ArchiveBuilder, ArchiveOutcome, ArchivePolicy};
pub use error::{Error, Result};
pub use ignore::{DEFAULT_IGNORED_NAMES, DEFAULT_IGNORED_SUFFIXES, IgnoreRules};
