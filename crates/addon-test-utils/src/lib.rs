//! Shared test utilities for the addon repository packager workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`manifest`]: [`ManifestBuilder`] for addon manifest XML
//! - [`release`]: [`TestRelease`] builder for release roots on disk

pub mod manifest;
pub mod release;

pub use manifest::ManifestBuilder;
pub use release::TestRelease;
