//! Addon manifest parsing
//!
//! - **xml**: owned element tree with deterministic serialization
//! - **reader**: reads `<addon>/addon-manifest.xml` into an [`AddonDescriptor`]
//! - **migration**: table-driven rewrite of deprecated dependency pins

pub mod error;
pub mod migration;
pub mod reader;
pub mod xml;

pub use error::{Error, Result};
pub use migration::{AppliedMigration, DependencyMigration, MigrationTable, default_migrations};
pub use reader::{AddonDescriptor, DEFAULT_MANIFEST_FILE, ManifestReader};
pub use xml::{Element, Node};
