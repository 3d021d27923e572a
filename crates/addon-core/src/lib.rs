//! Repository synchronization for the addon repository packager
//!
//! This crate reconciles addon directories with the persisted index of a
//! release root:
//!
//! - **Index**: the aggregate `addons.xml` document, one entry per addon id
//! - **Reconciler**: replace-or-insert folding with dependency migration
//! - **Assets**: copies manifests and art next to the archives
//! - **Report**: structured events for pluggable output
//! - **SyncEngine**: the Discover → Reconcile → Persist cycle
//!
//! # Architecture
//!
//! ```text
//!                 addon-cli
//!                     |
//!                 addon-core
//!                     |
//!     +---------------+---------------+
//!     |               |               |
//! addon-fs     addon-manifest   addon-archive
//! ```

pub mod assets;
pub mod config;
pub mod error;
pub mod index;
pub mod report;
pub mod sync;

pub use config::{CONFIG_FILE_NAME, DEFAULT_RELEASE_ROOTS, PackagerConfig};
pub use error::{Error, Result};
pub use index::{IndexDocument, IndexReconciler, Merge};
pub use report::{EventLevel, MemoryReporter, Reporter, SyncEvent, TracingReporter};
pub use sync::{AddonFailure, SyncEngine, SyncReport};
