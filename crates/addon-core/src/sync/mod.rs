//! Release synchronization
//!
//! One [`SyncEngine`] run per release root: discover addon directories,
//! reconcile each one with the index, then persist the index and its
//! checksum if anything changed.

mod engine;
mod report;

pub use engine::SyncEngine;
pub use report::{AddonFailure, SyncReport};
