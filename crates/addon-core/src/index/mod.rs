//! The aggregate index document
//!
//! `addons.xml` holds one manifest tree per addon id. The
//! [`IndexReconciler`] folds freshly read descriptors into it.

mod document;
mod reconciler;

pub use document::{INDEX_ROOT, IndexDocument};
pub use reconciler::{IndexReconciler, Merge};
