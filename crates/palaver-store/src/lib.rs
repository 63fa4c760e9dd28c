//! Palaver store shell
//!
//! Host-side wrapper around the pure transition core in `palaver-core`.
//! [`Store`] owns the live snapshot, dispatches events through the core,
//! and executes the effects that come back: preference write-back goes to
//! a [`PreferenceStore`] collaborator and rejections are logged through
//! `tracing`. State logic lives entirely in the core; nothing here decides
//! what a transition means.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod prefs;
mod store;

pub use prefs::{MemoryPreferences, PreferenceStore};
pub use store::Store;
