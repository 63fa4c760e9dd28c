//! The dispatching store.
//!
//! [`Store`] owns the current snapshot and the preference collaborator.
//! Dispatch runs the pure transition, executes the returned effects, and
//! swaps the snapshot; readers keep whatever [`Arc`] they already hold.

use std::sync::Arc;

use palaver_core::{Effect, Event, Linkman, LinkmanIndex, StateTree, apply};
use tracing::{debug, warn};

use crate::prefs::PreferenceStore;

/// Snapshot owner and effect executor.
///
/// Single-threaded by design: events arrive in delivery order and each
/// dispatch completes before the next begins. Concurrent readers share
/// snapshots through [`Store::snapshot`].
#[derive(Debug)]
pub struct Store<P> {
    snapshot: Arc<StateTree>,
    index: LinkmanIndex,
    preferences: P,
}

impl<P: PreferenceStore> Store<P> {
    /// Create a store seeded with the collaborator's persisted preferences.
    pub fn new(preferences: P) -> Self {
        let snapshot = Arc::new(StateTree::initial(preferences.load()));
        let index = LinkmanIndex::build(snapshot.linkmen());
        Self { snapshot, index, preferences }
    }

    /// Apply one event, execute its effects, and publish the next snapshot.
    ///
    /// Rejected events leave the snapshot untouched and are logged; the
    /// caller gets the current snapshot either way.
    pub fn dispatch(&mut self, event: &Event) -> Arc<StateTree> {
        let transition = apply(&self.snapshot, event);

        for effect in transition.effects {
            match effect {
                Effect::PersistPreference { field, value } => {
                    debug!(?field, "persisting preference");
                    self.preferences.save(field, &value);
                },
                Effect::Rejected(error) => {
                    warn!(%error, ?event, "event rejected, state unchanged");
                },
            }
        }

        self.snapshot = Arc::new(transition.state);
        self.index = LinkmanIndex::build(self.snapshot.linkmen());
        Arc::clone(&self.snapshot)
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<StateTree> {
        Arc::clone(&self.snapshot)
    }

    /// Look up a conversation by id in the current snapshot.
    pub fn linkman(&self, id: &str) -> Option<&Arc<Linkman>> {
        let pos = self.index.position(id)?;
        self.snapshot.linkmen().get(pos)
    }

    /// The conversation currently open in the UI, when it resolves.
    pub fn focused_linkman(&self) -> Option<&Arc<Linkman>> {
        self.linkman(self.snapshot.focus.as_deref()?)
    }

    /// Sum of unread counters across the conversation list.
    pub fn total_unread(&self) -> u32 {
        self.snapshot.linkmen().iter().map(|linkman| linkman.unread).sum()
    }

    /// The preference collaborator, for host shutdown flushes.
    pub fn preferences(&self) -> &P {
        &self.preferences
    }
}
