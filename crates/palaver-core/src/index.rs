//! Conversation position lookup.

use std::{collections::HashMap, sync::Arc};

use crate::state::{Linkman, LinkmanId};

/// Position of `id` within the ordered conversation list.
///
/// Linear scan; the list is small and the handlers look an id up at most
/// once per event. Hosts doing repeated read-side lookups build a
/// [`LinkmanIndex`] instead.
pub fn position(linkmen: &[Arc<Linkman>], id: &str) -> Option<usize> {
    linkmen.iter().position(|linkman| linkman.id == id)
}

/// Memoized id-to-position map over one snapshot's conversation list.
///
/// Valid only for the snapshot it was built from; rebuild after any
/// transition, since nearly every event can reorder or reshape the list.
#[derive(Debug, Clone, Default)]
pub struct LinkmanIndex {
    positions: HashMap<LinkmanId, usize>,
}

impl LinkmanIndex {
    /// Build the index for one conversation list.
    pub fn build(linkmen: &[Arc<Linkman>]) -> Self {
        let positions =
            linkmen.iter().enumerate().map(|(pos, linkman)| (linkman.id.clone(), pos)).collect();
        Self { positions }
    }

    /// Position of `id`, or `None` when absent.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Number of indexed conversations.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
