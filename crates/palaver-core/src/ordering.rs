//! Recency ordering of the conversation list.
//!
//! The list is kept most-recent-first. Two disciplines, applied
//! consistently: bulk history loads re-derive the full order via
//! [`sort_by_recency`], while single live-message arrival only moves the
//! receiving conversation to the front. The front-move assumes the new
//! message is globally the most recent; producers deliver out-of-order
//! backfill through the history-page event, which never reorders.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::state::Linkman;

/// Ordering key: the last message's timestamp, falling back to the
/// conversation's creation time while the history is empty.
pub fn last_activity(linkman: &Linkman) -> DateTime<Utc> {
    linkman.messages.last().map_or(linkman.create_time, |message| message.create_time)
}

/// Stable descending sort by [`last_activity`].
///
/// Ties keep their previous relative order.
pub fn sort_by_recency(linkmen: &mut [Arc<Linkman>]) {
    linkmen.sort_by(|a, b| last_activity(b).cmp(&last_activity(a)));
}

/// Move the entry at `position` to the front, shifting the prefix down one.
pub(crate) fn move_to_front(linkmen: &mut [Arc<Linkman>], position: usize) {
    linkmen[..=position].rotate_right(1);
}
