//! Palaver client state core
//!
//! Pure event-to-state transition engine for the palaver chat client: the
//! authoritative store of the signed-in user's conversation list ("linkmen"),
//! per-conversation message histories, read/unread tracking, and the focused
//! conversation.
//!
//! # Architecture
//!
//! Sans-IO and action-based: the host decodes inbound protocol messages into
//! [`Event`]s and feeds them to [`apply`] one at a time, in delivery order.
//! Each call returns a [`Transition`] holding the next immutable
//! [`StateTree`] snapshot plus [`Effect`] instructions for the host to
//! execute (preference write-back, rejection diagnostics). The previous
//! snapshot is never mutated; readers holding it stay consistent.
//!
//! # Components
//!
//! - [`StateTree`]: immutable snapshot model
//! - [`Event`] / [`Effect`]: transition inputs and host instructions
//! - [`apply`]: the transition table
//! - [`LinkmanIndex`] / [`position`]: conversation position lookup
//! - [`last_activity`] / [`sort_by_recency`]: recency ordering policy

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod event;
mod index;
mod ordering;
mod state;
mod transition;

pub use error::TransitionError;
pub use event::{Effect, Event, MessagePatch};
pub use index::{LinkmanIndex, position};
pub use ordering::{last_activity, sort_by_recency};
pub use state::{
    Linkman, LinkmanId, LinkmanKind, Message, MessageId, MessageKind, StateTree, UiField,
    UiPreferences, UiState, User, UserId, UserSummary,
};
pub use transition::{Transition, apply};
