//! Transition error taxonomy.
//!
//! Transitions never fail across the [`apply`](crate::apply) boundary. When an event's precondition does not hold, the input snapshot
//! comes back unchanged and the reason travels to the host inside
//! [`Effect::Rejected`](crate::Effect::Rejected) for logging.

use thiserror::Error;

use crate::state::{LinkmanId, MessageId};

/// Why an event was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The event requires an authenticated user.
    #[error("no authenticated user")]
    LoggedOut,

    /// The referenced linkman is not in the conversation list.
    #[error("unknown linkman: {0}")]
    UnknownLinkman(LinkmanId),

    /// The referenced message is not in the linkman's history.
    #[error("unknown message {message_id} in linkman {linkman_id}")]
    UnknownMessage {
        /// Linkman whose history was searched.
        linkman_id: LinkmanId,
        /// Message id that was not found.
        message_id: MessageId,
    },

    /// The linkman id is already present in the conversation list.
    #[error("duplicate linkman: {0}")]
    DuplicateLinkman(LinkmanId),
}
