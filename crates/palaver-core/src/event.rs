//! Events consumed and effects produced by the transition core.
//!
//! [`Event`] is the closed set of inputs that drive the state machine, one
//! variant per transition-table row. The transport layer decodes inbound
//! protocol messages straight into it; kinds this core does not recognize
//! decode to [`Event::Unknown`] and apply as identity transitions.
//!
//! [`Effect`] is the output side: instructions the host executes after a
//! transition, such as writing a changed preference back to its persistence
//! collaborator or logging a rejected event.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::TransitionError,
    state::{Linkman, LinkmanId, Message, MessageId, MessageKind, UiField, User, UserSummary},
};

/// Events processed by the transition core.
///
/// Wire shape is `{ "kind": "...", "payload": { ... } }` with camelCase
/// payload fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all_fields = "camelCase")]
pub enum Event {
    /// Transport connectivity changed.
    SetConnected {
        /// New connectivity flag.
        connected: bool,
    },

    /// One UI preference field changed.
    SetUiPreference {
        /// Field to write.
        field: UiField,
        /// New value.
        value: String,
    },

    /// Login dialog visibility changed.
    SetLoginDialog {
        /// Whether the dialog is shown.
        visible: bool,
    },

    /// User logged in.
    SetUser {
        /// Authenticated user record, including the conversation list.
        user: User,
    },

    /// Bulk history load, typically right after login.
    SetLinkmanMessages {
        /// Replacement history per linkman id. Linkmen without an entry keep
        /// their current history.
        messages: HashMap<LinkmanId, Vec<Arc<Message>>>,
    },

    /// Group membership changed.
    SetGroupMembers {
        /// Group conversation id.
        group_id: LinkmanId,
        /// Replacement member list.
        members: Vec<UserSummary>,
    },

    /// Group avatar changed.
    SetGroupAvatar {
        /// Group conversation id.
        group_id: LinkmanId,
        /// New avatar URL.
        avatar: String,
    },

    /// User opened a conversation.
    SetFocus {
        /// Conversation to focus.
        linkman_id: LinkmanId,
    },

    /// Temporary contact promoted to friend.
    SetFriend {
        /// Conversation to promote and focus.
        linkman_id: LinkmanId,
    },

    /// New conversation appeared.
    AddLinkman {
        /// Conversation to prepend.
        linkman: Linkman,
        /// Whether to focus it immediately.
        focus: bool,
    },

    /// Conversation removed (friend deleted, group left).
    RemoveLinkman {
        /// Conversation to remove.
        linkman_id: LinkmanId,
    },

    /// Single live message arrived.
    AddLinkmanMessage {
        /// Target conversation.
        linkman_id: LinkmanId,
        /// The message.
        message: Message,
    },

    /// Older history page loaded (backfill).
    AddLinkmanMessages {
        /// Target conversation.
        linkman_id: LinkmanId,
        /// Messages older than the current history, oldest first.
        messages: Vec<Arc<Message>>,
    },

    /// Server confirmation for an optimistically sent message.
    UpdateSelfMessage {
        /// Conversation holding the message.
        linkman_id: LinkmanId,
        /// Id of the optimistic message to reconcile.
        message_id: MessageId,
        /// Fields to merge in.
        patch: MessagePatch,
    },

    /// User changed their own avatar.
    SetAvatar {
        /// New avatar URL.
        avatar: String,
    },

    /// User logged out.
    Logout,

    /// Event kind this core does not recognize. Identity transition.
    #[serde(other, deserialize_with = "ignore_payload")]
    Unknown,
}

/// Consume and discard whatever payload accompanies an unrecognized kind, so
/// `#[serde(other)]` accepts `{ "kind": ..., "payload": { ... } }` too.
fn ignore_payload<'de, D: Deserializer<'de>>(deserializer: D) -> Result<(), D::Error> {
    serde::de::IgnoredAny::deserialize(deserializer).map(|_| ())
}

/// Partial message update merged in by [`Event::UpdateSelfMessage`].
///
/// Only the present fields are applied. This is the closed-field replacement
/// for a free-form deep merge: a send confirmation typically rewrites the
/// optimistic id and timestamp with server-issued values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessagePatch {
    /// Replacement message id.
    pub id: Option<MessageId>,
    /// Replacement timestamp.
    pub create_time: Option<DateTime<Utc>>,
    /// Replacement payload kind.
    pub kind: Option<MessageKind>,
    /// Replacement content.
    pub content: Option<String>,
}

impl MessagePatch {
    /// Merge the present fields into `message`.
    pub fn merge_into(&self, message: &mut Message) {
        if let Some(id) = &self.id {
            message.id = id.clone();
        }
        if let Some(create_time) = self.create_time {
            message.create_time = create_time;
        }
        if let Some(kind) = self.kind {
            message.kind = kind;
        }
        if let Some(content) = &self.content {
            message.content = content.clone();
        }
    }
}

/// Instructions for the host, emitted alongside the next snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write a preference value back through the persistence collaborator.
    PersistPreference {
        /// Field that changed.
        field: UiField,
        /// Value now in the snapshot.
        value: String,
    },

    /// The event was rejected; the returned snapshot is unchanged.
    Rejected(TransitionError),
}
