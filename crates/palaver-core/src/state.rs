//! Immutable state snapshots.
//!
//! This module defines the [`StateTree`] and the records hanging off it: the
//! authenticated [`User`], their ordered conversation list of [`Linkman`]
//! entries, and per-conversation [`Message`] histories.
//!
//! Snapshots are replaced wholesale on every transition, never mutated in
//! place. Conversation and message entries live behind [`Arc`] so a new
//! snapshot shares everything it did not touch with its predecessor; a reader
//! holding an old snapshot sees exactly the state it captured.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-issued conversation identifier.
pub type LinkmanId = String;

/// Server-issued user identifier.
pub type UserId = String;

/// Server-issued message identifier.
pub type MessageId = String;

/// Conversation kind.
///
/// Mutable over a conversation's lifetime: a stranger who messaged us starts
/// as [`Temporary`](LinkmanKind::Temporary) and can be promoted to
/// [`Friend`](LinkmanKind::Friend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkmanKind {
    /// Direct contact that has not been accepted as a friend.
    Temporary,
    /// Accepted direct contact.
    Friend,
    /// Group conversation.
    Group,
}

/// Message payload kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text.
    Text,
    /// Image URL.
    Image,
    /// Code block.
    Code,
    /// Server-generated notice.
    System,
}

/// Embedded sender or group-member summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Avatar URL.
    pub avatar: String,
}

/// A message, owned by exactly one linkman.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier.
    pub id: MessageId,
    /// Server timestamp.
    pub create_time: DateTime<Utc>,
    /// Sender summary, embedded at delivery time.
    pub from: UserSummary,
    /// Payload kind.
    pub kind: MessageKind,
    /// Payload content.
    pub content: String,
}

/// A conversation: a direct contact or a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Linkman {
    /// Conversation identifier, unique within the user's list.
    pub id: LinkmanId,
    /// Conversation kind.
    pub kind: LinkmanKind,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub avatar: String,
    /// Creation timestamp; the ordering key while the history is empty.
    pub create_time: DateTime<Utc>,
    /// Member summaries. Populated for groups only.
    #[serde(default)]
    pub members: Vec<UserSummary>,
    /// Message history, oldest first.
    #[serde(default)]
    pub messages: Vec<Arc<Message>>,
    /// Messages received while this conversation was not focused.
    #[serde(default)]
    pub unread: u32,
}

/// Authenticated user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Avatar URL.
    pub avatar: String,
    /// Conversation list, most recent activity first.
    #[serde(default)]
    pub linkmen: Vec<Arc<Linkman>>,
}

/// The four preference fields that survive logout.
///
/// Loaded from the host's persistence collaborator at startup and written
/// back field by field when a preference transition emits
/// [`Effect::PersistPreference`](crate::Effect::PersistPreference).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPreferences {
    /// Theme primary color, as an `r, g, b` triple.
    pub primary_color: String,
    /// Theme text color, as an `r, g, b` triple.
    pub primary_text_color: String,
    /// Background image URL or data URI.
    pub background_image: String,
    /// Notification sound name.
    pub notification_sound: String,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            primary_color: "74, 144, 226".to_owned(),
            primary_text_color: "255, 255, 255".to_owned(),
            background_image: String::new(),
            notification_sound: "default".to_owned(),
        }
    }
}

impl UiPreferences {
    /// Value of one preference field.
    pub fn get(&self, field: UiField) -> &str {
        match field {
            UiField::PrimaryColor => &self.primary_color,
            UiField::PrimaryTextColor => &self.primary_text_color,
            UiField::BackgroundImage => &self.background_image,
            UiField::NotificationSound => &self.notification_sound,
        }
    }

    /// Replace one preference field.
    pub fn set(&mut self, field: UiField, value: String) {
        match field {
            UiField::PrimaryColor => self.primary_color = value,
            UiField::PrimaryTextColor => self.primary_text_color = value,
            UiField::BackgroundImage => self.background_image = value,
            UiField::NotificationSound => self.notification_sound = value,
        }
    }
}

/// Identifies one [`UiPreferences`] field for typed writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UiField {
    /// Theme primary color.
    PrimaryColor,
    /// Theme text color.
    PrimaryTextColor,
    /// Background image.
    BackgroundImage,
    /// Notification sound.
    NotificationSound,
}

/// UI portion of the state tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    /// Persistent preference fields.
    #[serde(flatten)]
    pub preferences: UiPreferences,
    /// Login dialog visibility. Transient; reset on logout.
    #[serde(default, rename = "showLoginDialog")]
    pub show_login_dialog: bool,
}

/// Root of the application state.
///
/// One immutable value per point in event-application order. Created once at
/// process start via [`StateTree::initial`] and replaced by
/// [`apply`](crate::apply) on every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTree {
    /// Authenticated user. `None` while logged out.
    pub user: Option<User>,
    /// Conversation currently open in the UI.
    pub focus: Option<LinkmanId>,
    /// Transport connectivity flag.
    pub connected: bool,
    /// UI preferences and transient UI flags.
    pub ui: UiState,
}

impl StateTree {
    /// Logged-out snapshot seeded with persisted preferences.
    pub fn initial(preferences: UiPreferences) -> Self {
        Self {
            user: None,
            focus: None,
            connected: true,
            ui: UiState { preferences, show_login_dialog: false },
        }
    }

    /// Logged-out snapshot keeping only this snapshot's preference fields.
    ///
    /// Everything outside the four [`UiPreferences`] fields is discarded,
    /// including the transient dialog flag. Used by the `Logout` transition.
    pub fn reset(&self) -> Self {
        Self::initial(self.ui.preferences.clone())
    }

    /// The conversation list; empty while logged out.
    pub fn linkmen(&self) -> &[Arc<Linkman>] {
        self.user.as_ref().map_or(&[], |user| user.linkmen.as_slice())
    }

    /// Whether a user is authenticated.
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }
}
