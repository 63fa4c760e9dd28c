//! The transition table.
//!
//! [`apply`] is the single operation the core exposes: it maps an event and
//! the current snapshot to the next snapshot plus host instructions. Each
//! handler is pure; the input snapshot is read, never written, and any
//! reference to it stays valid after the call.
//!
//! Totality: every event kind resolves to a snapshot. Unrecognized kinds are
//! identity transitions, and precondition violations (unknown ids, duplicate
//! adds, operations while logged out) return the input snapshot unchanged
//! together with an [`Effect::Rejected`] diagnostic. Nothing here panics.

use std::{collections::HashMap, sync::Arc};

use crate::{
    error::TransitionError,
    event::{Effect, Event, MessagePatch},
    index, ordering,
    state::{Linkman, LinkmanId, LinkmanKind, Message, MessageId, StateTree, User, UserSummary},
};

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Next snapshot. Equal to the input when the event was rejected or
    /// unrecognized.
    pub state: StateTree,
    /// Instructions for the host, in emission order.
    pub effects: Vec<Effect>,
}

impl Transition {
    fn next(state: StateTree) -> Self {
        Self { state, effects: Vec::new() }
    }

    fn with_effect(state: StateTree, effect: Effect) -> Self {
        Self { state, effects: vec![effect] }
    }

    fn rejected(state: &StateTree, error: TransitionError) -> Self {
        Self { state: state.clone(), effects: vec![Effect::Rejected(error)] }
    }
}

/// Apply one event to a snapshot, producing the next snapshot.
pub fn apply(state: &StateTree, event: &Event) -> Transition {
    match event {
        Event::SetConnected { connected } => {
            let mut next = state.clone();
            next.connected = *connected;
            Transition::next(next)
        },
        Event::SetUiPreference { field, value } => {
            let mut next = state.clone();
            next.ui.preferences.set(*field, value.clone());
            Transition::with_effect(
                next,
                Effect::PersistPreference { field: *field, value: value.clone() },
            )
        },
        Event::SetLoginDialog { visible } => {
            let mut next = state.clone();
            next.ui.show_login_dialog = *visible;
            Transition::next(next)
        },
        Event::SetUser { user } => Transition::next(set_user(state, user)),
        Event::SetLinkmanMessages { messages } => {
            fallible(state, set_linkman_messages(state, messages))
        },
        Event::SetGroupMembers { group_id, members } => {
            fallible(state, set_group_members(state, group_id, members))
        },
        Event::SetGroupAvatar { group_id, avatar } => {
            fallible(state, set_group_avatar(state, group_id, avatar))
        },
        Event::SetFocus { linkman_id } => Transition::next(set_focus(state, linkman_id)),
        Event::SetFriend { linkman_id } => fallible(state, set_friend(state, linkman_id)),
        Event::AddLinkman { linkman, focus } => fallible(state, add_linkman(state, linkman, *focus)),
        Event::RemoveLinkman { linkman_id } => fallible(state, remove_linkman(state, linkman_id)),
        Event::AddLinkmanMessage { linkman_id, message } => {
            fallible(state, add_linkman_message(state, linkman_id, message))
        },
        Event::AddLinkmanMessages { linkman_id, messages } => {
            fallible(state, add_linkman_messages(state, linkman_id, messages))
        },
        Event::UpdateSelfMessage { linkman_id, message_id, patch } => {
            fallible(state, update_self_message(state, linkman_id, message_id, patch))
        },
        Event::SetAvatar { avatar } => fallible(state, set_avatar(state, avatar)),
        Event::Logout => Transition::next(state.reset()),
        Event::Unknown => Transition::next(state.clone()),
    }
}

/// Convert a handler result into a transition, mapping rejection to
/// "input snapshot unchanged plus diagnostic".
fn fallible(state: &StateTree, result: Result<StateTree, TransitionError>) -> Transition {
    match result {
        Ok(next) => Transition::next(next),
        Err(error) => Transition::rejected(state, error),
    }
}

fn set_user(state: &StateTree, user: &User) -> StateTree {
    let mut next = state.clone();
    // A user with no conversations gets no focus rather than a fault.
    next.focus = user.linkmen.first().map(|linkman| linkman.id.clone());
    next.user = Some(user.clone());
    next
}

fn set_linkman_messages(
    state: &StateTree,
    messages: &HashMap<LinkmanId, Vec<Arc<Message>>>,
) -> Result<StateTree, TransitionError> {
    let mut next = state.clone();
    let user = next.user.as_mut().ok_or(TransitionError::LoggedOut)?;

    for linkman in &mut user.linkmen {
        if let Some(history) = messages.get(&linkman.id) {
            Arc::make_mut(linkman).messages = history.clone();
        }
    }

    ordering::sort_by_recency(&mut user.linkmen);
    next.focus = user.linkmen.first().map(|linkman| linkman.id.clone());
    Ok(next)
}

fn set_group_members(
    state: &StateTree,
    group_id: &LinkmanId,
    members: &[UserSummary],
) -> Result<StateTree, TransitionError> {
    let mut next = state.clone();
    let user = next.user.as_mut().ok_or(TransitionError::LoggedOut)?;
    let pos = index::position(&user.linkmen, group_id)
        .ok_or_else(|| TransitionError::UnknownLinkman(group_id.clone()))?;

    Arc::make_mut(&mut user.linkmen[pos]).members = members.to_vec();
    Ok(next)
}

fn set_group_avatar(
    state: &StateTree,
    group_id: &LinkmanId,
    avatar: &str,
) -> Result<StateTree, TransitionError> {
    let mut next = state.clone();
    let user = next.user.as_mut().ok_or(TransitionError::LoggedOut)?;
    let pos = index::position(&user.linkmen, group_id)
        .ok_or_else(|| TransitionError::UnknownLinkman(group_id.clone()))?;

    Arc::make_mut(&mut user.linkmen[pos]).avatar = avatar.to_owned();
    Ok(next)
}

fn set_focus(state: &StateTree, linkman_id: &LinkmanId) -> StateTree {
    let mut next = state.clone();
    // The focus id may name a conversation that is not in the list yet;
    // only the unread reset needs a resolvable linkman.
    if let Some(user) = next.user.as_mut()
        && let Some(pos) = index::position(&user.linkmen, linkman_id)
    {
        Arc::make_mut(&mut user.linkmen[pos]).unread = 0;
    }
    next.focus = Some(linkman_id.clone());
    next
}

fn set_friend(state: &StateTree, linkman_id: &LinkmanId) -> Result<StateTree, TransitionError> {
    let mut next = state.clone();
    let user = next.user.as_mut().ok_or(TransitionError::LoggedOut)?;
    let pos = index::position(&user.linkmen, linkman_id)
        .ok_or_else(|| TransitionError::UnknownLinkman(linkman_id.clone()))?;

    Arc::make_mut(&mut user.linkmen[pos]).kind = LinkmanKind::Friend;
    next.focus = Some(linkman_id.clone());
    Ok(next)
}

fn add_linkman(
    state: &StateTree,
    linkman: &Linkman,
    focus: bool,
) -> Result<StateTree, TransitionError> {
    let mut next = state.clone();
    let user = next.user.as_mut().ok_or(TransitionError::LoggedOut)?;

    if index::position(&user.linkmen, &linkman.id).is_some() {
        return Err(TransitionError::DuplicateLinkman(linkman.id.clone()));
    }

    // New conversations are assumed most recent; prepend without a resort.
    user.linkmen.insert(0, Arc::new(linkman.clone()));
    if focus {
        next.focus = Some(linkman.id.clone());
    }
    Ok(next)
}

fn remove_linkman(state: &StateTree, linkman_id: &LinkmanId) -> Result<StateTree, TransitionError> {
    let mut next = state.clone();
    let user = next.user.as_mut().ok_or(TransitionError::LoggedOut)?;
    let pos = index::position(&user.linkmen, linkman_id)
        .ok_or_else(|| TransitionError::UnknownLinkman(linkman_id.clone()))?;

    user.linkmen.remove(pos);
    next.focus = user.linkmen.first().map(|linkman| linkman.id.clone());
    Ok(next)
}

fn add_linkman_message(
    state: &StateTree,
    linkman_id: &LinkmanId,
    message: &Message,
) -> Result<StateTree, TransitionError> {
    let focused = state.focus.as_ref() == Some(linkman_id);

    let mut next = state.clone();
    let user = next.user.as_mut().ok_or(TransitionError::LoggedOut)?;
    let pos = index::position(&user.linkmen, linkman_id)
        .ok_or_else(|| TransitionError::UnknownLinkman(linkman_id.clone()))?;

    let linkman = Arc::make_mut(&mut user.linkmen[pos]);
    linkman.messages.push(Arc::new(message.clone()));
    if !focused {
        linkman.unread += 1;
    }

    ordering::move_to_front(&mut user.linkmen, pos);
    Ok(next)
}

fn add_linkman_messages(
    state: &StateTree,
    linkman_id: &LinkmanId,
    messages: &[Arc<Message>],
) -> Result<StateTree, TransitionError> {
    let mut next = state.clone();
    let user = next.user.as_mut().ok_or(TransitionError::LoggedOut)?;
    let pos = index::position(&user.linkmen, linkman_id)
        .ok_or_else(|| TransitionError::UnknownLinkman(linkman_id.clone()))?;

    // Backfill: the page is older than everything already loaded.
    let linkman = Arc::make_mut(&mut user.linkmen[pos]);
    let mut merged = messages.to_vec();
    merged.extend(linkman.messages.iter().cloned());
    linkman.messages = merged;
    Ok(next)
}

fn update_self_message(
    state: &StateTree,
    linkman_id: &LinkmanId,
    message_id: &MessageId,
    patch: &MessagePatch,
) -> Result<StateTree, TransitionError> {
    let mut next = state.clone();
    let user = next.user.as_mut().ok_or(TransitionError::LoggedOut)?;
    let pos = index::position(&user.linkmen, linkman_id)
        .ok_or_else(|| TransitionError::UnknownLinkman(linkman_id.clone()))?;

    let linkman = Arc::make_mut(&mut user.linkmen[pos]);
    // Search from the back: a resend can leave two entries under the same
    // id, and the newest one is the one awaiting confirmation.
    let Some(message) = linkman.messages.iter_mut().rev().find(|m| m.id == *message_id) else {
        return Err(TransitionError::UnknownMessage {
            linkman_id: linkman_id.clone(),
            message_id: message_id.clone(),
        });
    };

    patch.merge_into(Arc::make_mut(message));
    Ok(next)
}

fn set_avatar(state: &StateTree, avatar: &str) -> Result<StateTree, TransitionError> {
    let mut next = state.clone();
    let user = next.user.as_mut().ok_or(TransitionError::LoggedOut)?;
    user.avatar = avatar.to_owned();

    let self_id = user.id.clone();
    for linkman in &mut user.linkmen {
        // Linkmen with no self-authored messages keep sharing their entry
        // with the previous snapshot.
        if !linkman.messages.iter().any(|m| m.from.id == self_id) {
            continue;
        }
        let linkman = Arc::make_mut(linkman);
        for message in &mut linkman.messages {
            if message.from.id == self_id {
                Arc::make_mut(message).from.avatar = avatar.to_owned();
            }
        }
    }
    Ok(next)
}
