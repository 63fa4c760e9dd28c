//! Property-based tests for the transition core.
//!
//! Invariants must hold under arbitrary event sequences, and the input
//! snapshot must never be observed to change.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::{DateTime, TimeZone, Utc};
use palaver_core::{
    Effect, Event, Linkman, LinkmanKind, Message, MessageKind, StateTree, Transition, UiField,
    UiPreferences, User, UserSummary, apply, last_activity,
};
use proptest::prelude::*;

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or(DateTime::UNIX_EPOCH)
}

fn summary(id: &str) -> UserSummary {
    UserSummary { id: id.to_owned(), username: id.to_owned(), avatar: format!("{id}.png") }
}

fn message(id: &str, from: &str, secs: i64) -> Message {
    Message {
        id: id.to_owned(),
        create_time: ts(secs),
        from: summary(from),
        kind: MessageKind::Text,
        content: String::new(),
    }
}

fn linkman(id: &str, created: i64) -> Linkman {
    Linkman {
        id: id.to_owned(),
        kind: LinkmanKind::Temporary,
        name: id.to_owned(),
        avatar: String::new(),
        create_time: ts(created),
        members: Vec::new(),
        messages: Vec::new(),
        unread: 0,
    }
}

fn logged_in() -> StateTree {
    let user = User {
        id: "u1".to_owned(),
        username: "u1".to_owned(),
        avatar: "u1.png".to_owned(),
        linkmen: vec![Arc::new(linkman("L1", 100)), Arc::new(linkman("L2", 50))],
    };
    apply(&StateTree::initial(UiPreferences::default()), &Event::SetUser { user }).state
}

/// Ids drawn from a small pool so sequences hit the same linkmen often.
fn linkman_id() -> impl Strategy<Value = String> {
    (1u8..=4).prop_map(|n| format!("L{n}"))
}

fn event_strategy() -> impl Strategy<Value = Event> {
    prop_oneof![
        3 => (linkman_id(), 0i64..100_000)
            .prop_map(|(id, t)| Event::AddLinkman { linkman: linkman(&id, t), focus: false }),
        2 => linkman_id().prop_map(|id| Event::RemoveLinkman { linkman_id: id }),
        3 => linkman_id().prop_map(|id| Event::SetFocus { linkman_id: id }),
        2 => linkman_id().prop_map(|id| Event::SetFriend { linkman_id: id }),
        4 => (linkman_id(), any::<u16>(), 0i64..100_000).prop_map(|(id, m, t)| {
            Event::AddLinkmanMessage { linkman_id: id, message: message(&format!("m{m}"), "u2", t) }
        }),
        1 => (linkman_id(), any::<u16>(), 0i64..100_000).prop_map(|(id, m, t)| {
            Event::AddLinkmanMessages {
                linkman_id: id,
                messages: vec![Arc::new(message(&format!("b{m}"), "u2", t))],
            }
        }),
        1 => "[a-z]{1,8}\\.png".prop_map(|avatar| Event::SetAvatar { avatar }),
        1 => Just(Event::Logout),
        1 => Just(Event::Unknown),
    ]
}

/// Structural invariants that must hold for every transition.
fn check_invariants(before: &StateTree, transition: &Transition) -> Result<(), TestCaseError> {
    let mut seen = HashSet::new();
    for linkman in transition.state.linkmen() {
        prop_assert!(seen.insert(linkman.id.clone()), "duplicate linkman id {}", linkman.id);
    }
    // A rejection must leave the snapshot exactly as it was.
    if transition.effects.iter().any(|effect| matches!(effect, Effect::Rejected(_))) {
        prop_assert_eq!(&transition.state, before);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Applying any event sequence keeps ids unique and never panics, and
    /// each step leaves its input snapshot untouched.
    #[test]
    fn prop_sequences_preserve_invariants(
        events in prop::collection::vec(event_strategy(), 0..40)
    ) {
        let mut state = logged_in();

        for event in events {
            let before = state.clone();
            let transition = apply(&state, &event);

            prop_assert_eq!(&state, &before);
            check_invariants(&before, &transition)?;
            state = transition.state;
        }
    }

    /// Unknown events are identity transitions from any reachable state.
    #[test]
    fn prop_unknown_event_is_identity(
        events in prop::collection::vec(event_strategy(), 0..20)
    ) {
        let mut state = logged_in();
        for event in events {
            state = apply(&state, &event).state;
        }

        let transition = apply(&state, &Event::Unknown);
        prop_assert_eq!(transition.state, state);
        prop_assert!(transition.effects.is_empty());
    }

    /// Logout preserves exactly the four preference fields.
    #[test]
    fn prop_logout_preserves_preferences(
        color in "[0-9]{1,3}, [0-9]{1,3}, [0-9]{1,3}",
        sound in "[a-z]{1,8}",
        events in prop::collection::vec(event_strategy(), 0..20)
    ) {
        let mut state = logged_in();
        state = apply(&state, &Event::SetUiPreference {
            field: UiField::PrimaryColor,
            value: color.clone(),
        }).state;
        state = apply(&state, &Event::SetUiPreference {
            field: UiField::NotificationSound,
            value: sound.clone(),
        }).state;
        for event in events {
            // The sequence may contain preference writes of its own; none are
            // generated, so the two fields written above must survive.
            state = apply(&state, &event).state;
        }

        let out = apply(&state, &Event::Logout).state;
        prop_assert_eq!(out.user, None);
        prop_assert_eq!(out.focus, None);
        prop_assert_eq!(out.ui.preferences.get(UiField::PrimaryColor), color);
        prop_assert_eq!(out.ui.preferences.get(UiField::NotificationSound), sound);
    }

    /// After a bulk history load the list is sorted descending by last
    /// activity and focus lands on the first entry.
    #[test]
    fn prop_bulk_load_sorts_descending(
        histories in prop::collection::vec(
            prop::collection::vec(0i64..100_000, 0..5),
            1..4,
        )
    ) {
        let mut state = logged_in();
        let mut messages = HashMap::new();
        for (i, mut times) in histories.into_iter().enumerate() {
            times.sort_unstable();
            let id = format!("L{}", i + 1);
            if i >= 2 {
                state = apply(&state, &Event::AddLinkman {
                    linkman: linkman(&id, 10),
                    focus: false,
                }).state;
            }
            let history: Vec<Arc<Message>> = times
                .iter()
                .enumerate()
                .map(|(n, &t)| Arc::new(message(&format!("{id}-m{n}"), "u2", t)))
                .collect();
            messages.insert(id, history);
        }

        let out = apply(&state, &Event::SetLinkmanMessages { messages }).state;

        let keys: Vec<DateTime<Utc>> = out.linkmen().iter().map(|l| last_activity(l)).collect();
        for pair in keys.windows(2) {
            prop_assert!(pair[0] >= pair[1], "list not sorted descending: {keys:?}");
        }
        let first = out.linkmen().first().map(|l| l.id.clone());
        prop_assert_eq!(out.focus, first);
    }

    /// Unread counts only grow on unfocused live arrival, by exactly one.
    #[test]
    fn prop_unread_counts_arrivals_while_unfocused(
        arrivals in prop::collection::vec(prop::bool::ANY, 1..20)
    ) {
        let mut state = logged_in();
        let mut expected = 0;

        for (n, focused) in arrivals.into_iter().enumerate() {
            let focus = if focused { "L1" } else { "L2" };
            state = apply(&state, &Event::SetFocus { linkman_id: focus.to_owned() }).state;
            state = apply(&state, &Event::AddLinkmanMessage {
                linkman_id: "L1".to_owned(),
                message: message(&format!("m{n}"), "u2", n as i64),
            }).state;
            // Focusing L1 resets its counter before the arrival lands.
            if focused {
                expected = 0;
            } else {
                expected += 1;
            }

            let unread = state
                .linkmen()
                .iter()
                .find(|l| l.id == "L1")
                .map(|l| l.unread);
            prop_assert_eq!(unread, Some(expected));
        }

        state = apply(&state, &Event::SetFocus { linkman_id: "L1".to_owned() }).state;
        let unread = state.linkmen().iter().find(|l| l.id == "L1").map(|l| l.unread);
        prop_assert_eq!(unread, Some(0));
    }
}
