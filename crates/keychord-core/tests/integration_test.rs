// Keychord Integration Tests
//
// Naming, routing and tracking through the public API, without input
// adapters.
//
// Run with: cargo test --test integration_test

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use keychord_core::combo::{combo_names, ComboKind};
use keychord_core::sequence::SequenceBuffer;
use keychord_core::{
    down_events, Callback, Context, DownState, EventName, ModifierState, Payload, Response,
    Router, RouterError, Settings, Tracker,
};

fn counting() -> (Arc<AtomicUsize>, Callback) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    let callback = Callback::new(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (count, callback)
}

#[test]
fn test_down_state_stays_in_lockstep() {
    let mut state = DownState::new();
    assert!(state.add("ShiftLeft", None));
    assert!(state.add("@", Some("2")));
    assert!(!state.add("@", Some("2")));
    assert!(!state.add("x", Some("2")));
    assert_eq!(state.tokens(), ["ShiftLeft", "@"]);
    assert_eq!(state.alternates(), ["ShiftLeft", "2"]);

    assert!(state.remove("2"));
    assert_eq!(state.tokens().len(), state.alternates().len());
    assert!(!state.remove("2"));
    assert_eq!(state.len(), 1);
}

#[test]
fn test_ctrl_a_names() {
    let mut state = DownState::new();
    let mut modifiers = ModifierState::new();
    modifiers.set("ControlLeft", true);
    state.add("ControlLeft", None);
    state.add("a", Some("A"));

    let names = down_events(&state, &modifiers);
    assert!(names.contains(&"controlleft-a".to_string()));
    assert!(names.contains(&"ctrl-a".to_string()));
    assert!(names.contains(&"ctrl->a".to_string()));
    let plain = names.iter().position(|n| n == "controlleft-a");
    let group = names.iter().position(|n| n == "ctrl-a");
    assert!(plain < group);
}

#[test]
fn test_shifted_symbol_names() {
    let mut state = DownState::new();
    let mut modifiers = ModifierState::new();
    modifiers.set("ShiftLeft", true);
    state.add("ShiftLeft", None);
    state.add("@", Some("2"));

    assert_eq!(
        down_events(&state, &modifiers),
        vec!["@", "shiftleft-2", "shift-2"]
    );
}

#[test]
fn test_combo_names_idempotent_and_unique() {
    let tokens = ["ControlLeft", "AltLeft", "Delete"];
    let first = combo_names(&tokens, ComboKind::Simultaneous);
    let second = combo_names(&tokens, ComboKind::Simultaneous);
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    assert_eq!(first[0], "controlleft-altleft-delete");
    assert!(first.contains(&"ctrl-alt-delete".to_string()));
}

#[test]
fn test_event_name_canonical_forms() {
    let parse = |s: &str| EventName::parse(s).canonicalize().to_string();
    assert_eq!(parse("A-Control"), "ctrl-a");
    assert_eq!(parse("shift-ctrl-x"), "ctrl-shift-x");
    assert_eq!(parse("a->b"), "a->b");
    assert_eq!(parse("paste:\"Hello\""), "paste:\"Hello\"");
}

#[test]
fn test_router_normalizes_subscriptions() {
    let mut router = Router::new();
    let (count, callback) = counting();
    let key = router.on("Control-A", callback, None, None).unwrap();
    assert_eq!(key, "ctrl-a");
    router.trigger("ctrl-a", &Payload::None);
    assert_eq!(count.load(Ordering::SeqCst), 1);

    assert!(matches!(
        router.on("   ", Callback::new(|_| Ok(())), None, None),
        Err(RouterError::EmptyEventName)
    ));
}

#[test]
fn test_once_and_off_all() {
    let mut router = Router::new();
    let (once, callback) = counting();
    router.once("Escape", callback, None).unwrap();
    router.trigger("escape", &Payload::None);
    router.trigger("escape", &Payload::None);
    assert_eq!(once.load(Ordering::SeqCst), 1);
    assert_eq!(router.subscriber_count("escape"), 0);

    let (count, callback) = counting();
    router.on_many(&["a", "b"], callback, None, None).unwrap();
    router.off_all();
    router.trigger("a", &Payload::None);
    router.trigger("b", &Payload::None);
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(router.event_names().count(), 0);
}

#[test]
fn test_off_by_context() {
    let mut router = Router::new();
    let editor = Context::new().with("owner", "editor");
    let sidebar = Context::new().with("owner", "sidebar");
    let (count, callback) = counting();
    router.on("ctrl-s", callback.clone(), Some(editor.clone()), None).unwrap();
    router.on("ctrl-s", callback, Some(sidebar), None).unwrap();

    assert_eq!(router.off(Some("ctrl-s"), None, Some(&editor)).unwrap(), 1);
    router.trigger("ctrl-s", &Payload::None);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_scoped_subscription() {
    let mut router = Router::new();
    router.push_scope("editor").unwrap();
    let (count, callback) = counting();
    let key = router.on("ctrl-s", callback, None, None).unwrap();
    assert_eq!(key, "editor:ctrl-s");

    router.pop_scope();
    router.trigger("ctrl-s", &Payload::None);
    assert_eq!(count.load(Ordering::SeqCst), 0);
    router.trigger("editor:ctrl-s", &Payload::None);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_sequence_buffer_names() {
    let mut buffer = SequenceBuffer::new(3);
    assert!(buffer.record(vec!["a".into()]).is_empty());
    let names = buffer.record(vec!["ControlLeft".into(), "s".into()]);
    assert_eq!(names, vec!["a controlleft-s", "a ctrl-s"]);
    buffer.record(vec!["b".into()]);
    buffer.record(vec!["c".into()]);
    assert_eq!(buffer.len(), 3);
}

#[test]
fn test_sequence_names_with_aliases_in_several_steps() {
    let mut buffer = SequenceBuffer::new(4);
    buffer.record(vec!["ControlLeft".into(), "k".into()]);
    buffer.record(vec!["g".into()]);
    let names = buffer.record(vec!["AltRight".into(), "ShiftLeft".into(), "Tab".into()]);
    assert_eq!(
        names,
        vec![
            "controlleft-k g altright-shiftleft-tab",
            "ctrl-k g alt-shift-tab",
            "g altright-shiftleft-tab",
            "g alt-shift-tab",
        ]
    );

    let names = buffer.record(vec!["OSLeft".into(), "Enter".into()]);
    assert_eq!(names.len(), 6);
    assert_eq!(names[0], "controlleft-k g altright-shiftleft-tab osleft-enter");
    assert_eq!(names[1], "ctrl-k g alt-shift-tab os-enter");
    assert!(!names.iter().any(|n| n.contains("controlleft-k g alt-")));
    assert!(!names.contains(&"g altright-shiftleft-tab os-enter".to_string()));
    assert!(names.contains(&"alt-shift-tab os-enter".to_string()));
}

#[test]
fn test_tracker_names_twelve_modifier_combos() {
    let mut tracker = Tracker::new(Settings::default());
    tracker.router_mut().start_recording();
    for key in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"] {
        tracker.set_modifier("ControlLeft", true);
        tracker.set_modifier("ShiftLeft", true);
        tracker.add_down("ControlLeft", None);
        tracker.add_down("ShiftLeft", None);
        tracker.add_down(key, None);
        tracker.handle_seq_events();
        for token in [key, "ShiftLeft", "ControlLeft"] {
            tracker.remove_down(token);
            tracker.set_modifier(token, false);
        }
    }
    assert_eq!(tracker.sequence().len(), 12);

    // two names per trailing slice of each recording: 2 * (1 + 2 + ... + 11)
    let names = tracker.router_mut().stop_recording(None).unwrap();
    assert_eq!(names.len(), 132);
    let names = tracker.router_mut().stop_recording(Some("^ctrl-shift-k ")).unwrap();
    assert_eq!(names, vec!["ctrl-shift-k ctrl-shift-l"]);
}

#[test]
fn test_sequence_fires_once_then_clears() {
    let mut tracker = Tracker::new(Settings::default());
    let (count, callback) = counting();
    tracker.router_mut().on("a ctrl-s", callback, None, None).unwrap();

    tracker.add_down("a", None);
    tracker.handle_seq_events();
    tracker.remove_down("a");

    tracker.set_modifier("ControlLeft", true);
    tracker.add_down("ControlLeft", None);
    tracker.add_down("s", None);
    assert_eq!(tracker.sequence().len(), 1);
    tracker.handle_seq_events();
    tracker.remove_down("s");

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(tracker.sequence().is_empty());
}

#[test]
fn test_mash_at_six_tokens() {
    let mut tracker = Tracker::new(Settings::default());
    let (count, callback) = counting();
    tracker.router_mut().on("faceplant", callback, None, None).unwrap();
    for token in ["a", "s", "d", "f", "g"] {
        tracker.add_down(token, None);
        tracker.handle_down_events(None, &Payload::None);
    }
    assert_eq!(count.load(Ordering::SeqCst), 0);
    tracker.add_down("h", None);
    tracker.handle_down_events(None, &Payload::None);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_prevent_default_from_subscriber() {
    let mut tracker = Tracker::new(Settings::default());
    tracker
        .router_mut()
        .on("ctrl-s", Callback::new(|_| Ok(Response::PreventDefault)), None, None)
        .unwrap();
    tracker.set_modifier("ControlLeft", true);
    tracker.add_down("ControlLeft", None);
    tracker.add_down("s", None);
    let responses = tracker.handle_down_events(None, &Payload::None);
    assert!(keychord_core::prevents_default(&responses));
}
