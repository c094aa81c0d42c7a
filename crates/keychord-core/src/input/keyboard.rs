// Keychord Input Layer - Keyboard
// keydown/keyup handling, key naming and compose state

use crate::event::{Payload, Response};
use crate::tracker::Tracker;

use super::adapter::InputAdapter;
use super::raw::{Capability, KeyInput, RawEvent, RawEventKind, Transition};

/// Key that starts an input-method composition
const COMPOSE_KEY: &str = "Compose";

#[derive(Debug, Default)]
pub struct KeyboardAdapter {
    composing: bool,
}

impl KeyboardAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    /// Canonical key name and alternate code for a raw key event
    fn names(tracker: &Tracker, input: &KeyInput) -> (String, String) {
        let code = tracker
            .key_codes()
            .resolve(input.location, input.key_code, &input.code);
        let key = input.key.as_deref().unwrap_or(&code);
        let key = tracker.normalizer().normalize(input.location, key, &code);
        (key, code)
    }

    fn keydown(&mut self, tracker: &mut Tracker, event: &RawEvent, input: &KeyInput) -> Vec<Response> {
        let (key, code) = Self::names(tracker, input);
        // State is tracked whether or not the event is filtered
        tracker.set_modifier(&key, true);
        if key == COMPOSE_KEY {
            self.composing = true;
            return Vec::new();
        }
        tracker.add_down(&key, Some(&code));
        tracker.reset_seq_timeout();

        if !tracker.accepts(event) {
            return Vec::new();
        }
        if input.repeat && tracker.settings().no_key_repeat {
            return vec![Response::PreventDefault];
        }
        let target = event.target.as_ref();
        let payload = Payload::Key {
            key: key.clone(),
            code,
        };
        let mut responses = tracker.trigger_with_selectors("keydown", target, &payload);
        let specific = format!("keydown:{}", key.to_lowercase());
        responses.extend(tracker.trigger_with_selectors(&specific, target, &payload));
        responses.extend(tracker.handle_down_events(target, &payload));
        responses
    }

    fn keyup(&mut self, tracker: &mut Tracker, event: &RawEvent, input: &KeyInput) -> Vec<Response> {
        let (key, code) = Self::names(tracker, input);
        if tracker.down_state().is_empty() {
            log::trace!("keyup {:?} with nothing held, ignoring", key);
            return Vec::new();
        }
        if self.composing {
            self.composing = false;
            return Vec::new();
        }
        let mut responses = Vec::new();
        if tracker.accepts(event) {
            let target = event.target.as_ref();
            let payload = Payload::Key {
                key: key.clone(),
                code: code.clone(),
            };
            responses = tracker.trigger_with_selectors("keyup", target, &payload);
            let specific = format!("keyup:{}", key.to_lowercase());
            responses.extend(tracker.trigger_with_selectors(&specific, target, &payload));
            tracker.handle_seq_events();
        }
        tracker.remove_down(&key);
        tracker.set_modifier(&code, false);
        tracker.set_modifier(&key, false);
        responses
    }
}

impl InputAdapter for KeyboardAdapter {
    fn capability(&self) -> Capability {
        Capability::Keyboard
    }

    fn handle(&mut self, tracker: &mut Tracker, event: &RawEvent) -> Vec<Response> {
        let RawEventKind::Key(input) = &event.kind else {
            return Vec::new();
        };
        match input.transition {
            Transition::Down => self.keydown(tracker, event, input),
            Transition::Up => self.keyup(tracker, event, input),
        }
    }

    fn reset(&mut self) {
        self.composing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyLocation;
    use crate::router::Callback;
    use crate::settings::Settings;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn count_on(tracker: &mut Tracker, name: &str) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        tracker
            .router_mut()
            .on(
                name,
                Callback::new(move |_| {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
                None,
                None,
            )
            .unwrap();
        count
    }

    fn send(adapter: &mut KeyboardAdapter, tracker: &mut Tracker, input: KeyInput) -> Vec<Response> {
        adapter.handle(tracker, &RawEvent::key(input))
    }

    #[test]
    fn test_keydown_events() {
        let mut tracker = Tracker::default();
        let mut kb = KeyboardAdapter::new();
        let any = count_on(&mut tracker, "keydown");
        let specific = count_on(&mut tracker, "keydown:a");
        let plain = count_on(&mut tracker, "a");
        send(&mut kb, &mut tracker, KeyInput::down("a", "KeyA"));
        assert_eq!(any.load(Ordering::SeqCst), 1);
        assert_eq!(specific.load(Ordering::SeqCst), 1);
        assert_eq!(plain.load(Ordering::SeqCst), 1);
        assert!(tracker.is_down("a"));
    }

    #[test]
    fn test_sided_modifier_names() {
        let mut tracker = Tracker::default();
        let mut kb = KeyboardAdapter::new();
        let sided = count_on(&mut tracker, "controlleft-a");
        let group = count_on(&mut tracker, "ctrl-a");
        send(
            &mut kb,
            &mut tracker,
            KeyInput::down("Control", "ControlLeft").at(KeyLocation::Left),
        );
        send(&mut kb, &mut tracker, KeyInput::down("a", "KeyA"));
        assert_eq!(sided.load(Ordering::SeqCst), 1);
        assert_eq!(group.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.down_state().tokens(), &["ControlLeft", "a"]);
    }

    #[test]
    fn test_shifted_digit() {
        let mut tracker = Tracker::default();
        let mut kb = KeyboardAdapter::new();
        let at = count_on(&mut tracker, "@");
        let shift_2 = count_on(&mut tracker, "shift-2");
        send(
            &mut kb,
            &mut tracker,
            KeyInput::down("Shift", "ShiftLeft").at(KeyLocation::Left),
        );
        send(&mut kb, &mut tracker, KeyInput::down("@", "Digit2"));
        assert_eq!(at.load(Ordering::SeqCst), 1);
        assert_eq!(shift_2.load(Ordering::SeqCst), 1);

        // Shift released first, then the digit comes back up as "2"
        send(
            &mut kb,
            &mut tracker,
            KeyInput::up("Shift", "ShiftLeft").at(KeyLocation::Left),
        );
        send(&mut kb, &mut tracker, KeyInput::up("2", "Digit2"));
        assert!(tracker.down_state().is_empty());
        assert!(tracker.down_state().alternates().is_empty());
    }

    #[test]
    fn test_key_repeat_suppressed() {
        let mut tracker = Tracker::default();
        let mut kb = KeyboardAdapter::new();
        let count = count_on(&mut tracker, "keydown");
        send(&mut kb, &mut tracker, KeyInput::down("a", "KeyA"));
        let responses = send(&mut kb, &mut tracker, KeyInput::down("a", "KeyA").repeated());
        assert_eq!(responses, vec![Response::PreventDefault]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_key_repeat_allowed() {
        let settings = Settings {
            no_key_repeat: false,
            ..Settings::default()
        };
        let mut tracker = Tracker::new(settings);
        let mut kb = KeyboardAdapter::new();
        let count = count_on(&mut tracker, "keydown");
        send(&mut kb, &mut tracker, KeyInput::down("a", "KeyA"));
        send(&mut kb, &mut tracker, KeyInput::down("a", "KeyA").repeated());
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.down_state().len(), 1);
    }

    #[test]
    fn test_keyup_with_empty_state_is_ignored() {
        let mut tracker = Tracker::default();
        let mut kb = KeyboardAdapter::new();
        let count = count_on(&mut tracker, "keyup");
        send(&mut kb, &mut tracker, KeyInput::up("a", "KeyA"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_compose_swallows_next_keyup() {
        let mut tracker = Tracker::default();
        let mut kb = KeyboardAdapter::new();
        let count = count_on(&mut tracker, "keyup");
        send(&mut kb, &mut tracker, KeyInput::down("a", "KeyA"));
        send(&mut kb, &mut tracker, KeyInput::down("Compose", "Compose"));
        assert!(kb.is_composing());
        send(&mut kb, &mut tracker, KeyInput::up("a", "KeyA"));
        assert!(!kb.is_composing());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_legacy_key_code_resolves_alternate() {
        let mut tracker = Tracker::default();
        let mut kb = KeyboardAdapter::new();
        send(
            &mut kb,
            &mut tracker,
            KeyInput::down("a", "").with_key_code(65),
        );
        assert_eq!(tracker.down_state().alternates(), &["A"]);
        send(&mut kb, &mut tracker, KeyInput::up("a", "").with_key_code(65));
        assert!(tracker.down_state().is_empty());
    }

    #[test]
    fn test_arrow_prefix_stripped() {
        let mut tracker = Tracker::default();
        let mut kb = KeyboardAdapter::new();
        let up = count_on(&mut tracker, "keydown:up");
        send(&mut kb, &mut tracker, KeyInput::down("ArrowUp", "ArrowUp"));
        assert_eq!(up.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_filtered_target_still_tracks_state() {
        let mut tracker = Tracker::default();
        let mut kb = KeyboardAdapter::new();
        let count = count_on(&mut tracker, "a");
        let event = RawEvent::key(KeyInput::down("a", "KeyA"))
            .with_target(crate::input::raw::Target::new().with_tag("INPUT"));
        kb.handle(&mut tracker, &event);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(tracker.is_down("a"));
    }
}
