// Keychord Input Layer - Pointer
// Mouse, pen and touch presses, swipes and clicks

use std::collections::HashMap;

use crate::event::{Payload, Response};
use crate::tracker::Tracker;

use super::adapter::InputAdapter;
use super::raw::{
    Capability, ClickKind, PointerButton, PointerInput, PointerType, RawEvent, RawEventKind,
    Transition,
};

const POINTER: &str = "pointer";
const SWIPE: &str = "swipe";

/// Tracks where each press started so releases can be classified as
/// swipes or taps
#[derive(Debug, Default)]
pub struct PointerAdapter {
    /// Start position of each active touch, by pointer id
    touches: HashMap<u32, (f64, f64)>,
    /// Start position of the current non-touch press
    pressed_at: Option<(f64, f64)>,
}

/// Swipe direction for a movement from `start` to `end`, if it travelled
/// further than `threshold` along its dominant axis
pub fn swipe_direction(start: (f64, f64), end: (f64, f64), threshold: f64) -> Option<&'static str> {
    let dx = start.0 - end.0;
    let dy = start.1 - end.1;
    if dx.abs() > dy.abs() {
        if dx > threshold {
            Some("left")
        } else if dx < -threshold {
            Some("right")
        } else {
            None
        }
    } else if dy > threshold {
        Some("up")
    } else if dy < -threshold {
        Some("down")
    } else {
        None
    }
}

/// Token for a press: `pointer` or `pointer:<button>`
fn pointer_token(button: Option<PointerButton>) -> String {
    match button {
        Some(button) => format!("{}:{}", POINTER, button.name()),
        None => POINTER.to_string(),
    }
}

impl PointerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of touches currently on the surface
    pub fn active_touches(&self) -> usize {
        self.touches.len()
    }

    fn pointer_down(&mut self, tracker: &mut Tracker, event: &RawEvent, input: &PointerInput) -> Vec<Response> {
        let position = (input.x, input.y);
        if input.pointer_type == PointerType::Touch {
            self.touches.entry(input.pointer_id).or_insert(position);
        }
        self.pressed_at = Some(position);
        tracker.reset_seq_timeout();

        let token = pointer_token(input.button);
        let mut responses = Vec::new();
        let accepted = tracker.accepts(event);
        let target = event.target.as_ref();
        let payload = Payload::Pointer {
            x: input.x,
            y: input.y,
        };
        if accepted {
            responses = tracker.trigger_with_selectors("pointer:down", target, &payload);
            if input.button.is_some() {
                responses.extend(tracker.trigger_with_selectors(&format!("{}:down", token), target, &payload));
            }
        }
        tracker.add_down(&token, None);
        // the filter only gates the press events; held combos always fire
        responses.extend(tracker.handle_down_events(target, &payload));
        responses
    }

    fn pointer_up(&mut self, tracker: &mut Tracker, event: &RawEvent, input: &PointerInput) -> Vec<Response> {
        let end = (input.x, input.y);
        let mut tap = false;
        let start = if input.pointer_type == PointerType::Touch {
            let start = self.touches.remove(&input.pointer_id).or(self.pressed_at);
            tap = start == Some(end);
            start
        } else {
            self.pressed_at
        };
        self.pressed_at = None;
        tracker.reset_seq_timeout();

        let token = pointer_token(input.button);
        if !tracker.accepts(event) {
            tracker.remove_down(&token);
            return Vec::new();
        }

        let target = event.target.as_ref();
        let payload = Payload::Pointer {
            x: input.x,
            y: input.y,
        };
        let mut responses = tracker.trigger_with_selectors("pointer:up", target, &payload);
        if input.button.is_some() {
            responses.extend(tracker.trigger_with_selectors(&format!("{}:up", token), target, &payload));
        }

        let threshold = tracker.settings().swipe_threshold;
        match start.and_then(|start| swipe_direction(start, end, threshold)) {
            Some(direction) => {
                let swipe = format!("{}:{}", SWIPE, direction);
                log::debug!("Detected {}", swipe);
                tracker.remove_down(&token);
                tracker.add_down(&swipe, None);
                responses.extend(tracker.handle_down_events(target, &payload));
                tracker.handle_seq_events();
                tracker.remove_down(&swipe);
            }
            None => {
                tracker.handle_seq_events();
                tracker.remove_down(&token);
                if tap {
                    responses.extend(tracker.trigger_with_selectors("click", target, &payload));
                }
            }
        }
        responses
    }

    fn click(&mut self, tracker: &mut Tracker, event: &RawEvent, kind: ClickKind, button: PointerButton) -> Vec<Response> {
        tracker.reset_seq_timeout();
        if !tracker.accepts(event) {
            return Vec::new();
        }
        let target = event.target.as_ref();
        let name = kind.to_string();
        if kind == ClickKind::ContextMenu {
            return tracker.trigger_with_selectors(&name, target, &Payload::None);
        }
        let mut responses = Vec::new();
        if button == PointerButton::Left {
            responses.extend(tracker.trigger_with_selectors(&name, target, &Payload::None));
        }
        let specific = format!("{}:{}", name, button.name());
        responses.extend(tracker.trigger_with_selectors(&specific, target, &Payload::None));
        responses
    }
}

impl InputAdapter for PointerAdapter {
    fn capability(&self) -> Capability {
        Capability::Pointer
    }

    fn handle(&mut self, tracker: &mut Tracker, event: &RawEvent) -> Vec<Response> {
        match &event.kind {
            RawEventKind::Pointer(input) => match input.transition {
                Transition::Down => self.pointer_down(tracker, event, input),
                Transition::Up => self.pointer_up(tracker, event, input),
            },
            RawEventKind::Click { kind, button } => self.click(tracker, event, *kind, *button),
            _ => Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.touches.clear();
        self.pressed_at = None;
    }
}
