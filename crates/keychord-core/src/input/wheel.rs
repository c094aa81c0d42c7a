// Keychord Input Layer - Wheel
// Scroll ticks as momentary down events

use crate::event::{Payload, Response};
use crate::tracker::Tracker;

use super::adapter::InputAdapter;
use super::raw::{Capability, RawEvent, RawEventKind};

const WHEEL: &str = "wheel";

#[derive(Debug, Default)]
pub struct WheelAdapter;

impl WheelAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Direction for a signed delta on one axis
fn direction(delta: f64, positive: &'static str, negative: &'static str) -> Option<&'static str> {
    if delta > 0.0 {
        Some(positive)
    } else if delta < 0.0 {
        Some(negative)
    } else {
        None
    }
}

impl InputAdapter for WheelAdapter {
    fn capability(&self) -> Capability {
        Capability::Wheel
    }

    fn handle(&mut self, tracker: &mut Tracker, event: &RawEvent) -> Vec<Response> {
        let RawEventKind::Wheel {
            delta_x,
            delta_y,
            delta_z,
        } = event.kind
        else {
            return Vec::new();
        };
        tracker.reset_seq_timeout();
        if !tracker.accepts(event) {
            return Vec::new();
        }
        let target = event.target.as_ref();
        let payload = Payload::Wheel {
            x: delta_x,
            y: delta_y,
            z: delta_z,
        };
        let mut responses = tracker.trigger_with_selectors(WHEEL, target, &payload);

        let vertical = direction(delta_y, "down", "up");
        let depth = direction(delta_z, "out", "in");
        for dir in [vertical, depth].into_iter().flatten() {
            let name = format!("{}:{}", WHEEL, dir);
            responses.extend(tracker.do_down_event(&name, target, &payload));
        }

        // shift+wheel scrolls sideways; the bare name fires as well
        if let Some(dir) = direction(delta_x, "right", "left") {
            let name = format!("{}:{}", WHEEL, dir);
            responses.extend(tracker.do_down_event(&name, target, &payload));
            if tracker.is_down("shift") {
                responses.extend(tracker.trigger_with_selectors(&name, target, &payload));
            }
        }
        responses
    }
}
