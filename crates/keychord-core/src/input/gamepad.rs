// Keychord Input Layer - Gamepad
// Diffs successive gamepad polls into button, axis and connection events

use std::collections::BTreeMap;

use crate::event::{Payload, Response};
use crate::tracker::Tracker;

use super::adapter::InputAdapter;
use super::raw::{Capability, GamepadButton, GamepadSnapshot, RawEvent, RawEventKind};

pub const CONNECTED_EVENT: &str = "gpad:connected";
pub const DISCONNECTED_EVENT: &str = "gpad:disconnected";
const BUTTON: &str = "gpad:button";
const AXIS: &str = "gpad:axis";

/// Token held while button `index` is pressed (`gpad:button:0`)
pub fn button_token(index: usize) -> String {
    format!("{}:{}", BUTTON, index)
}

/// Keeps a copy of each pad's previous poll so changes can be named
///
/// Buttons are tracked as down tokens, so they take part in combos
/// (`gpad:button:4-gpad:button:5`) and sequences like keys do. Axes only
/// report their new value.
#[derive(Debug, Default)]
pub struct GamepadAdapter {
    pads: BTreeMap<u32, GamepadSnapshot>,
}

impl GamepadAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes of the pads seen in the last poll
    pub fn connected(&self) -> impl Iterator<Item = u32> + '_ {
        self.pads.keys().copied()
    }

    fn disconnect(&mut self, tracker: &mut Tracker, index: u32) -> Vec<Response> {
        let Some(last) = self.pads.remove(&index) else {
            return Vec::new();
        };
        log::debug!("Gamepad {} disconnected: {:?}", index, last.id);
        for (button, state) in last.buttons.iter().enumerate() {
            if state.pressed {
                tracker.remove_down(&button_token(button));
            }
        }
        tracker.trigger(DISCONNECTED_EVENT, &Payload::Gamepad { index, value: 0.0 })
    }

    /// Trigger everything that changed between two polls of one pad
    fn diff(
        tracker: &mut Tracker,
        accepted: bool,
        previous: &GamepadSnapshot,
        current: &GamepadSnapshot,
    ) -> Vec<Response> {
        let mut responses = Vec::new();
        let mut pressed_changed = false;

        for (button, state) in current.buttons.iter().enumerate() {
            let token = button_token(button);
            if state.pressed {
                if !tracker.is_down(&token) {
                    tracker.add_down(&token, None);
                }
            } else if tracker.is_down(&token) {
                tracker.handle_seq_events();
                tracker.remove_down(&token);
            }
            if !accepted {
                continue;
            }

            let before = previous.buttons.get(button).copied().unwrap_or_default();
            let payload = Payload::Gamepad {
                index: current.index,
                value: state.value,
            };
            if state.pressed != before.pressed {
                let edge = if state.pressed { "down" } else { "up" };
                responses.extend(tracker.trigger(&token, &payload));
                responses.extend(tracker.trigger(&format!("{}:{}", BUTTON, edge), &payload));
                responses.extend(tracker.trigger(&format!("{}:{}", token, edge), &payload));
                pressed_changed = true;
            } else if state.value != before.value {
                responses.extend(tracker.trigger(&token, &payload));
                responses.extend(tracker.trigger(&format!("{}:value", token), &payload));
            }
        }

        if accepted {
            for (axis, value) in current.axes.iter().enumerate() {
                if previous.axes.get(axis).is_some_and(|before| before != value) {
                    let payload = Payload::Gamepad {
                        index: current.index,
                        value: *value,
                    };
                    responses.extend(tracker.trigger(&format!("{}:{}", AXIS, axis), &payload));
                }
            }
            if pressed_changed {
                responses.extend(tracker.handle_down_events(None, &Payload::None));
            }
        }
        responses
    }
}

impl InputAdapter for GamepadAdapter {
    fn capability(&self) -> Capability {
        Capability::Gamepad
    }

    fn handle(&mut self, tracker: &mut Tracker, event: &RawEvent) -> Vec<Response> {
        let RawEventKind::Gamepads(pads) = &event.kind else {
            return Vec::new();
        };
        let accepted = tracker.accepts(event);
        let mut responses = Vec::new();

        let gone: Vec<u32> = self
            .pads
            .keys()
            .copied()
            .filter(|index| !pads.iter().any(|pad| pad.index == *index))
            .collect();
        for index in gone {
            responses.extend(self.disconnect(tracker, index));
        }

        for pad in pads {
            match self.pads.get(&pad.index).map(|last| last.timestamp) {
                None => {
                    log::debug!("Gamepad {} detected: {:?}", pad.index, pad.id);
                    // compared against a released pad on the next poll
                    self.pads.insert(pad.index, pad.zeroed());
                    responses.extend(tracker.trigger(
                        CONNECTED_EVENT,
                        &Payload::Gamepad {
                            index: pad.index,
                            value: 0.0,
                        },
                    ));
                }
                Some(timestamp) if timestamp == pad.timestamp => {}
                Some(_) => {
                    let previous = self.pads.insert(pad.index, pad.clone()).unwrap_or_default();
                    responses.extend(Self::diff(tracker, accepted, &previous, pad));
                }
            }
        }
        responses
    }

    fn reset(&mut self) {
        for pad in self.pads.values_mut() {
            for button in pad.buttons.iter_mut() {
                *button = GamepadButton::released();
            }
        }
    }
}
