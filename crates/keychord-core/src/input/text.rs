// Keychord Input Layer - Text
// Composition, clipboard and selection events carrying text

use crate::event::{Payload, Response};
use crate::tracker::Tracker;

use super::adapter::InputAdapter;
use super::raw::{Capability, CompositionPhase, RawEvent, RawEventKind};

/// `<prefix>:"<data>"`
fn quoted(prefix: &str, data: &str) -> String {
    format!("{}:\"{}\"", prefix, data)
}

fn non_empty(data: &Option<String>) -> Option<&str> {
    data.as_deref().filter(|d| !d.is_empty())
}

/// Input-method composition: `compositionstart|update|end`, plus
/// `composing:"…"` while updating and `composed:"…"` at the end
#[derive(Debug, Default)]
pub struct CompositionAdapter;

impl InputAdapter for CompositionAdapter {
    fn capability(&self) -> Capability {
        Capability::Composition
    }

    fn handle(&mut self, tracker: &mut Tracker, event: &RawEvent) -> Vec<Response> {
        let RawEventKind::Composition { phase, data } = &event.kind else {
            return Vec::new();
        };
        if !tracker.accepts(event) {
            return Vec::new();
        }
        let target = event.target.as_ref();
        let payload = Payload::Text(data.clone().unwrap_or_default());
        let mut responses = tracker.trigger_with_selectors(&phase.to_string(), target, &payload);
        if let Some(data) = non_empty(data) {
            let name = match phase {
                CompositionPhase::Update => Some(quoted("composing", data)),
                CompositionPhase::End => Some(quoted("composed", data)),
                CompositionPhase::Start => None,
            };
            if let Some(name) = name {
                responses.extend(tracker.trigger_with_selectors(&name, target, &payload));
            }
        }
        responses
    }
}

/// `copy|cut|paste` and `<action>:"<data>"`; nothing fires without data
#[derive(Debug, Default)]
pub struct ClipboardAdapter;

impl InputAdapter for ClipboardAdapter {
    fn capability(&self) -> Capability {
        Capability::Clipboard
    }

    fn handle(&mut self, tracker: &mut Tracker, event: &RawEvent) -> Vec<Response> {
        let RawEventKind::Clipboard { action, data } = &event.kind else {
            return Vec::new();
        };
        let Some(data) = non_empty(data) else {
            log::trace!("{} without data, ignoring", action);
            return Vec::new();
        };
        if !tracker.accepts(event) {
            return Vec::new();
        }
        let target = event.target.as_ref();
        let payload = Payload::Text(data.to_string());
        let name = action.to_string();
        let mut responses = tracker.trigger_with_selectors(&name, target, &payload);
        responses.extend(tracker.trigger_with_selectors(&quoted(&name, data), target, &payload));
        responses
    }
}

/// `select` and `select:"<data>"`
#[derive(Debug, Default)]
pub struct SelectionAdapter;

impl InputAdapter for SelectionAdapter {
    fn capability(&self) -> Capability {
        Capability::Selection
    }

    fn handle(&mut self, tracker: &mut Tracker, event: &RawEvent) -> Vec<Response> {
        let RawEventKind::Select { data } = &event.kind else {
            return Vec::new();
        };
        if !tracker.accepts(event) {
            return Vec::new();
        }
        let target = event.target.as_ref();
        let payload = Payload::Text(data.clone().unwrap_or_default());
        let mut responses = tracker.trigger_with_selectors("select", target, &payload);
        if let Some(data) = non_empty(data) {
            responses.extend(tracker.trigger_with_selectors(&quoted("select", data), target, &payload));
        }
        responses
    }
}
