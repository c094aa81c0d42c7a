// Keychord Input Layer - Generic
// Any other host event, triggered as `<prefix>:<type>`

use crate::event::{Payload, Response};
use crate::tracker::Tracker;

use super::adapter::InputAdapter;
use super::raw::{Capability, RawEvent, RawEventKind};

#[derive(Debug, Default)]
pub struct GenericAdapter;

/// Event name for a generic event
pub fn generic_name(prefix: Option<&str>, event_type: &str) -> String {
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}:{}", prefix, event_type),
        None => event_type.to_string(),
    }
}

impl InputAdapter for GenericAdapter {
    fn capability(&self) -> Capability {
        Capability::Generic
    }

    fn handle(&mut self, tracker: &mut Tracker, event: &RawEvent) -> Vec<Response> {
        let RawEventKind::Generic { prefix, event_type } = &event.kind else {
            return Vec::new();
        };
        if !tracker.accepts(event) {
            return Vec::new();
        }
        let name = generic_name(prefix.as_deref(), event_type);
        tracker.trigger_with_selectors(&name, event.target.as_ref(), &Payload::None)
    }
}
