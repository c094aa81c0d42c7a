// Keychord Input Layer - Adapter Interface
// Adapters translate raw events of one capability into tracker calls

use std::fmt;

use crate::event::{prevents_default, Response};
use crate::tracker::Tracker;

use super::raw::{Capability, RawEvent};

/// Translates raw events of one [`Capability`] into down/up bookkeeping and
/// triggered event names
pub trait InputAdapter: Send + fmt::Debug {
    fn capability(&self) -> Capability;

    /// Handle one event; returns the responses of every triggered subscriber
    fn handle(&mut self, tracker: &mut Tracker, event: &RawEvent) -> Vec<Response>;

    /// Drop adapter-local state (touch tracking, composition flags)
    fn reset(&mut self) {}
}

/// Outcome of dispatching one raw event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Whether an adapter was registered for the event's capability
    pub handled: bool,
    pub responses: Vec<Response>,
    /// Some subscriber asked to suppress the native default action
    pub prevent_default: bool,
}

impl Dispatch {
    pub fn unhandled() -> Self {
        Self::default()
    }

    pub fn from_responses(responses: Vec<Response>) -> Self {
        Self {
            handled: true,
            prevent_default: prevents_default(&responses),
            responses,
        }
    }
}
