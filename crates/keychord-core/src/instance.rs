// Keychord Instances
// One HumanInput per element, dispatch to adapters and lifecycle events

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::event::{Context, Payload, Response};
use crate::input::{default_adapters, Capability, Dispatch, EventFilter, InputAdapter, RawEvent};
use crate::router::{Callback, RouterError};
use crate::settings::Settings;
use crate::timer::{Clock, SystemClock};
use crate::tracker::Tracker;

/// Fired at the end of every [`HumanInput::init`]
pub const INITIALIZED_EVENT: &str = "hi:initialized";
/// Fired just before triggering is paused
pub const PAUSE_EVENT: &str = "hi:pause";
/// Fired right after triggering resumes
pub const RESUME_EVENT: &str = "hi:resume";
/// Fired before state is reset
pub const RESET_EVENT: &str = "hi:reset";

/// Input tracking for one element
///
/// Owns the tracker and an adapter per capability. Raw events go in
/// through [`HumanInput::dispatch`]; subscribers are managed with the
/// router-style methods (`on`, `off`, ...). Call [`HumanInput::init`] once
/// the lifecycle subscribers are in place.
#[derive(Debug)]
pub struct HumanInput {
    element: String,
    tracker: Tracker,
    adapters: IndexMap<Capability, Box<dyn InputAdapter>>,
    initialized: bool,
}

impl HumanInput {
    pub fn new(element: impl Into<String>, settings: Settings) -> Self {
        Self::with_clock(element, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(element: impl Into<String>, settings: Settings, clock: Arc<dyn Clock>) -> Self {
        let mut instance = Self {
            element: element.into(),
            tracker: Tracker::with_clock(settings, clock),
            adapters: IndexMap::new(),
            initialized: false,
        };
        for adapter in default_adapters() {
            instance.register_adapter(adapter);
        }
        instance
    }

    /// Start (or restart) input tracking
    ///
    /// Re-initializing resets all input state first, firing `hi:reset`.
    /// Ends with `hi:initialized`. Subscriptions are kept either way.
    pub fn init(&mut self) {
        if self.initialized {
            log::debug!("Re-initializing input tracking for {:?}", self.element);
            self.reset();
        } else {
            log::debug!("Initializing input tracking for {:?}", self.element);
        }
        self.initialized = true;
        self.tracker.trigger(INITIALIZED_EVENT, &Payload::None);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }

    pub fn settings(&self) -> &Settings {
        self.tracker.settings()
    }

    /// Install `adapter` for its capability, returning the one it replaces
    pub fn register_adapter(&mut self, adapter: Box<dyn InputAdapter>) -> Option<Box<dyn InputAdapter>> {
        self.adapters.insert(adapter.capability(), adapter)
    }

    pub fn remove_adapter(&mut self, capability: Capability) -> Option<Box<dyn InputAdapter>> {
        self.adapters.shift_remove(&capability)
    }

    pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        self.adapters.keys().copied()
    }

    /// Feed one raw event through the adapter for its capability
    ///
    /// A pending inactivity reset is applied first.
    pub fn dispatch(&mut self, event: &RawEvent) -> Dispatch {
        self.tracker.poll();
        let capability = event.capability();
        match self.adapters.get_mut(&capability) {
            Some(adapter) => Dispatch::from_responses(adapter.handle(&mut self.tracker, event)),
            None => {
                log::trace!("No adapter for {} events", capability);
                Dispatch::unhandled()
            }
        }
    }

    /// Apply the inactivity reset if it is due
    pub fn poll(&mut self) -> bool {
        self.tracker.poll()
    }

    /// Stop triggering subscribers; key state keeps being tracked
    pub fn pause(&mut self) {
        if self.tracker.is_paused() {
            return;
        }
        self.tracker.trigger(PAUSE_EVENT, &Payload::Flag(true));
        self.tracker.set_paused(true);
    }

    pub fn resume(&mut self) {
        if !self.tracker.is_paused() {
            return;
        }
        self.tracker.set_paused(false);
        self.tracker.trigger(RESUME_EVENT, &Payload::Flag(false));
    }

    pub fn is_paused(&self) -> bool {
        self.tracker.is_paused()
    }

    /// Forget all input state; subscriptions are kept
    pub fn reset(&mut self) {
        self.tracker.trigger(RESET_EVENT, &Payload::None);
        self.tracker.reset();
        for adapter in self.adapters.values_mut() {
            adapter.reset();
        }
    }

    pub fn set_filter(&mut self, filter: EventFilter) {
        self.tracker.set_filter(filter);
    }

    pub fn on(
        &mut self,
        name: &str,
        callback: Callback,
        context: Option<Context>,
        limit: Option<u32>,
    ) -> Result<String, RouterError> {
        self.tracker.router_mut().on(name, callback, context, limit)
    }

    pub fn once(&mut self, name: &str, callback: Callback, context: Option<Context>) -> Result<String, RouterError> {
        self.tracker.router_mut().once(name, callback, context)
    }

    pub fn on_many(
        &mut self,
        names: &[&str],
        callback: Callback,
        context: Option<Context>,
        limit: Option<u32>,
    ) -> Result<Vec<String>, RouterError> {
        self.tracker.router_mut().on_many(names, callback, context, limit)
    }

    pub fn off(
        &mut self,
        name: Option<&str>,
        callback: Option<&Callback>,
        context: Option<&Context>,
    ) -> Result<usize, RouterError> {
        self.tracker.router_mut().off(name, callback, context)
    }

    pub fn off_all(&mut self) {
        self.tracker.router_mut().off_all();
    }

    /// Trigger `name` directly (respects pause)
    pub fn trigger(&mut self, name: &str, payload: &Payload) -> Vec<Response> {
        self.tracker.trigger(name, payload)
    }

    pub fn add_alias(&mut self, alias: &str, target: &str) -> Result<(), RouterError> {
        self.tracker.router_mut().add_alias(alias, target)
    }

    pub fn is_down(&self, name: &str) -> bool {
        self.tracker.is_down(name)
    }

    pub fn down_events(&self) -> Vec<String> {
        self.tracker.down_events()
    }

    pub fn push_scope(&mut self, name: &str) -> Result<(), RouterError> {
        self.tracker.router_mut().push_scope(name)
    }

    pub fn pop_scope(&mut self) {
        self.tracker.router_mut().pop_scope();
    }

    pub fn scope(&self) -> String {
        self.tracker.router().scope()
    }

    pub fn start_recording(&mut self) {
        self.tracker.router_mut().start_recording();
    }

    pub fn stop_recording(&mut self, filter: Option<&str>) -> Result<Vec<String>, RouterError> {
        self.tracker.router_mut().stop_recording(filter)
    }

    pub fn stop_recording_keystroke(&mut self) -> Option<String> {
        self.tracker.router_mut().stop_recording_keystroke()
    }

    /// Hold a synthetic token (gamepad button, clap, spoken word)
    pub fn press(&mut self, token: &str) -> Vec<Response> {
        self.tracker.press(token)
    }

    pub fn release(&mut self, token: &str) {
        self.tracker.release(token);
    }

    /// Press and release a synthetic token in one step
    pub fn do_down_event(&mut self, token: &str) -> Vec<Response> {
        self.tracker.poll();
        self.tracker.do_down_event(token, None, &Payload::None)
    }
}

/// Shared handle to an instance
pub type SharedInput = Arc<Mutex<HumanInput>>;

/// Hands out one [`HumanInput`] per element id
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    instances: Mutex<HashMap<String, SharedInput>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The instance for `element`, created with `settings` and initialized
    /// if there is none
    ///
    /// Settings are ignored when the instance already exists.
    pub fn get_or_create(&self, element: &str, settings: Settings) -> SharedInput {
        let mut instances = self.instances.lock();
        instances
            .entry(element.to_string())
            .or_insert_with(|| {
                let mut instance = HumanInput::new(element, settings);
                instance.init();
                Arc::new(Mutex::new(instance))
            })
            .clone()
    }

    pub fn get(&self, element: &str) -> Option<SharedInput> {
        self.instances.lock().get(element).cloned()
    }

    pub fn remove(&self, element: &str) -> Option<SharedInput> {
        self.instances.lock().remove(element)
    }

    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.lock().is_empty()
    }
}
