// Keychord Tracker
// Per-instance input state and the glue between state, naming and routing

use std::fmt;
use std::sync::Arc;

use crate::combo::{self, MASH_EVENT, MASH_THRESHOLD};
use crate::event::{Payload, Response};
use crate::input::filter::{default_filter, EventFilter};
use crate::input::raw::{RawEvent, Target};
use crate::key::{KeyCodeTable, KeyNormalizer};
use crate::modifier::{ModifierGroup, ModifierState};
use crate::router::Router;
use crate::sequence::SequenceBuffer;
use crate::settings::Settings;
use crate::state::DownState;
use crate::timer::{Clock, InactivityTimer, SystemClock};

/// Everything one instance knows about the input it has seen
///
/// Adapters feed it down/up tokens; it names the resulting combos and
/// sequences and hands them to the router.
pub struct Tracker {
    settings: Settings,
    normalizer: KeyNormalizer,
    key_codes: KeyCodeTable,
    down: DownState,
    modifiers: ModifierState,
    sequence: SequenceBuffer,
    router: Router,
    timer: InactivityTimer,
    clock: Arc<dyn Clock>,
    filter: EventFilter,
    paused: bool,
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("settings", &self.settings)
            .field("down", &self.down)
            .field("sequence", &self.sequence)
            .field("router", &self.router)
            .field("timer", &self.timer)
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Tracker {
    pub fn new(settings: Settings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: Settings, clock: Arc<dyn Clock>) -> Self {
        Self {
            normalizer: KeyNormalizer::new(settings.unique_numpad),
            key_codes: KeyCodeTable::new(settings.unique_numpad, settings.mac_keycodes),
            down: DownState::new(),
            modifiers: ModifierState::new(),
            sequence: SequenceBuffer::new(settings.max_sequence_buf),
            router: Router::new(),
            timer: InactivityTimer::new(settings.sequence_timeout()),
            clock,
            filter: Box::new(default_filter),
            paused: false,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn normalizer(&self) -> &KeyNormalizer {
        &self.normalizer
    }

    pub fn key_codes(&self) -> &KeyCodeTable {
        &self.key_codes
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    pub fn down_state(&self) -> &DownState {
        &self.down
    }

    pub fn modifiers(&self) -> &ModifierState {
        &self.modifiers
    }

    pub fn sequence(&self) -> &SequenceBuffer {
        &self.sequence
    }

    pub fn timer(&self) -> &InactivityTimer {
        &self.timer
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Replace the predicate deciding which raw events may trigger
    pub fn set_filter(&mut self, filter: EventFilter) {
        self.filter = filter;
    }

    pub fn accepts(&self, event: &RawEvent) -> bool {
        (self.filter)(event)
    }

    pub fn add_down(&mut self, token: &str, alternate: Option<&str>) -> bool {
        self.down.add(token, alternate)
    }

    pub fn remove_down(&mut self, token: &str) -> bool {
        self.down.remove(token)
    }

    pub fn set_modifier(&mut self, code: &str, is_down: bool) {
        self.modifiers.set(code, is_down);
    }

    /// Every event name for what is held right now
    pub fn down_events(&self) -> Vec<String> {
        combo::down_events(&self.down, &self.modifiers)
    }

    /// Whether `name` is held: as a full combo name, as a single token or
    /// its alternate, or as a modifier group name
    pub fn is_down(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        if self.down_events().contains(&name) {
            return true;
        }
        self.down
            .tokens()
            .iter()
            .zip(self.down.alternates())
            .any(|(token, alternate)| {
                token.to_lowercase() == name
                    || alternate.to_lowercase() == name
                    || ModifierGroup::from_key(token).is_some_and(|g| g.event_name() == name)
            })
    }

    /// Trigger `name` unless paused
    pub fn trigger(&mut self, name: &str, payload: &Payload) -> Vec<Response> {
        if self.paused {
            log::trace!("Paused, not triggering {:?}", name);
            return Vec::new();
        }
        self.router.trigger(name, payload)
    }

    /// Trigger `name:#id` and `name:.class` for the event's target
    pub fn handle_selectors(
        &mut self,
        name: &str,
        target: Option<&Target>,
        payload: &Payload,
    ) -> Vec<Response> {
        if self.settings.disable_selectors {
            return Vec::new();
        }
        let Some(target) = target else {
            return Vec::new();
        };
        let mut responses = Vec::new();
        for selector in target.selectors() {
            responses.extend(self.trigger(&format!("{}{}", name, selector), payload));
        }
        responses
    }

    /// Trigger `name` and then its selector variants
    pub fn trigger_with_selectors(
        &mut self,
        name: &str,
        target: Option<&Target>,
        payload: &Payload,
    ) -> Vec<Response> {
        let mut responses = self.trigger(name, payload);
        responses.extend(self.handle_selectors(name, target, payload));
        responses
    }

    /// Trigger every name for the current down state
    ///
    /// Holding more than five tokens at once also fires the mash event.
    pub fn handle_down_events(&mut self, target: Option<&Target>, payload: &Payload) -> Vec<Response> {
        let mut responses = Vec::new();
        for name in self.down_events() {
            responses.extend(self.trigger_with_selectors(&name, target, payload));
        }
        if self.down.len() > MASH_THRESHOLD {
            responses.extend(self.trigger(MASH_EVENT, payload));
        }
        responses
    }

    /// Record a just-completed combo and trigger the sequences it finishes
    ///
    /// Call before removing the released token. Only records when more
    /// tokens are held than after the previous release. The buffer is
    /// cleared once any sequence reached a subscriber.
    pub fn handle_seq_events(&mut self) {
        if !self.settings.disable_sequences && !self.paused && self.down.completes_combo() {
            let completed = combo::completed_combo(&self.down, &self.modifiers);
            let names = self.sequence.record(completed);
            let mut matched = false;
            for name in names {
                if !self.trigger(&name, &Payload::None).is_empty() {
                    matched = true;
                }
            }
            if matched {
                log::debug!("Sequence matched, clearing buffer");
                self.sequence.clear();
            }
        }
        self.reset_seq_timeout();
    }

    /// Press, name, record and release `token` in one step
    ///
    /// Used for momentary inputs that have no separate release (wheel
    /// ticks, swipes, spoken words).
    pub fn do_down_event(
        &mut self,
        token: &str,
        target: Option<&Target>,
        payload: &Payload,
    ) -> Vec<Response> {
        self.add_down(token, None);
        let responses = self.handle_down_events(target, payload);
        self.handle_seq_events();
        self.remove_down(token);
        responses
    }

    /// Mark a synthetic token (gamepad button, clap) as held and trigger
    /// the resulting names
    pub fn press(&mut self, token: &str) -> Vec<Response> {
        self.poll();
        self.set_modifier(token, true);
        self.add_down(token, None);
        self.reset_seq_timeout();
        self.handle_down_events(None, &Payload::None)
    }

    /// Release a synthetic token
    pub fn release(&mut self, token: &str) {
        self.poll();
        self.handle_seq_events();
        self.remove_down(token);
        self.set_modifier(token, false);
    }

    /// Re-arm the inactivity reset
    pub fn reset_seq_timeout(&mut self) {
        self.timer.arm(self.clock.now());
    }

    /// Apply the inactivity reset if its deadline passed; returns whether
    /// state was wiped
    pub fn poll(&mut self) -> bool {
        if self.timer.fire_if_expired(self.clock.now()) {
            log::debug!("Resetting key states due to timeout");
            self.reset_key_states();
            true
        } else {
            false
        }
    }

    /// Forget held tokens, modifiers and the sequence buffer
    pub fn reset_key_states(&mut self) {
        self.modifiers.clear();
        self.sequence.clear();
        self.down.reset();
    }

    /// Full reset including the pending timeout
    pub fn reset(&mut self) {
        self.reset_key_states();
        self.timer.cancel();
    }
}
