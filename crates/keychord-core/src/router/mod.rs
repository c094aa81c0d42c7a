// Keychord Event Router
// Subscriptions, aliases, scopes and triggering by event name

mod scope;
mod subscription;

pub use scope::Scope;
pub use subscription::{Callback, Subscription};

use std::collections::HashMap;

use indexmap::IndexMap;
use regex::Regex;

use crate::combo::{MASH_EVENT, SEQUENCE_JOINER};
use crate::config::{split_unquoted, EventName, SEGMENT_SEPARATOR};
use crate::event::{Context, Event, Payload, Response};

/// Aliases every router starts with
pub const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("tap", "click"),
    ("middleclick", "pointer:middle"),
    ("rightclick", "pointer:right"),
    ("doubleclick", "dblclick"),
    ("tripleclick", "pointer:left pointer:left pointer:left"),
    (
        "quadrupleclick",
        "pointer:left pointer:left pointer:left pointer:left",
    ),
    ("konami", "up up down down left right left right b a enter"),
    ("portrait", "window:orientation:portrait"),
    ("landscape", "window:orientation:landscape"),
    ("hulksmash", MASH_EVENT),
];

/// Recorded events containing either of these are selector variants
const SELECTOR_MARKERS: [&str; 2] = [":#", ":."];

/// Errors from subscription management
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("event name cannot be empty")]
    EmptyEventName,

    #[error("invocation limit must be at least 1")]
    ZeroLimit,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid recording filter: {0}")]
    Filter(#[from] regex::Error),
}

/// Maps event names to their subscribers
#[derive(Debug)]
pub struct Router {
    events: IndexMap<String, Vec<Subscription>>,
    aliases: HashMap<String, String>,
    scope: Scope,
    recording: bool,
    recorded: Vec<String>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a router with the built-in aliases
    pub fn new() -> Self {
        let aliases = BUILTIN_ALIASES
            .iter()
            .map(|(alias, target)| (alias.to_string(), target.to_string()))
            .collect();
        Self {
            events: IndexMap::new(),
            aliases,
            scope: Scope::new(),
            recording: false,
            recorded: Vec::new(),
        }
    }

    /// Register `alias` as shorthand for `target`
    pub fn add_alias(&mut self, alias: &str, target: &str) -> Result<(), RouterError> {
        if alias.trim().is_empty() {
            return Err(RouterError::InvalidArgument("alias cannot be empty".into()));
        }
        if target.trim().is_empty() {
            return Err(RouterError::EmptyEventName);
        }
        self.aliases.insert(alias.to_string(), target.to_string());
        Ok(())
    }

    /// The alias target for `name`, or `name` itself
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    /// Canonical spelling of a subscription name, without scope
    ///
    /// Aliases and the upper-case letter rule (`A` -> `shift-a`) apply to
    /// every `:` segment of every sequence step. The result is lower-cased
    /// outside quotes and simultaneous combos are sorted.
    pub fn normalize(&self, name: &str) -> Result<String, RouterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RouterError::EmptyEventName);
        }
        let separator = SEGMENT_SEPARATOR.to_string();
        let steps: Vec<String> = split_unquoted(name, SEQUENCE_JOINER)
            .into_iter()
            .map(|step| {
                let segments = split_unquoted(step, &separator);
                (0..segments.len())
                    .map(|i| self.expand_segment(segments[i], &segments[..=i].join(&separator)))
                    .collect::<Vec<_>>()
                    .join(&separator)
            })
            .collect();
        let joined = steps.join(SEQUENCE_JOINER);
        Ok(EventName::parse(&joined).canonicalize().to_string())
    }

    /// Expand one segment; `written` is the step up to and including it
    fn expand_segment(&self, segment: &str, written: &str) -> String {
        let resolved = self.resolve_alias(segment);
        // `window:orientation:landscape` is already the full form of `landscape`
        if resolved != segment && written.ends_with(resolved) {
            return segment.to_string();
        }
        let mut chars = resolved.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_uppercase() => format!("shift-{}", resolved),
            _ => resolved.to_string(),
        }
    }

    /// Subscribe `callback` to `name` under the current scope
    ///
    /// Returns the exact name the subscription is stored under.
    pub fn on(
        &mut self,
        name: &str,
        callback: Callback,
        context: Option<Context>,
        limit: Option<u32>,
    ) -> Result<String, RouterError> {
        if limit == Some(0) {
            return Err(RouterError::ZeroLimit);
        }
        let key = self.scope.apply(&self.normalize(name)?);
        log::debug!("Subscribing to {:?}", key);
        self.events.entry(key.clone()).or_default().push(Subscription::new(
            callback,
            context.unwrap_or_default(),
            limit,
        ));
        Ok(key)
    }

    /// Subscribe for a single invocation
    pub fn once(
        &mut self,
        name: &str,
        callback: Callback,
        context: Option<Context>,
    ) -> Result<String, RouterError> {
        self.on(name, callback, context, Some(1))
    }

    /// Subscribe the same callback to several names
    ///
    /// Nothing is registered when any name is invalid.
    pub fn on_many(
        &mut self,
        names: &[&str],
        callback: Callback,
        context: Option<Context>,
        limit: Option<u32>,
    ) -> Result<Vec<String>, RouterError> {
        for name in names {
            self.normalize(name)?;
        }
        names
            .iter()
            .map(|name| self.on(name, callback.clone(), context.clone(), limit))
            .collect()
    }

    /// Drop every subscription
    pub fn off_all(&mut self) {
        self.events.clear();
    }

    /// Remove subscriptions
    ///
    /// `name` limits removal to one event (all events when `None`). A
    /// callback matches by identity and a context by value; with neither,
    /// every subscription of the selected events goes. Returns how many
    /// subscriptions were removed.
    pub fn off(
        &mut self,
        name: Option<&str>,
        callback: Option<&Callback>,
        context: Option<&Context>,
    ) -> Result<usize, RouterError> {
        let keys: Vec<String> = match name {
            Some(name) => vec![self.scope.apply(&self.normalize(name)?)],
            None => self.events.keys().cloned().collect(),
        };
        let mut removed = 0;
        for key in keys {
            let Some(list) = self.events.get_mut(&key) else {
                continue;
            };
            let before = list.len();
            list.retain(|sub| !sub.matches(callback, context));
            removed += before - list.len();
            if list.is_empty() {
                self.events.shift_remove(&key);
            }
        }
        Ok(removed)
    }

    /// Invoke every subscriber of `name` under the current scope
    ///
    /// A top-level alias is resolved once. Subscribers run in registration
    /// order; a failing callback is logged and skipped. Returns the
    /// responses of the callbacks that succeeded.
    pub fn trigger(&mut self, name: &str, payload: &Payload) -> Vec<Response> {
        let key = self.scope.apply(self.resolve_alias(name));
        log::debug!("Triggering: {}", key);
        if self.recording {
            self.recorded.push(key.clone());
        }

        let Some(list) = self.events.get_mut(&key) else {
            return Vec::new();
        };
        let mut due = Vec::with_capacity(list.len());
        list.retain_mut(|sub| {
            due.push((sub.callback.clone(), sub.context.clone()));
            !sub.consume()
        });
        if list.is_empty() {
            self.events.shift_remove(&key);
        }

        let mut responses = Vec::with_capacity(due.len());
        for (callback, context) in &due {
            let event = Event {
                name: &key,
                context,
                payload,
            };
            match callback.call(&event) {
                Ok(response) => responses.push(response),
                Err(e) => log::warn!("Subscriber for {:?} failed: {:#}", key, e),
            }
        }
        responses
    }

    /// Number of subscriptions stored under the exact name `key`
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.events.get(key).map_or(0, Vec::len)
    }

    /// Stored event names, in first-subscription order
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    pub fn push_scope(&mut self, name: &str) -> Result<(), RouterError> {
        let name = name.trim();
        if name.is_empty() || name.contains(SEGMENT_SEPARATOR) {
            return Err(RouterError::InvalidArgument(format!(
                "invalid scope name {:?}",
                name
            )));
        }
        self.scope.push(name);
        Ok(())
    }

    pub fn pop_scope(&mut self) {
        self.scope.pop();
    }

    /// Current scope prefix (`""`, `"foo:"`, `"foo.bar:"`)
    pub fn scope(&self) -> String {
        self.scope.prefix()
    }

    /// Record every triggered name until recording stops
    pub fn start_recording(&mut self) {
        self.recording = true;
        self.recorded.clear();
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Stop recording and return the recorded names matching `filter`
    ///
    /// Can be called again afterwards to apply a different filter.
    pub fn stop_recording(&mut self, filter: Option<&str>) -> Result<Vec<String>, RouterError> {
        self.recording = false;
        let Some(pattern) = filter else {
            return Ok(self.recorded.clone());
        };
        let regex = Regex::new(pattern)?;
        Ok(self
            .recorded
            .iter()
            .filter(|name| regex.is_match(name))
            .cloned()
            .collect())
    }

    /// Stop recording and return the last non-selector event recorded
    /// before the first `keyup`, i.e. the first keystroke typed
    pub fn stop_recording_keystroke(&mut self) -> Option<String> {
        self.recording = false;
        self.recorded
            .iter()
            .filter(|name| !SELECTOR_MARKERS.iter().any(|m| name.contains(m)))
            .take_while(|name| !name.contains("keyup"))
            .last()
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, Callback) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let cb = Callback::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (count, cb)
    }

    #[test]
    fn test_normalize() {
        let router = Router::new();
        assert_eq!(router.normalize("Control-A").unwrap(), "ctrl-a");
        assert_eq!(router.normalize("A").unwrap(), "shift-a");
        assert_eq!(router.normalize("a CTRL-s").unwrap(), "a ctrl-s");
        assert_eq!(router.normalize("tap").unwrap(), "click");
        assert_eq!(router.normalize("foo:rightclick").unwrap(), "foo:pointer:right");
        assert_eq!(router.normalize("keydown:A").unwrap(), "keydown:shift-a");
        assert!(matches!(router.normalize("  "), Err(RouterError::EmptyEventName)));
    }

    #[test]
    fn test_normalize_keeps_spelled_out_alias_target() {
        let router = Router::new();
        assert_eq!(router.normalize("landscape").unwrap(), "window:orientation:landscape");
        assert_eq!(
            router.normalize("window:orientation:landscape").unwrap(),
            "window:orientation:landscape"
        );
        assert_eq!(router.normalize("pointer:middle").unwrap(), "pointer:middle");
        assert_eq!(
            router.normalize("editor:portrait").unwrap(),
            "editor:window:orientation:portrait"
        );
    }

    #[test]
    fn test_normalize_alias_to_sequence() {
        let router = Router::new();
        assert_eq!(
            router.normalize("konami").unwrap(),
            "up up down down left right left right b a enter"
        );
    }

    #[test]
    fn test_on_and_trigger() {
        let mut router = Router::new();
        let (count, cb) = counter();
        let key = router.on("Ctrl-A", cb, None, None).unwrap();
        assert_eq!(key, "ctrl-a");
        assert_eq!(router.trigger("ctrl-a", &Payload::None).len(), 1);
        assert_eq!(router.trigger("ctrl-b", &Payload::None).len(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_registration_order() {
        let mut router = Router::new();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = order.clone();
            router
                .on("a", Callback::new(move |_| {
                    order.lock().push(i);
                    Ok(())
                }), None, None)
                .unwrap();
        }
        router.trigger("a", &Payload::None);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_limits() {
        let mut router = Router::new();
        let (count, cb) = counter();
        router.on("a", cb.clone(), None, Some(2)).unwrap();
        router.once("b", cb, None).unwrap();
        for _ in 0..4 {
            router.trigger("a", &Payload::None);
            router.trigger("b", &Payload::None);
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(router.subscriber_count("a"), 0);
        assert_eq!(router.event_names().count(), 0);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut router = Router::new();
        let (_, cb) = counter();
        assert!(matches!(router.on("a", cb, None, Some(0)), Err(RouterError::ZeroLimit)));
    }

    #[test]
    fn test_off_variants() {
        let mut router = Router::new();
        let (_, keep) = counter();
        let (_, drop) = counter();
        let ctx = Context::new().with("owner", "x");
        router.on("a", keep.clone(), None, None).unwrap();
        router.on("a", drop.clone(), None, None).unwrap();
        router.on("b", drop.clone(), Some(ctx.clone()), None).unwrap();
        router.on("c", keep.clone(), Some(ctx.clone()), None).unwrap();

        assert_eq!(router.off(Some("a"), Some(&drop), None).unwrap(), 1);
        assert_eq!(router.subscriber_count("a"), 1);

        assert_eq!(router.off(None, None, Some(&ctx)).unwrap(), 2);
        assert_eq!(router.subscriber_count("b"), 0);
        assert_eq!(router.subscriber_count("c"), 0);

        assert_eq!(router.off(Some("A"), None, None).unwrap(), 0);
        assert_eq!(router.off(Some("a"), None, None).unwrap(), 1);
        assert_eq!(router.event_names().count(), 0);
    }

    #[test]
    fn test_off_all() {
        let mut router = Router::new();
        let (count, cb) = counter();
        router.on_many(&["a", "b", "ctrl-c"], cb, None, None).unwrap();
        router.off_all();
        router.trigger("a", &Payload::None);
        router.trigger("ctrl-c", &Payload::None);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_on_many_is_all_or_nothing() {
        let mut router = Router::new();
        let (_, cb) = counter();
        assert!(router.on_many(&["a", ""], cb, None, None).is_err());
        assert_eq!(router.subscriber_count("a"), 0);
    }

    #[test]
    fn test_failing_callback_does_not_stop_others() {
        let mut router = Router::new();
        let (count, cb) = counter();
        router
            .on("a", Callback::new(|_| -> anyhow::Result<()> { anyhow::bail!("boom") }), None, None)
            .unwrap();
        router.on("a", cb, None, None).unwrap();
        let responses = router.trigger("a", &Payload::None);
        assert_eq!(responses.len(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prevent_default_response() {
        let mut router = Router::new();
        router.on("a", Callback::new(|_| Ok(false)), None, None).unwrap();
        assert_eq!(router.trigger("a", &Payload::None), vec![Response::PreventDefault]);
    }

    #[test]
    fn test_event_carries_name_context_payload() {
        let mut router = Router::new();
        let seen = Arc::new(parking_lot::Mutex::new(None));
        let s = seen.clone();
        router
            .on(
                "keydown",
                Callback::new(move |event| {
                    *s.lock() = Some((
                        event.name.to_string(),
                        event.context.get("id").map(str::to_string),
                        event.payload.clone(),
                    ));
                    Ok(())
                }),
                Some(Context::new().with("id", "7")),
                None,
            )
            .unwrap();
        let payload = Payload::Key {
            key: "a".into(),
            code: "KeyA".into(),
        };
        router.trigger("keydown", &payload);
        assert_eq!(
            *seen.lock(),
            Some(("keydown".to_string(), Some("7".to_string()), payload))
        );
    }

    #[test]
    fn test_scopes() {
        let mut router = Router::new();
        let (count, cb) = counter();
        router.push_scope("foo").unwrap();
        assert_eq!(router.on("a", cb, None, None).unwrap(), "foo:a");
        router.push_scope("bar").unwrap();
        assert_eq!(router.scope(), "foo.bar:");
        router.trigger("a", &Payload::None);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        router.pop_scope();
        router.trigger("a", &Payload::None);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        router.pop_scope();
        router.pop_scope();
        assert_eq!(router.scope(), "");
        assert!(router.push_scope("a:b").is_err());
    }

    #[test]
    fn test_trigger_resolves_alias() {
        let mut router = Router::new();
        let (count, cb) = counter();
        router.on("faceplant", cb, None, None).unwrap();
        router.trigger("hulksmash", &Payload::None);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_custom_alias() {
        let mut router = Router::new();
        router.add_alias("save", "ctrl-s").unwrap();
        assert_eq!(router.normalize("save").unwrap(), "ctrl-s");
        assert!(router.add_alias("", "x").is_err());
    }

    #[test]
    fn test_recording_filter() {
        let mut router = Router::new();
        router.start_recording();
        for name in ["controlleft-a", "ctrl-a", "controlleft->a", "keyup"] {
            router.trigger(name, &Payload::None);
        }
        let combos = router.stop_recording(Some("-[^>]")).unwrap();
        assert_eq!(combos, vec!["controlleft-a", "ctrl-a"]);
        assert!(!router.is_recording());
        assert_eq!(router.stop_recording(None).unwrap().len(), 4);
        assert!(matches!(router.stop_recording(Some("(")), Err(RouterError::Filter(_))));
    }

    #[test]
    fn test_recording_keystroke() {
        let mut router = Router::new();
        router.start_recording();
        for name in ["keydown", "ctrl", "ctrl-b", "ctrl-b:#editor", "keyup", "b"] {
            router.trigger(name, &Payload::None);
        }
        assert_eq!(router.stop_recording_keystroke().as_deref(), Some("ctrl-b"));
    }
}
