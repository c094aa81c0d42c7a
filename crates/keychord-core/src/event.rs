// Keychord Events
// What subscribers receive and what they hand back

use indexmap::IndexMap;

/// Data attached to a triggered event
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    None,
    /// Keyboard event: the normalized key and the raw code
    Key { key: String, code: String },
    /// Pointer or touch position
    Pointer { x: f64, y: f64 },
    /// Wheel deltas
    Wheel { x: f64, y: f64, z: f64 },
    /// Composition, clipboard or selection text
    Text(String),
    /// On/off state change (`fullscreen`, `hi:pause`)
    Flag(bool),
    /// Gamepad button or axis value, with the pad it came from
    Gamepad { index: u32, value: f64 },
    /// Window size after a resize or rotation
    Size { width: f64, height: f64 },
}

/// Key/value data registered alongside a subscription
///
/// Compared structurally when removing subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Context(IndexMap<String, String>);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One delivery to a subscriber
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// The exact name that matched, scope included
    pub name: &'a str,
    /// Context the subscription was registered with
    pub context: &'a Context,
    pub payload: &'a Payload,
}

/// A subscriber's verdict on the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Response {
    #[default]
    Continue,
    /// Ask the producer to suppress the native default action
    PreventDefault,
}

impl From<()> for Response {
    fn from(_: ()) -> Self {
        Response::Continue
    }
}

/// `false` means "prevent default", like a handler returning false
impl From<bool> for Response {
    fn from(keep_default: bool) -> Self {
        if keep_default {
            Response::Continue
        } else {
            Response::PreventDefault
        }
    }
}

/// Whether any subscriber asked for the default action to be suppressed
pub fn prevents_default(responses: &[Response]) -> bool {
    responses.contains(&Response::PreventDefault)
}
