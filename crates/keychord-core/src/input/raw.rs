// Keychord Input Layer - Raw Events
// Host-neutral description of the input events adapters consume

use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::key::KeyLocation;

/// Which adapter handles an event
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Capability {
    Keyboard,
    Pointer,
    Wheel,
    Composition,
    Clipboard,
    Selection,
    Gamepad,
    Window,
    Generic,
}

/// The element an event was aimed at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    /// Element tag, e.g. `INPUT`
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Target {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// `:#id` and `:.class` suffixes for selector events
    pub fn selectors(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.classes.len() + 1);
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            out.push(format!(":#{}", id));
        }
        out.extend(
            self.classes
                .iter()
                .filter(|c| !c.is_empty())
                .map(|c| format!(":.{}", c)),
        );
        out
    }
}

/// Press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Down,
    Up,
}

/// A keyboard event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub transition: Transition,
    /// Produced key value (`"a"`, `"@"`, `"Shift"`); `None` when the host has none
    pub key: Option<String>,
    /// Physical code name (`"KeyA"`, `"Digit2"`, `"ShiftLeft"`)
    pub code: String,
    /// Legacy numeric key code
    pub key_code: Option<u32>,
    pub location: KeyLocation,
    /// Auto-repeat while held
    pub repeat: bool,
}

impl KeyInput {
    pub fn down(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            transition: Transition::Down,
            key: Some(key.into()),
            code: code.into(),
            key_code: None,
            location: KeyLocation::Standard,
            repeat: false,
        }
    }

    pub fn up(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            transition: Transition::Up,
            ..Self::down(key, code)
        }
    }

    pub fn at(mut self, location: KeyLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_key_code(mut self, key_code: u32) -> Self {
        self.key_code = Some(key_code);
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }
}

/// Pointer button by its conventional index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
    Back,
    Forward,
    Eraser,
    Other(u16),
}

impl PointerButton {
    pub fn from_index(index: u16) -> Self {
        match index {
            0 => PointerButton::Left,
            1 => PointerButton::Middle,
            2 => PointerButton::Right,
            3 => PointerButton::Back,
            4 => PointerButton::Forward,
            5 => PointerButton::Eraser,
            n => PointerButton::Other(n),
        }
    }

    /// Name used in event names (`pointer:left:down`)
    pub fn name(self) -> String {
        match self {
            PointerButton::Left => "left".to_string(),
            PointerButton::Middle => "middle".to_string(),
            PointerButton::Right => "right".to_string(),
            PointerButton::Back => "back".to_string(),
            PointerButton::Forward => "forward".to_string(),
            PointerButton::Eraser => "eraser".to_string(),
            PointerButton::Other(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PointerType {
    #[default]
    Mouse,
    Pen,
    Touch,
}

/// A pointer, mouse or touch press/release
#[derive(Debug, Clone, PartialEq)]
pub struct PointerInput {
    pub transition: Transition,
    pub button: Option<PointerButton>,
    pub pointer_type: PointerType,
    /// Distinguishes simultaneous touches
    pub pointer_id: u32,
    pub x: f64,
    pub y: f64,
}

impl PointerInput {
    pub fn mouse(transition: Transition, button: PointerButton, x: f64, y: f64) -> Self {
        Self {
            transition,
            button: Some(button),
            pointer_type: PointerType::Mouse,
            pointer_id: 0,
            x,
            y,
        }
    }

    pub fn touch(transition: Transition, pointer_id: u32, x: f64, y: f64) -> Self {
        Self {
            transition,
            button: None,
            pointer_type: PointerType::Touch,
            pointer_id,
            x,
            y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ClickKind {
    Click,
    DblClick,
    ContextMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum CompositionPhase {
    #[strum(serialize = "compositionstart")]
    Start,
    #[strum(serialize = "compositionupdate")]
    Update,
    #[strum(serialize = "compositionend")]
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ClipboardAction {
    Copy,
    Cut,
    Paste,
}

/// One gamepad button as last reported
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GamepadButton {
    pub pressed: bool,
    /// Analog value in `0.0..=1.0`; digital buttons report 0 or 1
    pub value: f64,
}

impl GamepadButton {
    pub fn pressed(value: f64) -> Self {
        Self { pressed: true, value }
    }

    pub fn released() -> Self {
        Self::default()
    }
}

/// Everything a connected gamepad reports in one poll
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GamepadSnapshot {
    pub index: u32,
    /// Device id string
    pub id: String,
    /// Host timestamp of the last state change; unchanged means no new data
    pub timestamp: f64,
    pub buttons: Vec<GamepadButton>,
    pub axes: Vec<f64>,
}

impl GamepadSnapshot {
    pub fn new(index: u32, buttons: usize, axes: usize) -> Self {
        Self {
            index,
            buttons: vec![GamepadButton::released(); buttons],
            axes: vec![0.0; axes],
            ..Self::default()
        }
    }

    pub fn at(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_button(mut self, button: usize, state: GamepadButton) -> Self {
        if let Some(slot) = self.buttons.get_mut(button) {
            *slot = state;
        }
        self
    }

    pub fn with_axis(mut self, axis: usize, value: f64) -> Self {
        if let Some(slot) = self.axes.get_mut(axis) {
            *slot = value;
        }
        self
    }

    /// Same shape with every button released and every axis centred
    pub fn zeroed(&self) -> Self {
        Self {
            buttons: vec![GamepadButton::released(); self.buttons.len()],
            axes: vec![0.0; self.axes.len()],
            ..self.clone()
        }
    }
}

/// What happened
#[derive(Debug, Clone, PartialEq)]
pub enum RawEventKind {
    Key(KeyInput),
    Pointer(PointerInput),
    Click {
        kind: ClickKind,
        button: PointerButton,
    },
    Wheel {
        delta_x: f64,
        delta_y: f64,
        delta_z: f64,
    },
    Composition {
        phase: CompositionPhase,
        data: Option<String>,
    },
    Clipboard {
        action: ClipboardAction,
        data: Option<String>,
    },
    Select {
        data: Option<String>,
    },
    /// One poll of every connected gamepad; a pad missing from the list
    /// has been disconnected
    Gamepads(Vec<GamepadSnapshot>),
    /// The window was resized
    Resize {
        width: f64,
        height: f64,
    },
    /// The device was rotated to `angle` degrees
    OrientationChange {
        angle: i32,
    },
    /// Anything else, named `<prefix>:<event_type>`
    Generic {
        prefix: Option<String>,
        event_type: String,
    },
}

/// An input event as delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub kind: RawEventKind,
    pub target: Option<Target>,
}

impl RawEvent {
    pub fn new(kind: RawEventKind) -> Self {
        Self { kind, target: None }
    }

    pub fn key(input: KeyInput) -> Self {
        Self::new(RawEventKind::Key(input))
    }

    pub fn pointer(input: PointerInput) -> Self {
        Self::new(RawEventKind::Pointer(input))
    }

    pub fn wheel(delta_x: f64, delta_y: f64, delta_z: f64) -> Self {
        Self::new(RawEventKind::Wheel {
            delta_x,
            delta_y,
            delta_z,
        })
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Adapter responsible for this event
    pub fn capability(&self) -> Capability {
        match self.kind {
            RawEventKind::Key(_) => Capability::Keyboard,
            RawEventKind::Pointer(_) | RawEventKind::Click { .. } => Capability::Pointer,
            RawEventKind::Wheel { .. } => Capability::Wheel,
            RawEventKind::Composition { .. } => Capability::Composition,
            RawEventKind::Clipboard { .. } => Capability::Clipboard,
            RawEventKind::Select { .. } => Capability::Selection,
            RawEventKind::Gamepads(_) => Capability::Gamepad,
            RawEventKind::Resize { .. } | RawEventKind::OrientationChange { .. } => Capability::Window,
            RawEventKind::Generic { .. } => Capability::Generic,
        }
    }

    /// Host event type name (`keydown`, `pointerup`, `paste`, ...)
    pub fn event_type(&self) -> String {
        match &self.kind {
            RawEventKind::Key(input) => match input.transition {
                Transition::Down => "keydown".to_string(),
                Transition::Up => "keyup".to_string(),
            },
            RawEventKind::Pointer(input) => match input.transition {
                Transition::Down => "pointerdown".to_string(),
                Transition::Up => "pointerup".to_string(),
            },
            RawEventKind::Click { kind, .. } => kind.to_string(),
            RawEventKind::Wheel { .. } => "wheel".to_string(),
            RawEventKind::Composition { phase, .. } => phase.to_string(),
            RawEventKind::Clipboard { action, .. } => action.to_string(),
            RawEventKind::Select { .. } => "select".to_string(),
            RawEventKind::Gamepads(_) => "gamepad".to_string(),
            RawEventKind::Resize { .. } => "resize".to_string(),
            RawEventKind::OrientationChange { .. } => "orientationchange".to_string(),
            RawEventKind::Generic { event_type, .. } => event_type.clone(),
        }
    }

    /// Whether this is a keyboard event
    pub fn is_keyboard(&self) -> bool {
        matches!(self.kind, RawEventKind::Key(_))
    }
}
