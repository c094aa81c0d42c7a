// Keychord Input Layer
// Raw event model, filtering and the per-capability adapters

mod adapter;
pub mod filter;
mod gamepad;
mod generic;
mod keyboard;
mod pointer;
pub mod raw;
mod text;
mod wheel;
mod window;

pub use adapter::{Dispatch, InputAdapter};
pub use filter::{default_filter, EventFilter};
pub use gamepad::{button_token, GamepadAdapter};
pub use generic::{generic_name, GenericAdapter};
pub use keyboard::KeyboardAdapter;
pub use pointer::{swipe_direction, PointerAdapter};
pub use raw::{
    Capability, ClickKind, ClipboardAction, CompositionPhase, GamepadButton, GamepadSnapshot,
    KeyInput, PointerButton, PointerInput, PointerType, RawEvent, RawEventKind, Target,
    Transition,
};
pub use text::{ClipboardAdapter, CompositionAdapter, SelectionAdapter};
pub use wheel::WheelAdapter;
pub use window::{Orientation, WindowAdapter};

/// One adapter for every capability
pub fn default_adapters() -> Vec<Box<dyn InputAdapter>> {
    vec![
        Box::new(KeyboardAdapter::new()),
        Box::new(PointerAdapter::new()),
        Box::new(WheelAdapter::new()),
        Box::new(CompositionAdapter),
        Box::new(ClipboardAdapter),
        Box::new(SelectionAdapter),
        Box::new(GamepadAdapter::new()),
        Box::new(WindowAdapter::new()),
        Box::new(GenericAdapter),
    ]
}
