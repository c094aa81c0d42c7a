// Keychord Core Library
// Combo and sequence event naming for keyboard, pointer and synthetic input

pub mod combo;
pub mod config;
pub mod event;
pub mod input;
pub mod instance;
pub mod key;
pub mod modifier;
pub mod router;
pub mod sequence;
pub mod settings;
pub mod state;
pub mod timer;
pub mod tracker;

pub use combo::{
    combo_names, completed_combo, down_events, sort_tokens, ComboKind, MASH_EVENT, MASH_THRESHOLD,
};
pub use config::EventName;
pub use event::{prevents_default, Context, Event, Payload, Response};
pub use input::{
    default_adapters, default_filter, Capability, Dispatch, EventFilter, GamepadButton,
    GamepadSnapshot, InputAdapter, KeyInput, Orientation, PointerButton, PointerInput, RawEvent,
    RawEventKind, Target,
};
pub use instance::{HumanInput, InstanceRegistry, SharedInput};
pub use key::{KeyCodeTable, KeyLocation, KeyNormalizer};
pub use modifier::{ModifierGroup, ModifierState};
pub use router::{Callback, Router, RouterError, Scope};
pub use sequence::SequenceBuffer;
pub use settings::{Settings, SettingsError};
pub use state::DownState;
pub use timer::{Clock, InactivityTimer, ManualClock, SystemClock};
pub use tracker::Tracker;
