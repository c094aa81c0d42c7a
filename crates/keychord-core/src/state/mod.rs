// Keychord State
// Per-instance tracking of held input tokens

mod down;

pub use down::DownState;
