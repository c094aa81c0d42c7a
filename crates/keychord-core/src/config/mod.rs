// Keychord Config API
// Event name parsing and canonicalisation used by subscriptions

pub mod event_name;

pub use event_name::{lowercase_unquoted, split_combo, split_unquoted, EventName, SEGMENT_SEPARATOR};
