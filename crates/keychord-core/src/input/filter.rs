// Keychord Input Layer - Event Filtering
// Decides whether a raw event may trigger subscribers

use super::raw::RawEvent;

/// Element tags that receive typed text
pub const FORM_FIELD_TAGS: [&str; 3] = ["INPUT", "SELECT", "TEXTAREA"];

/// Predicate consulted before an adapter triggers anything
///
/// Filtered events still update key state; only triggering is skipped.
pub type EventFilter = Box<dyn Fn(&RawEvent) -> bool + Send + Sync>;

/// Default filter: keyboard events aimed at form fields are ignored so that
/// typing into a text box does not fire key bindings.
pub fn default_filter(event: &RawEvent) -> bool {
    if !event.is_keyboard() {
        return true;
    }
    let tag = event.target.as_ref().and_then(|t| t.tag.as_deref());
    !matches!(tag, Some(tag) if FORM_FIELD_TAGS.iter().any(|f| f.eq_ignore_ascii_case(tag)))
}
