// Keychord Modifier System
// Modifier groups (ctrl, shift, alt, os), ordering priorities and held state

use std::collections::HashMap;

use strum_macros::{AsRefStr, Display, EnumIter, IntoStaticStr};

/// A logical modifier group.
///
/// The lower-case display form is the event name used for the whole group,
/// e.g. both `ControlLeft` and `ControlRight` are `ctrl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ModifierGroup {
    Ctrl,
    Shift,
    Alt,
    Os,
}

impl ModifierGroup {
    /// Raw key names belonging to this group
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            ModifierGroup::Ctrl => &["Control", "ControlLeft", "ControlRight"],
            ModifierGroup::Shift => &["Shift", "ShiftLeft", "ShiftRight", "⇧"],
            ModifierGroup::Alt => &["Alt", "AltLeft", "AltRight"],
            ModifierGroup::Os => &["OS", "OSLeft", "OSRight"],
        }
    }

    /// Alternate spellings that mean the whole group
    pub fn alternate_names(self) -> &'static [&'static str] {
        match self {
            ModifierGroup::Ctrl => &["control"],
            ModifierGroup::Shift => &[],
            ModifierGroup::Alt => &["option", "⌥"],
            ModifierGroup::Os => &["meta", "win", "⌘", "cmd", "command"],
        }
    }

    /// Ordering priority inside combo names (higher sorts first)
    pub fn priority(self) -> u8 {
        match self {
            ModifierGroup::Ctrl => 5,
            ModifierGroup::Shift => 4,
            ModifierGroup::Alt => 3,
            ModifierGroup::Os => 2,
        }
    }

    /// Event name for the whole group
    pub fn event_name(self) -> &'static str {
        self.into()
    }

    /// Group whose raw key list contains `key` (exact match)
    pub fn from_key(key: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|group| group.keys().iter().any(|k| *k == key))
    }

    /// Group for any lower-cased spelling: raw keys, group name or alternates
    pub fn from_name(name: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        let lower = name.to_lowercase();
        Self::iter().find(|group| {
            lower == group.event_name()
                || group.alternate_names().iter().any(|alt| *alt == lower)
                || group.keys().iter().any(|k| k.to_lowercase() == lower)
        })
    }
}

/// Ordering priority of a token; 0 for anything that is not a modifier
pub fn priority(token: &str) -> u8 {
    ModifierGroup::from_name(token).map_or(0, ModifierGroup::priority)
}

/// Group event name for modifier keys, otherwise the lower-cased token
///
/// `ShiftLeft` -> `shift`, `a` -> `a`
pub fn key_event(token: &str) -> String {
    match ModifierGroup::from_key(token) {
        Some(group) => group.event_name().to_string(),
        None => token.to_lowercase(),
    }
}

/// Fold alternate modifier spellings used in subscriptions into group names
///
/// `control` -> `ctrl`, `⌥` -> `alt`, `cmd` -> `os`. Expects lower-case input.
pub fn fold_alternate(name: &str) -> &str {
    use strum::IntoEnumIterator;
    ModifierGroup::iter()
        .find(|group| group.alternate_names().iter().any(|alt| *alt == name))
        .map_or(name, |group| group.event_name())
}

/// Boolean state for modifier groups, their alternate names and raw codes
#[derive(Debug, Clone, Default)]
pub struct ModifierState {
    flags: HashMap<String, bool>,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a modifier key going down or up
    ///
    /// Non-modifier codes are ignored. For a modifier the group name, every
    /// alternate name and the raw code itself are updated, so `ShiftLeft`
    /// can be distinguished from `ShiftRight`.
    pub fn set(&mut self, code: &str, is_down: bool) {
        let Some(group) = ModifierGroup::from_key(code) else {
            return;
        };
        self.flags.insert(group.event_name().to_string(), is_down);
        for name in group.alternate_names() {
            self.flags.insert((*name).to_string(), is_down);
        }
        self.flags.insert(code.to_string(), is_down);
    }

    /// Whether the named modifier (group, alternate or raw code) is held
    pub fn is_active(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Whether any key of the group is held
    pub fn group_active(&self, group: ModifierGroup) -> bool {
        self.is_active(group.event_name())
    }

    /// Names of every modifier currently held
    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, down)| **down)
            .map(|(name, _)| name.as_str())
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }
}
