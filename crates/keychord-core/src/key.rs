// Keychord Key Names
// Canonical key naming and the legacy numeric key-code table

use std::collections::HashMap;
use std::fmt;

/// Physical location of a key, as reported by the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum KeyLocation {
    #[default]
    Standard = 0,
    Left = 1,
    Right = 2,
    Numpad = 3,
}

impl KeyLocation {
    /// Create KeyLocation from its numeric value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(KeyLocation::Standard),
            1 => Some(KeyLocation::Left),
            2 => Some(KeyLocation::Right),
            3 => Some(KeyLocation::Numpad),
            _ => None,
        }
    }

    /// Convert to the numeric value
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for KeyLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyLocation::Standard => write!(f, "standard"),
            KeyLocation::Left => write!(f, "left"),
            KeyLocation::Right => write!(f, "right"),
            KeyLocation::Numpad => write!(f, "numpad"),
        }
    }
}

/// Maps raw key/code pairs to canonical key names.
///
/// The only state is configuration; `normalize` is otherwise a pure
/// function of its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyNormalizer {
    unique_numpad: bool,
}

impl KeyNormalizer {
    pub fn new(unique_numpad: bool) -> Self {
        Self { unique_numpad }
    }

    /// Produce the canonical name for a key event
    ///
    /// # Arguments
    /// * `location` - Where the key sits on the keyboard
    /// * `key` - The (possibly layout-dependent) key value, e.g. `"a"` or `"@"`
    /// * `code` - The physical code name, e.g. `"ShiftLeft"` or `"Space"`
    pub fn normalize(&self, location: KeyLocation, key: &str, code: &str) -> String {
        if key == " " {
            return code.to_string();
        }
        let mut name = key;
        if code.contains("Left") || code.contains("Right") {
            // Sided codes win so modifiers can be told apart
            name = code;
        } else if self.unique_numpad && location == KeyLocation::Numpad {
            return format!("numpad{}", key);
        }
        name.strip_prefix("Arrow").unwrap_or(name).to_string()
    }
}

/// Legacy numeric key-code table, one map per location.
///
/// Lookups fall back to the standard location when the specific location
/// has no entry. The table works in both directions.
#[derive(Debug, Clone)]
pub struct KeyCodeTable {
    names: [HashMap<u32, String>; 4],
    codes: [HashMap<String, u32>; 4],
}

const STANDARD_KEYS: &[(&str, u32)] = &[
    ("Backspace", 8),
    ("Tab", 9),
    ("Enter", 13),
    ("Shift", 16),
    ("Control", 17),
    ("Alt", 18),
    ("Pause", 19),
    ("CapsLock", 20),
    ("Escape", 27),
    ("Space", 32),
    ("PageUp", 33),
    ("PageDown", 34),
    ("End", 35),
    ("Home", 36),
    ("ArrowLeft", 37),
    ("Left", 37),
    ("ArrowUp", 38),
    ("Up", 38),
    ("ArrowRight", 39),
    ("Right", 39),
    ("ArrowDown", 40),
    ("Down", 40),
    ("PrintScreen", 42),
    ("Insert", 45),
    ("Delete", 46),
    ("Semicolon", 59),
    ("=", 61),
    ("OS", 92),
    ("Select", 93),
    ("NumLock", 144),
    ("ScrollLock", 145),
    ("VolumeDown", 174),
    ("VolumeUp", 175),
    ("MediaTrackPrevious", 177),
    ("MediaPlayPause", 179),
    (",", 188),
    ("-", 189),
    (".", 190),
    ("/", 191),
    ("`", 192),
    ("[", 219),
    ("\\", 220),
    ("]", 221),
    ("'", 222),
    ("AltGraph", 225),
    ("Compose", 229),
];

const LEFT_KEYS: &[(&str, u32)] = &[
    ("ShiftLeft", 16),
    ("ControlLeft", 17),
    ("AltLeft", 18),
    ("OSLeft", 91),
];

const RIGHT_KEYS: &[(&str, u32)] = &[
    ("ShiftRight", 16),
    ("ControlRight", 17),
    ("AltRight", 18),
    ("OSRight", 92),
];

const NUMPAD_UNIQUE_KEYS: &[(&str, u32)] = &[
    ("NumpadMultiply", 106),
    ("NumpadAdd", 107),
    ("NumpadSubtract", 109),
    ("NumpadDecimal", 46),
    ("Slash", 111),
];

const NUMPAD_KEYS: &[(&str, u32)] = &[("*", 106), ("+", 107), ("-", 109), (".", 46), ("/", 111)];

const MAC_KEYS: &[(&str, u32)] = &[
    ("Enter", 3),
    ("NumpadClear", 63289),
    ("PageUp", 63276),
    ("PageDown", 63277),
    ("End", 63275),
    ("Home", 63273),
    ("ArrowLeft", 63234),
    ("ArrowUp", 63232),
    ("ArrowRight", 63235),
    ("ArrowDown", 63233),
    ("Insert", 63302),
    ("Delete", 63272),
];

impl KeyCodeTable {
    /// Build the table
    ///
    /// # Arguments
    /// * `unique_numpad` - Use distinct names for numpad operators
    /// * `mac_keycodes` - Include the extra codes reported by macOS browsers
    pub fn new(unique_numpad: bool, mac_keycodes: bool) -> Self {
        let mut table = Self {
            names: Default::default(),
            codes: Default::default(),
        };
        table.insert_all(KeyLocation::Standard, STANDARD_KEYS);
        table.insert_all(KeyLocation::Left, LEFT_KEYS);
        table.insert_all(KeyLocation::Right, RIGHT_KEYS);
        if unique_numpad {
            table.insert_all(KeyLocation::Numpad, NUMPAD_UNIQUE_KEYS);
        } else {
            table.insert_all(KeyLocation::Numpad, NUMPAD_KEYS);
        }
        for code in 48..=57u32 {
            table.insert(KeyLocation::Standard, &(code - 48).to_string(), code);
        }
        for code in 65..=90u32 {
            if let Some(letter) = char::from_u32(code) {
                table.insert(KeyLocation::Standard, &letter.to_string(), code);
            }
        }
        for code in 96..=105u32 {
            table.insert(KeyLocation::Numpad, &format!("Numpad{}", code - 96), code);
        }
        for code in 112..=123u32 {
            table.insert(KeyLocation::Standard, &format!("F{}", code - 112 + 1), code);
        }
        if mac_keycodes {
            table.insert_all(KeyLocation::Standard, MAC_KEYS);
            for code in 63236..=63242u32 {
                table.insert(KeyLocation::Standard, &format!("F{}", code - 63236 + 1), code);
            }
        }
        table
    }

    fn insert_all(&mut self, location: KeyLocation, entries: &[(&str, u32)]) {
        for (name, code) in entries {
            self.insert(location, name, *code);
        }
    }

    fn insert(&mut self, location: KeyLocation, name: &str, code: u32) {
        // Later names for the same code win, e.g. 37 -> "Left"
        self.names[location.index()].insert(code, name.to_string());
        self.codes[location.index()].insert(name.to_string(), code);
    }

    /// Name for a numeric code at a location, falling back to the standard location
    pub fn name(&self, location: KeyLocation, code: u32) -> Option<&str> {
        self.names[location.index()]
            .get(&code)
            .or_else(|| self.names[KeyLocation::Standard.index()].get(&code))
            .map(String::as_str)
    }

    /// Numeric code for a name at a location, falling back to the standard location
    pub fn code(&self, location: KeyLocation, name: &str) -> Option<u32> {
        self.codes[location.index()]
            .get(name)
            .or_else(|| self.codes[KeyLocation::Standard.index()].get(name))
            .copied()
    }

    /// Resolve the code name used as a key's alternate representation
    ///
    /// The numeric code wins when the table knows it; otherwise the host's
    /// code name is used, with `KeyA`/`Digit2` style names reduced to the
    /// same `A`/`2` spelling the numeric table produces.
    pub fn resolve(&self, location: KeyLocation, key_code: Option<u32>, code: &str) -> String {
        if let Some(name) = key_code.and_then(|c| self.name(location, c)) {
            return name.to_string();
        }
        if let Some(letter) = code.strip_prefix("Key") {
            if letter.len() == 1 && letter.chars().all(|c| c.is_ascii_alphabetic()) {
                return letter.to_ascii_uppercase();
            }
        }
        if let Some(digit) = code.strip_prefix("Digit") {
            if digit.len() == 1 && digit.chars().all(|c| c.is_ascii_digit()) {
                return digit.to_string();
            }
        }
        code.to_string()
    }
}

impl Default for KeyCodeTable {
    fn default() -> Self {
        Self::new(false, false)
    }
}
