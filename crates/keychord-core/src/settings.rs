// Keychord Settings Module
// Tunables for key normalization, sequence detection and event emission

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sequence::DEFAULT_CAPACITY;

/// Settings for one tracking instance
///
/// Loaded from a TOML file (default: ~/.config/keychord/settings.toml) or
/// built in code starting from `Settings::default()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Ignore auto-repeated keydown events
    pub no_key_repeat: bool,
    /// Inactivity before held keys and the sequence buffer are reset
    pub sequence_timeout_ms: u64,
    /// Completed combos remembered for sequence matching
    pub max_sequence_buf: usize,
    /// Name numpad keys `numpad<key>` instead of sharing names with the main block
    pub unique_numpad: bool,
    /// Turn off sequence detection entirely
    pub disable_sequences: bool,
    /// Skip the `:#id` / `:.class` event variants
    pub disable_selectors: bool,
    /// Minimum travel in pixels for a swipe
    pub swipe_threshold: f64,
    /// Include the macOS extra key codes in the key-code table
    pub mac_keycodes: bool,

    /// File these settings were loaded from (for reload)
    pub source_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            no_key_repeat: true,
            sequence_timeout_ms: 3000,
            max_sequence_buf: DEFAULT_CAPACITY,
            unique_numpad: false,
            disable_sequences: false,
            disable_selectors: false,
            swipe_threshold: 100.0,
            mac_keycodes: false,
            source_path: None,
        }
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

/// TOML representation for deserializing settings
#[cfg(feature = "toml-config")]
#[derive(Debug, Clone, serde::Deserialize, Default)]
struct SettingsToml {
    #[serde(default)]
    keyboard: Option<KeyboardSettings>,

    #[serde(default)]
    sequences: Option<SequenceSettings>,

    #[serde(default)]
    pointer: Option<PointerSettings>,

    #[serde(default)]
    events: Option<EventSettings>,
}

#[cfg(feature = "toml-config")]
#[derive(Debug, Clone, serde::Deserialize, Default)]
struct KeyboardSettings {
    #[serde(default)]
    no_key_repeat: Option<toml::Value>,
    #[serde(default)]
    unique_numpad: Option<toml::Value>,
    #[serde(default)]
    mac_keycodes: Option<toml::Value>,
}

#[cfg(feature = "toml-config")]
#[derive(Debug, Clone, serde::Deserialize, Default)]
struct SequenceSettings {
    #[serde(default)]
    timeout_ms: Option<i64>,
    #[serde(default)]
    max_buffer: Option<i64>,
    #[serde(default)]
    disabled: Option<toml::Value>,
}

#[cfg(feature = "toml-config")]
#[derive(Debug, Clone, serde::Deserialize, Default)]
struct PointerSettings {
    #[serde(default)]
    swipe_threshold: Option<f64>,
}

#[cfg(feature = "toml-config")]
#[derive(Debug, Clone, serde::Deserialize, Default)]
struct EventSettings {
    #[serde(default)]
    disable_selectors: Option<toml::Value>,
}

impl Settings {
    /// Create settings with the default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Inactivity timeout as a duration
    pub fn sequence_timeout(&self) -> Duration {
        Duration::from_millis(self.sequence_timeout_ms)
    }

    /// Check values that would make the tracker misbehave
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_sequence_buf == 0 {
            return Err(SettingsError::InvalidValue(
                "max_sequence_buf must be at least 1".to_string(),
            ));
        }
        if !self.swipe_threshold.is_finite() || self.swipe_threshold < 0.0 {
            return Err(SettingsError::InvalidValue(format!(
                "swipe_threshold must be a non-negative number, got {}",
                self.swipe_threshold
            )));
        }
        Ok(())
    }

    /// Load settings from a TOML file
    #[cfg(feature = "toml-config")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load settings from TOML string
    ///
    /// Missing sections and keys keep their defaults.
    #[cfg(feature = "toml-config")]
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();

        if let Some(keyboard) = toml_settings.keyboard {
            if let Some(v) = keyboard.no_key_repeat {
                settings.no_key_repeat = parse_bool_value(&v)?;
            }
            if let Some(v) = keyboard.unique_numpad {
                settings.unique_numpad = parse_bool_value(&v)?;
            }
            if let Some(v) = keyboard.mac_keycodes {
                settings.mac_keycodes = parse_bool_value(&v)?;
            }
        }

        if let Some(sequences) = toml_settings.sequences {
            if let Some(ms) = sequences.timeout_ms {
                settings.sequence_timeout_ms = u64::try_from(ms).map_err(|_| {
                    SettingsError::InvalidValue(format!("timeout_ms cannot be negative: {}", ms))
                })?;
            }
            if let Some(len) = sequences.max_buffer {
                settings.max_sequence_buf = usize::try_from(len).map_err(|_| {
                    SettingsError::InvalidValue(format!("max_buffer cannot be negative: {}", len))
                })?;
            }
            if let Some(v) = sequences.disabled {
                settings.disable_sequences = parse_bool_value(&v)?;
            }
        }

        if let Some(pointer) = toml_settings.pointer {
            if let Some(threshold) = pointer.swipe_threshold {
                settings.swipe_threshold = threshold;
            }
        }

        if let Some(events) = toml_settings.events {
            if let Some(v) = events.disable_selectors {
                settings.disable_selectors = parse_bool_value(&v)?;
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keychord").join("settings.toml"))
    }

    /// Load from default location (~/.config/keychord/settings.toml)
    #[cfg(feature = "toml-config")]
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        log::debug!("No settings file found, using defaults");
        Ok(Self::new())
    }

    /// Reload settings from the file they were loaded from
    #[cfg(feature = "toml-config")]
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        if let Some(ref path) = self.source_path {
            let new_settings = Self::from_file(path)?;
            *self = new_settings;
            Ok(())
        } else {
            Err(SettingsError::InvalidValue("No source path set".to_string()))
        }
    }
}

/// Parse a TOML value as a boolean
#[cfg(feature = "toml-config")]
fn parse_bool_value(value: &toml::Value) -> Result<bool, SettingsError> {
    match value {
        toml::Value::Boolean(b) => Ok(*b),
        toml::Value::Integer(1) => Ok(true),
        toml::Value::Integer(0) => Ok(false),
        toml::Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(SettingsError::InvalidValue(format!(
                "Cannot convert '{}' to boolean",
                s
            ))),
        },
        _ => Err(SettingsError::InvalidValue(format!(
            "Cannot convert {:?} to boolean",
            value
        ))),
    }
}

/// Create default settings content for a new installation
pub fn default_settings_content() -> &'static str {
    r#"# Keychord Settings
# Place this file at: ~/.config/keychord/settings.toml

[keyboard]
# Ignore auto-repeated keydown events
no_key_repeat = true
# Name numpad keys "numpad<key>" (e.g. numpad5)
unique_numpad = false
# Add the macOS extra key codes (F1-F7 at 63236-63242, ...)
mac_keycodes = false

[sequences]
# Inactivity (ms) before held keys and the sequence buffer reset
timeout_ms = 3000
# Completed combos remembered for sequences
max_buffer = 12
disabled = false

[pointer]
# Minimum travel (px) for swipe:left/right/up/down
swipe_threshold = 100.0

[events]
# Skip the ":#id" and ":.class" variants of events
disable_selectors = false
"#
}
