// Keychord Event Names
// Parses event name strings into steps and combo tokens, and back

use std::fmt;

use crate::combo::{self, COMBO_JOINER, ORDERED_JOINER, SEQUENCE_JOINER};
use crate::modifier;

/// Separator between scope or detail segments (`keydown:a`, `foo:ctrl-a`)
pub const SEGMENT_SEPARATOR: char = ':';

/// A parsed event name
///
/// `Sequence` steps are never sequences themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventName {
    /// One token or a plain named event (`a`, `pointer:left`, `hi:pause`)
    Single(String),
    /// Tokens held together (`ctrl-a`)
    Simultaneous(Vec<String>),
    /// Tokens pressed in this order (`ctrl->a`)
    Ordered(Vec<String>),
    /// Combos completed one after another (`a ctrl-s`)
    Sequence(Vec<EventName>),
}

impl EventName {
    /// Parse an event name without altering case or order
    pub fn parse(name: &str) -> Self {
        let steps = split_unquoted(name.trim(), SEQUENCE_JOINER);
        if steps.len() > 1 {
            EventName::Sequence(steps.into_iter().map(Self::parse_step).collect())
        } else {
            Self::parse_step(name.trim())
        }
    }

    fn parse_step(step: &str) -> Self {
        let ordered = split_unquoted(step, ORDERED_JOINER);
        if ordered.len() > 1 {
            return EventName::Ordered(ordered.into_iter().map(str::to_string).collect());
        }
        let tokens = split_combo(step);
        if tokens.len() > 1 {
            EventName::Simultaneous(tokens)
        } else {
            EventName::Single(step.to_string())
        }
    }

    /// Canonical form: lower-cased outside quotes, simultaneous combos sorted
    /// with alternate modifier spellings folded to group names
    pub fn canonicalize(self) -> Self {
        match self {
            EventName::Single(token) => EventName::Single(lowercase_unquoted(&token)),
            EventName::Ordered(tokens) => {
                EventName::Ordered(tokens.iter().map(|t| lowercase_unquoted(t)).collect())
            }
            EventName::Simultaneous(tokens) => {
                let mut tokens: Vec<String> = tokens
                    .iter()
                    .map(|t| {
                        let lower = lowercase_unquoted(t);
                        modifier::fold_alternate(&lower).to_string()
                    })
                    .collect();
                combo::sort_tokens(&mut tokens);
                EventName::Simultaneous(tokens)
            }
            EventName::Sequence(steps) => {
                EventName::Sequence(steps.into_iter().map(Self::canonicalize).collect())
            }
        }
    }

    /// Number of sequence steps (1 for anything that is not a sequence)
    pub fn steps(&self) -> usize {
        match self {
            EventName::Sequence(steps) => steps.len(),
            _ => 1,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, EventName::Sequence(_))
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventName::Single(token) => f.write_str(token),
            EventName::Simultaneous(tokens) => f.write_str(&tokens.join(COMBO_JOINER)),
            EventName::Ordered(tokens) => f.write_str(&tokens.join(ORDERED_JOINER)),
            EventName::Sequence(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    if i > 0 {
                        f.write_str(SEQUENCE_JOINER)?;
                    }
                    write!(f, "{}", step)?;
                }
                Ok(())
            }
        }
    }
}

/// Split on `separator` wherever it is not inside double quotes
///
/// Empty pieces from repeated separators are dropped.
pub fn split_unquoted<'a>(input: &'a str, separator: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    if separator.is_empty() {
        parts.push(input);
        return parts;
    }
    let mut in_quotes = false;
    let mut start = 0;
    let mut i = 0;
    while i < input.len() {
        let rest = &input[i..];
        if rest.starts_with('"') {
            in_quotes = !in_quotes;
            i += 1;
            continue;
        }
        if !in_quotes && rest.starts_with(separator) {
            if i > start {
                parts.push(&input[start..i]);
            }
            i += separator.len();
            start = i;
            continue;
        }
        i += rest.chars().next().map_or(1, char::len_utf8);
    }
    if start < input.len() {
        parts.push(&input[start..]);
    }
    parts
}

/// Split a simultaneous combo into tokens
///
/// A trailing `--` is the minus key (`ctrl--` -> `["ctrl", "-"]`), and a
/// lone `-` is a single token.
pub fn split_combo(step: &str) -> Vec<String> {
    if step == COMBO_JOINER {
        return vec![step.to_string()];
    }
    let (body, minus) = match step.strip_suffix("--") {
        Some(body) if !body.is_empty() => (body, true),
        _ => (step, false),
    };
    let mut tokens: Vec<String> = split_unquoted(body, COMBO_JOINER)
        .into_iter()
        .map(str::to_string)
        .collect();
    if minus {
        tokens.push(COMBO_JOINER.to_string());
    }
    tokens
}

/// Lower-case everything outside double quotes
pub fn lowercase_unquoted(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_quotes = false;
    for c in input.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            out.push(c);
        } else if in_quotes {
            out.push(c);
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
