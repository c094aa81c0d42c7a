// Keychord Combo Names
// Generates every event name that represents a set of held tokens

use std::cmp::Ordering;

use indexmap::IndexSet;
use smallvec::{smallvec, SmallVec};

use crate::config::EventName;
use crate::modifier::{self, ModifierGroup, ModifierState};
use crate::state::DownState;

/// Joiner for simultaneous combos (`ctrl-a`)
pub const COMBO_JOINER: &str = "-";
/// Joiner for press-ordered combos (`ctrl->a`)
pub const ORDERED_JOINER: &str = "->";
/// Joiner for sequence steps (`a b c`)
pub const SEQUENCE_JOINER: &str = " ";

/// More held tokens than this triggers [`MASH_EVENT`]
pub const MASH_THRESHOLD: usize = 5;
/// Event fired when too many keys are held at once
pub const MASH_EVENT: &str = "faceplant";

/// Alias names for one token; the lower-cased raw spelling comes first
pub type TokenAliases = SmallVec<[String; 2]>;

/// Compare two tokens by combo order
///
/// Modifier priority (ctrl, shift, alt, os) descending, then name length
/// descending, then case-insensitive lexicographic order.
pub fn compare_tokens(a: &str, b: &str) -> Ordering {
    modifier::priority(b)
        .cmp(&modifier::priority(a))
        .then_with(|| b.chars().count().cmp(&a.chars().count()))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
}

/// Sort tokens into canonical combo order
pub fn sort_tokens<S: AsRef<str>>(tokens: &mut [S]) {
    tokens.sort_by(|a, b| compare_tokens(a.as_ref(), b.as_ref()));
}

/// Every name a single token answers to
///
/// `ControlLeft` -> `["controlleft", "ctrl"]`, `a` -> `["a"]`
pub fn token_aliases(token: &str) -> TokenAliases {
    let raw = token.to_lowercase();
    let event = modifier::key_event(token);
    if event == raw {
        smallvec![raw]
    } else {
        smallvec![raw, event]
    }
}

/// How the tokens of one combo relate to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboKind {
    /// Held together, in sorted order (`ctrl-a`)
    Simultaneous,
    /// Held in the order they were pressed (`ctrl->a`)
    Ordered,
}

impl ComboKind {
    /// Wrap already spelled tokens as an [`EventName`]
    pub fn name(self, mut tokens: Vec<String>) -> EventName {
        if tokens.len() == 1 {
            if let Some(token) = tokens.pop() {
                return EventName::Single(token);
            }
        }
        match self {
            ComboKind::Simultaneous => EventName::Simultaneous(tokens),
            ComboKind::Ordered => EventName::Ordered(tokens),
        }
    }
}

/// Every spelling of a combo: the product of each token's aliases
///
/// The all-raw spelling is always first; duplicates are dropped.
pub fn combo_names<S: AsRef<str>>(tokens: &[S], kind: ComboKind) -> Vec<String> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let mut spellings: Vec<Vec<String>> = vec![Vec::with_capacity(tokens.len())];
    for token in tokens {
        let aliases = token_aliases(token.as_ref());
        let mut next = Vec::with_capacity(spellings.len() * aliases.len());
        for prefix in &spellings {
            for alias in &aliases {
                let mut parts = prefix.clone();
                parts.push(alias.clone());
                next.push(parts);
            }
        }
        spellings = next;
    }
    let unique: IndexSet<String> = spellings
        .into_iter()
        .map(|parts| kind.name(parts).to_string())
        .collect();
    unique.into_iter().collect()
}

/// The combo spelled with every token's raw name (`controlleft-s`)
pub fn raw_combo<S: AsRef<str>>(tokens: &[S]) -> EventName {
    ComboKind::Simultaneous.name(tokens.iter().map(|t| t.as_ref().to_lowercase()).collect())
}

/// The combo spelled with every token's group name (`ctrl-s`)
pub fn group_combo<S: AsRef<str>>(tokens: &[S]) -> EventName {
    ComboKind::Simultaneous.name(tokens.iter().map(|t| modifier::key_event(t.as_ref())).collect())
}

/// Drop the Shift token when it changed what another key produced
///
/// When shift is held and some position's canonical token differs from its
/// alternate (`@` produced by `2`), the shift token is redundant: the user
/// means `@`, not `shift-@`. Returns true when `tokens` was modified.
pub fn collapse_shift(tokens: &mut Vec<String>, alternates: &[String], shift_held: bool) -> bool {
    if !shift_held {
        return false;
    }
    let Some(shift_index) = tokens
        .iter()
        .position(|t| ModifierGroup::from_key(t) == Some(ModifierGroup::Shift))
    else {
        return false;
    };
    let shifted = tokens
        .iter()
        .zip(alternates.iter())
        .any(|(token, alternate)| token != alternate);
    if shifted {
        tokens.remove(shift_index);
    }
    shifted
}

/// Every event name for the current down state
///
/// Ordered (`->`) names in press order come first, then the sorted `-`
/// names. When shift was collapsed, the un-shifted alternates contribute
/// their own names too (`shift-2` alongside `@`). Exactly two tokens with a
/// collapsed shift produce no ordered names.
pub fn down_events(state: &DownState, modifiers: &ModifierState) -> Vec<String> {
    let count = state.len();
    if count == 0 {
        return Vec::new();
    }
    let mut names: IndexSet<String> = IndexSet::new();
    let mut working = state.tokens().to_vec();
    let alternates = state.alternates().to_vec();
    let shifted = count > 1
        && collapse_shift(&mut working, &alternates, modifiers.group_active(ModifierGroup::Shift));

    if count > 1 && !(count == 2 && shifted) {
        names.extend(combo_names(&working, ComboKind::Ordered));
        if shifted {
            names.extend(combo_names(&alternates, ComboKind::Ordered));
        }
    }

    sort_tokens(&mut working);
    names.extend(combo_names(&working, ComboKind::Simultaneous));
    if shifted {
        let mut unshifted = alternates;
        sort_tokens(&mut unshifted);
        names.extend(combo_names(&unshifted, ComboKind::Simultaneous));
    }
    names.into_iter().collect()
}

/// The sorted, shift-collapsed token list recorded when a combo completes
pub fn completed_combo(state: &DownState, modifiers: &ModifierState) -> Vec<String> {
    let mut combo = state.tokens().to_vec();
    collapse_shift(
        &mut combo,
        state.alternates(),
        modifiers.group_active(ModifierGroup::Shift),
    );
    sort_tokens(&mut combo);
    combo
}
