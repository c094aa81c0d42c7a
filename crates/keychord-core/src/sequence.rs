// Keychord Sequence Buffer
// Bounded history of completed combos and the sequence names they form

use std::collections::VecDeque;

use indexmap::IndexSet;

use crate::combo;
use crate::config::EventName;

/// Default number of combos remembered
pub const DEFAULT_CAPACITY: usize = 12;

/// Shortest sequence that is ever triggered
const MIN_STEPS: usize = 2;

/// Completed combos, oldest first
///
/// Each entry is the sorted token list of one combo (`["ControlLeft", "s"]`).
/// When full, recording a new combo evicts the oldest.
#[derive(Debug, Clone)]
pub struct SequenceBuffer {
    entries: VecDeque<Vec<String>>,
    capacity: usize,
}

impl Default for SequenceBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SequenceBuffer {
    /// Create a buffer holding at most `capacity` combos (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &[String]> {
        self.entries.iter().map(Vec::as_slice)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Push a completed combo and return the sequence names now present
    ///
    /// With fewer than two entries nothing is returned. Otherwise every
    /// trailing slice of at least two steps is named twice, once with raw
    /// token spellings and once with group names, longest slice first,
    /// duplicates removed.
    pub fn record(&mut self, combo: Vec<String>) -> Vec<String> {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(combo);
        self.sequence_names()
    }

    /// Every sequence name for the current contents
    ///
    /// At most two names per trailing slice, so a full buffer yields at most
    /// `2 * (capacity - 1)` names.
    pub fn sequence_names(&self) -> Vec<String> {
        if self.entries.len() < MIN_STEPS {
            return Vec::new();
        }
        let raw: Vec<EventName> = self.entries.iter().map(|t| combo::raw_combo(t)).collect();
        let group: Vec<EventName> = self.entries.iter().map(|t| combo::group_combo(t)).collect();

        let mut names = IndexSet::new();
        for start in 0..=self.entries.len() - MIN_STEPS {
            names.insert(EventName::Sequence(raw[start..].to_vec()).to_string());
            names.insert(EventName::Sequence(group[start..].to_vec()).to_string());
        }
        names.into_iter().collect()
    }
}
