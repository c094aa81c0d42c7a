// Keychord Down State
// Canonical and alternate token lists kept in lockstep

/// Tokens currently held down, in press order.
///
/// Two index-aligned lists are kept: the canonical token (what combos are
/// named after) and its alternate, raw representation. A key can change
/// identity between press and release (`2` pressed, `@` produced), and the
/// alternate list is what lets the release still find it.
#[derive(Debug, Clone, Default)]
pub struct DownState {
    down: Vec<String>,
    alternates: Vec<String>,
    /// Length of `down` after the most recent removal
    last_len: usize,
}

impl DownState {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens held
    pub fn len(&self) -> usize {
        self.down.len()
    }

    pub fn is_empty(&self) -> bool {
        self.down.is_empty()
    }

    /// Canonical tokens, in press order
    pub fn tokens(&self) -> &[String] {
        &self.down
    }

    /// Alternate tokens, index-aligned with `tokens()`
    pub fn alternates(&self) -> &[String] {
        &self.alternates
    }

    /// Length recorded at the last removal
    pub fn last_len(&self) -> usize {
        self.last_len
    }

    /// True when more tokens are held now than after the last release,
    /// meaning the release about to happen completes a combo
    pub fn completes_combo(&self) -> bool {
        self.last_len < self.down.len()
    }

    /// Whether `token` is held under either its canonical or alternate name
    pub fn contains(&self, token: &str) -> bool {
        self.position(token).is_some()
    }

    fn position(&self, token: &str) -> Option<usize> {
        self.down
            .iter()
            .position(|t| t == token)
            .or_else(|| self.alternates.iter().position(|t| t == token))
    }

    /// Mark `token` as held
    ///
    /// Does nothing if the token (or the given alternate) is already held,
    /// so repeated down events are harmless. Returns whether it was added.
    pub fn add(&mut self, token: &str, alternate: Option<&str>) -> bool {
        let exists = self.position(token).is_some()
            || alternate.is_some_and(|alt| self.alternates.iter().any(|t| t == alt));
        if exists {
            return false;
        }
        self.down.push(token.to_string());
        self.alternates.push(alternate.unwrap_or(token).to_string());
        true
    }

    /// Release `token`
    ///
    /// Looks the token up in the canonical list, then the alternate list,
    /// then the alternate list in upper case (a letter released after the
    /// Shift key that produced its capital). Unknown tokens are ignored.
    /// Returns whether anything was removed.
    pub fn remove(&mut self, token: &str) -> bool {
        let index = self.position(token).or_else(|| {
            let upper = token.to_uppercase();
            self.alternates.iter().position(|t| *t == upper)
        });
        let removed = match index {
            Some(i) => {
                self.down.remove(i);
                self.alternates.remove(i);
                true
            }
            None => {
                log::trace!("Release of untracked token {:?} ignored", token);
                false
            }
        };
        self.last_len = self.down.len();
        removed
    }

    /// Forget every held token
    pub fn reset(&mut self) {
        self.down.clear();
        self.alternates.clear();
        self.last_len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_lockstep(state: &DownState) {
        assert_eq!(state.tokens().len(), state.alternates().len());
    }

    #[test]
    fn test_new_is_empty() {
        let state = DownState::new();
        assert!(state.is_empty());
        assert_eq!(state.len(), 0);
        assert_eq!(state.last_len(), 0);
    }

    #[test]
    fn test_add_uses_token_as_default_alternate() {
        let mut state = DownState::new();
        assert!(state.add("a", None));
        assert_eq!(state.tokens(), &["a".to_string()]);
        assert_eq!(state.alternates(), &["a".to_string()]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut state = DownState::new();
        state.add("ControlLeft", Some("ControlLeft"));
        let before = (state.tokens().to_vec(), state.alternates().to_vec());
        assert!(!state.add("ControlLeft", Some("ControlLeft")));
        assert_eq!(before, (state.tokens().to_vec(), state.alternates().to_vec()));
    }

    #[test]
    fn test_add_rejects_known_alternate() {
        let mut state = DownState::new();
        state.add("@", Some("2"));
        assert!(!state.add("2", None));
        assert!(!state.add("x", Some("2")));
        assert_eq!(state.len(), 1);
        assert_lockstep(&state);
    }

    #[test]
    fn test_preserves_press_order() {
        let mut state = DownState::new();
        state.add("b", None);
        state.add("ControlLeft", None);
        state.add("a", None);
        assert_eq!(state.tokens(), &["b", "ControlLeft", "a"]);
    }

    #[test]
    fn test_remove_by_alternate() {
        let mut state = DownState::new();
        state.add("ShiftLeft", Some("ShiftLeft"));
        state.add("@", Some("2"));
        assert!(state.remove("2"));
        assert_eq!(state.tokens(), &["ShiftLeft"]);
        assert_eq!(state.alternates(), &["ShiftLeft"]);
    }

    #[test]
    fn test_remove_upper_case_alternate() {
        let mut state = DownState::new();
        state.add("A", Some("A"));
        assert!(state.remove("a"));
        assert!(state.is_empty());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut state = DownState::new();
        state.add("a", None);
        assert!(!state.remove("z"));
        assert_eq!(state.len(), 1);
        assert_eq!(state.last_len(), 1);
    }

    #[test]
    fn test_completes_combo_tracking() {
        let mut state = DownState::new();
        state.add("ControlLeft", None);
        state.add("s", None);
        assert!(state.completes_combo());
        state.remove("s");
        assert_eq!(state.last_len(), 1);
        // Releasing ctrl afterwards does not complete another combo
        assert!(!state.completes_combo());
    }

    #[test]
    fn test_lockstep_over_mixed_operations() {
        let mut state = DownState::new();
        let ops: &[(&str, bool, Option<&str>)] = &[
            ("a", true, None),
            ("ShiftLeft", true, Some("ShiftLeft")),
            ("@", true, Some("2")),
            ("a", true, None),
            ("2", false, None),
            ("missing", false, None),
            ("q", true, Some("Q")),
            ("ShiftLeft", false, None),
            ("a", false, None),
            ("q", false, None),
        ];
        for (token, down, alt) in ops {
            if *down {
                state.add(token, *alt);
            } else {
                state.remove(token);
            }
            assert_lockstep(&state);
        }
        assert!(state.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut state = DownState::new();
        state.add("a", None);
        state.add("b", None);
        state.remove("b");
        state.reset();
        assert!(state.is_empty());
        assert!(state.alternates().is_empty());
        assert_eq!(state.last_len(), 0);
    }
}
