// Keychord Router Scope
// Nested name prefixes applied to subscriptions and triggers

/// Stack of scope names, rendered as `foo.bar:`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    stack: Vec<String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str) {
        self.stack.push(name.to_string());
    }

    /// Drop the innermost scope; popping an empty scope does nothing
    pub fn pop(&mut self) -> Option<String> {
        self.stack.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The prefix prepended to event names (`""`, `"foo:"`, `"foo.bar:"`)
    pub fn prefix(&self) -> String {
        if self.stack.is_empty() {
            String::new()
        } else {
            format!("{}:", self.stack.join("."))
        }
    }

    /// `name` with the current prefix
    pub fn apply(&self, name: &str) -> String {
        let mut scoped = self.prefix();
        scoped.push_str(name);
        scoped
    }
}
