// Keychord Subscriptions
// Callbacks registered against an event name

use std::fmt;
use std::sync::Arc;

use crate::event::{Context, Event, Response};

type CallbackFn = dyn Fn(&Event<'_>) -> anyhow::Result<Response> + Send + Sync;

/// A shareable subscriber callback
///
/// Clones share identity: `off` with a clone removes the original.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    /// Wrap a closure returning anything convertible into a [`Response`]
    /// (`()`, `bool` or `Response` itself)
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Event<'_>) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Into<Response>,
    {
        Callback(Arc::new(move |event: &Event<'_>| f(event).map(Into::into)))
    }

    pub fn call(&self, event: &Event<'_>) -> anyhow::Result<Response> {
        (self.0)(event)
    }

    /// Identity comparison
    pub fn same(&self, other: &Callback) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const (),
            Arc::as_ptr(&other.0) as *const (),
        )
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

/// One registration of a callback
#[derive(Debug, Clone)]
pub struct Subscription {
    pub callback: Callback,
    pub context: Context,
    /// Invocations left; `None` is unbounded
    pub remaining: Option<u32>,
}

impl Subscription {
    pub fn new(callback: Callback, context: Context, remaining: Option<u32>) -> Self {
        Self {
            callback,
            context,
            remaining,
        }
    }

    /// Count one invocation; returns true when the subscription is used up
    pub fn consume(&mut self) -> bool {
        match self.remaining.as_mut() {
            Some(left) => {
                *left = left.saturating_sub(1);
                *left == 0
            }
            None => false,
        }
    }

    /// Whether an `off` call with these filters removes this subscription
    ///
    /// A callback matches by identity, a context by value; with neither,
    /// everything matches.
    pub fn matches(&self, callback: Option<&Callback>, context: Option<&Context>) -> bool {
        let callback_ok = callback.map_or(true, |cb| cb.same(&self.callback));
        let context_ok = context.map_or(true, |ctx| *ctx == self.context);
        callback_ok && context_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Callback {
        Callback::new(|_| Ok(()))
    }

    #[test]
    fn test_callback_identity() {
        let a = noop();
        let b = noop();
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
    }

    #[test]
    fn test_consume_counts_down() {
        let mut sub = Subscription::new(noop(), Context::new(), Some(2));
        assert!(!sub.consume());
        assert!(sub.consume());

        let mut unbounded = Subscription::new(noop(), Context::new(), None);
        for _ in 0..10 {
            assert!(!unbounded.consume());
        }
    }

    #[test]
    fn test_matches() {
        let cb = noop();
        let ctx = Context::new().with("id", "1");
        let sub = Subscription::new(cb.clone(), ctx.clone(), None);
        assert!(sub.matches(None, None));
        assert!(sub.matches(Some(&cb), None));
        assert!(sub.matches(Some(&cb), Some(&ctx)));
        assert!(sub.matches(None, Some(&Context::new().with("id", "1"))));
        assert!(!sub.matches(Some(&noop()), None));
        assert!(!sub.matches(Some(&cb), Some(&Context::new())));
    }
}
