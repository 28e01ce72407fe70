//! Ordered handler sequences with an explicit cursor.

use std::fmt;

use gearbox_core::Handler;

/// An ordered list of handlers and a cursor into it.
///
/// The cursor starts before the first handler and only moves forward.
/// Once every handler has been handed out the chain is exhausted and
/// [`advance`](HandlerChain::advance) keeps returning `None`.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Handler>,
    next: usize,
}

impl HandlerChain {
    /// Create a chain positioned before its first handler.
    #[must_use]
    pub fn new(handlers: impl IntoIterator<Item = Handler>) -> Self {
        Self {
            handlers: handlers.into_iter().collect(),
            next: 0,
        }
    }

    /// Append a handler to the end of the chain.
    pub fn push(&mut self, handler: Handler) {
        self.handlers.push(handler);
    }

    /// Move the cursor forward and return the handler it now points at.
    ///
    /// Returns `None` without moving the cursor once the chain is exhausted.
    pub fn advance(&mut self) -> Option<Handler> {
        let handler = self.handlers.get(self.next).cloned()?;
        self.next += 1;
        Some(handler)
    }

    /// Number of handlers started so far.
    ///
    /// Never exceeds [`len`](HandlerChain::len): calls to `advance` past the
    /// end leave it unchanged.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.next
    }

    /// Returns true once every handler has been started.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.next >= self.handlers.len()
    }

    /// Put the cursor back before the first handler.
    pub fn reset(&mut self) {
        self.next = 0;
    }

    /// Number of handlers in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if the chain has no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl FromIterator<Handler> for HandlerChain {
    fn from_iter<I: IntoIterator<Item = Handler>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("len", &self.handlers.len())
            .field("cursor", &self.next)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearbox_core::handler;

    fn noop() -> Handler {
        handler(|_ctx| {})
    }

    #[test]
    fn starts_before_first_handler() {
        let chain = HandlerChain::new([noop(), noop()]);
        assert_eq!(chain.cursor(), 0);
        assert!(!chain.is_exhausted());
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn advance_is_monotonic_and_stops_at_end() {
        let mut chain = HandlerChain::new([noop(), noop()]);
        assert!(chain.advance().is_some());
        assert!(chain.advance().is_some());
        assert!(chain.is_exhausted());
        assert!(chain.advance().is_none());
        assert!(chain.advance().is_none());
        assert_eq!(chain.cursor(), 2);
    }

    #[test]
    fn cursor_stays_at_len_after_extra_advances() {
        let mut chain = HandlerChain::new([noop()]);
        for _ in 0..5 {
            chain.advance();
        }
        assert_eq!(chain.cursor(), chain.len());
    }

    #[test]
    fn empty_chain_is_exhausted() {
        let mut chain = HandlerChain::default();
        assert!(chain.is_empty());
        assert!(chain.is_exhausted());
        assert!(chain.advance().is_none());
        assert_eq!(chain.cursor(), 0);
    }

    #[test]
    fn reset_rewinds() {
        let mut chain: HandlerChain = [noop()].into_iter().collect();
        chain.advance();
        chain.reset();
        assert_eq!(chain.cursor(), 0);
        assert!(chain.advance().is_some());
    }

    #[test]
    fn debug_shows_position() {
        let mut chain = HandlerChain::new([noop()]);
        chain.push(noop());
        chain.advance();
        assert_eq!(format!("{chain:?}"), "HandlerChain { len: 2, cursor: 1 }");
    }
}
