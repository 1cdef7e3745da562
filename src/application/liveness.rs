//! Liveness of a view and the generation of its latest request.
//!
//! Every asynchronous continuation holds a [`Ticket`] and checks it before
//! touching shared state. A ticket goes stale when the view is torn down or
//! when a newer ticket is issued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug)]
struct Inner {
    alive: AtomicBool,
    generation: AtomicU64,
}

/// Owned by a view controller; clones observe the same view.
#[derive(Debug, Clone)]
pub struct Liveness {
    inner: Arc<Inner>,
}

impl Liveness {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                alive: AtomicBool::new(true),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.alive.load(Ordering::SeqCst)
    }

    /// Mark the view torn down. Returns `true` only for the call that
    /// performed the transition; later calls are no-ops.
    pub fn teardown(&self) -> bool {
        let was_alive = self.inner.alive.swap(false, Ordering::SeqCst);
        if was_alive {
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
        }
        was_alive
    }

    /// Start a new generation, superseding every earlier ticket.
    pub fn issue(&self) -> Ticket {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            inner: Arc::clone(&self.inner),
            generation,
        }
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct Ticket {
    inner: Arc<Inner>,
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` while the view is alive and no newer ticket exists.
    pub fn is_current(&self) -> bool {
        self.inner.alive.load(Ordering::SeqCst)
            && self.inner.generation.load(Ordering::SeqCst) == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teardown_happens_once() {
        let liveness = Liveness::new();
        assert!(liveness.is_alive());

        assert!(liveness.teardown());
        assert!(!liveness.is_alive());
        assert!(!liveness.teardown());
        assert!(!liveness.is_alive());
    }

    #[test]
    fn newer_ticket_supersedes_older() {
        let liveness = Liveness::new();
        let first = liveness.issue();
        assert!(first.is_current());

        let second = liveness.issue();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(second.generation() > first.generation());
    }

    #[test]
    fn teardown_stales_outstanding_tickets() {
        let liveness = Liveness::new();
        let ticket = liveness.issue();
        liveness.clone().teardown();
        assert!(!ticket.is_current());
    }

    #[test]
    fn tickets_issued_after_teardown_are_never_current() {
        let liveness = Liveness::new();
        liveness.teardown();
        assert!(!liveness.issue().is_current());
    }
}
