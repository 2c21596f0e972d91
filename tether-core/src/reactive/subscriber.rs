//! Subscriber and source identities for the reactive system.
//!
//! A subscriber is any computation that depends on reactive values (effects,
//! memos, list reconcilers). A source is anything a subscriber can depend on
//! (observable cells and memo outputs). Edges between the two are represented
//! by [`Subscription`] capabilities held by the subscriber.

use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a subscriber.
///
/// Each subscriber (memo, effect, or other reactive computation) gets a unique
/// ID when created. The scheduler deduplicates pending work by this ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Unique, monotonically increasing identifier for an observable source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    /// Generate a new unique source ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// An unsubscribe capability returned by `subscribe`.
///
/// Calling [`unsubscribe`](Subscription::unsubscribe) more than once is a
/// no-op. Dropping a subscription does *not* unsubscribe; the owner decides
/// when the edge goes away.
pub struct Subscription {
    cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    /// Create a subscription that runs `cancel` the first time it is
    /// unsubscribed.
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            cancel: RefCell::new(Some(Box::new(cancel))),
        }
    }

    /// A subscription that is already cancelled.
    pub fn empty() -> Self {
        Self {
            cancel: RefCell::new(None),
        }
    }

    /// Remove the edge. Idempotent.
    pub fn unsubscribe(&self) {
        let cancel = self.cancel.borrow_mut().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// Whether [`unsubscribe`](Subscription::unsubscribe) has already run.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.borrow().is_none()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
