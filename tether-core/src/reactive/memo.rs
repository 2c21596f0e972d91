//! Memo Implementation
//!
//! A Memo is a cached derived value that re-evaluates only when its
//! dependencies change.
//!
//! # How Memos Work
//!
//! 1. On first access, the memo runs its computation under tracking and
//!    caches the result.
//!
//! 2. When accessed again, if no dependency has changed, it returns the
//!    cached value without calling the computation.
//!
//! 3. When a dependency changes, the memo is marked dirty. Nothing is
//!    recomputed at that point.
//!
//! 4. The next access recomputes. Subscribers of the memo are notified only
//!    if the recomputed value differs from the cached one, so a chain
//!    `a -> b -> c` propagates by change rather than by dirtiness.
//!
//! 5. If the memo itself has subscribers when it becomes dirty, it queues
//!    itself with the scheduler so that the recompute (and any propagation)
//!    happens at the next flush even if nobody reads it first.
//!
//! Memos are read-only projections; there is no setter.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::Rc;

use indexmap::IndexMap;

use super::boundary::ErrorContext;
use super::context::ReactiveContext;
use super::observable::{Observable, SameValue};
use super::runtime::{Reactive, Runtime};
use super::subscriber::{SourceId, SubscriberId, Subscription};

/// Dirty state for a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    /// The cached value is up-to-date.
    Clean,

    /// A dependency changed (or the memo never computed).
    Dirty,

    /// The memo was stopped and keeps its last value forever.
    Stopped,
}

struct MemoInner<T> {
    id: SubscriberId,
    compute: Box<dyn Fn() -> T>,
    output: Observable<Option<T>>,
    runtime: Runtime,
    context: ErrorContext,
    dirty: Cell<bool>,
    active: Cell<bool>,
    edges: RefCell<IndexMap<SourceId, Subscription>>,
    compute_count: Cell<usize>,
}

impl<T> MemoInner<T>
where
    T: Clone + SameValue + 'static,
{
    fn clear_edges(&self) {
        let edges = std::mem::take(&mut *self.edges.borrow_mut());
        for (_, subscription) in edges {
            subscription.unsubscribe();
        }
    }

    fn recompute(self: &Rc<Self>) {
        self.clear_edges();

        let fresh = {
            let _ctx = ReactiveContext::enter(self.clone());
            self.runtime.boundary().guard(&self.context, || (self.compute)())
        };
        self.compute_count.set(self.compute_count.get() + 1);

        // A failed compute keeps the old value and stays dirty.
        if let Some(value) = fresh {
            self.dirty.set(false);
            let changed = self.output.set(Some(value));
            tracing::trace!(memo_id = %self.id, changed, "memo recomputed");
        }
    }

    fn refresh(self: &Rc<Self>) {
        if self.dirty.get() && self.active.get() {
            self.recompute();
        }
    }
}

impl<T> Reactive for MemoInner<T>
where
    T: Clone + SameValue + 'static,
{
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn is_active(&self) -> bool {
        self.active.get()
    }

    fn has_source(&self, source: SourceId) -> bool {
        self.edges.borrow().contains_key(&source)
    }

    fn add_source(&self, source: SourceId, subscription: Subscription) {
        if !self.active.get() {
            subscription.unsubscribe();
            return;
        }
        let previous = self.edges.borrow_mut().insert(source, subscription);
        if let Some(previous) = previous {
            previous.unsubscribe();
        }
    }

    fn notify(self: Rc<Self>) {
        if !self.active.get() {
            return;
        }
        self.dirty.set(true);
        if self.output.subscriber_count() > 0 {
            let scheduler = self.runtime.scheduler().clone();
            scheduler.schedule(self);
        }
    }

    fn run(self: Rc<Self>) {
        self.refresh();
    }
}

impl<T> Drop for MemoInner<T> {
    fn drop(&mut self) {
        for (_, subscription) in std::mem::take(self.edges.get_mut()) {
            subscription.unsubscribe();
        }
    }
}

/// A cached derived value that recomputes only when dependencies change.
///
/// # Type Parameters
///
/// - `T`: The type of the computed value. [`SameValue`] decides whether a
///   recompute produced a change worth propagating.
///
/// Cloning a `Memo` creates a new handle to the same derivation.
pub struct Memo<T> {
    inner: Rc<MemoInner<T>>,
}

impl<T> Memo<T>
where
    T: Clone + SameValue + 'static,
{
    /// Create a new memo with the given computation function.
    ///
    /// The computation is not run immediately. It runs on first access.
    pub fn new<F>(runtime: &Runtime, compute: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        Self::with_context(runtime, ErrorContext::default(), compute)
    }

    /// Like [`Memo::new`], with context reported when the computation fails.
    pub fn with_context<F>(runtime: &Runtime, context: ErrorContext, compute: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        Self {
            inner: Rc::new(MemoInner {
                id: SubscriberId::new(),
                compute: Box::new(compute),
                output: Observable::new(None),
                runtime: runtime.clone(),
                context,
                dirty: Cell::new(true),
                active: Cell::new(true),
                edges: RefCell::new(IndexMap::new()),
                compute_count: Cell::new(0),
            }),
        }
    }

    /// Get the subscriber ID for this memo.
    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    /// Get the source ID other computations track when they read the memo.
    pub fn source_id(&self) -> SourceId {
        self.inner.output.id()
    }

    /// Get the current value, recomputing if necessary.
    ///
    /// Returns `None` only if the computation has never completed.
    pub fn try_get(&self) -> Option<T> {
        self.inner.refresh();
        self.inner.output.get()
    }

    /// Get the cached value without recomputing or tracking.
    pub fn peek(&self) -> Option<T> {
        self.inner.output.get_untracked()
    }

    /// Register a callback invoked when a recompute changes the value.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T, Option<&T>) + 'static,
    {
        self.inner.output.subscribe(move |new, old| {
            if let Some(new) = new {
                callback(new, old.as_ref());
            }
        })
    }

    /// Drop every dependency. The memo keeps its last value and never
    /// recomputes again.
    pub fn stop(&self) {
        if self.inner.active.replace(false) {
            self.inner.clear_edges();
        }
    }

    /// Stop, then publish `last` to current readers as the final value.
    pub(crate) fn retire(&self, last: T) {
        self.stop();
        self.inner.output.set(Some(last));
    }

    /// Get the current state.
    pub fn state(&self) -> MemoState {
        if !self.inner.active.get() {
            MemoState::Stopped
        } else if self.inner.dirty.get() {
            MemoState::Dirty
        } else {
            MemoState::Clean
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    /// Check if the memo has a cached value.
    pub fn has_value(&self) -> bool {
        self.inner.output.with_untracked(Option::is_some)
    }

    /// Number of times the computation has been invoked.
    pub fn compute_count(&self) -> usize {
        self.inner.compute_count.get()
    }

    /// Get the number of dependents.
    pub fn dependent_count(&self) -> usize {
        self.inner.output.subscriber_count()
    }

    /// Get the number of dependencies recorded by the last compute.
    pub fn dependency_count(&self) -> usize {
        self.inner.edges.borrow().len()
    }
}

impl<T> Memo<T>
where
    T: Clone + SameValue + Default + 'static,
{
    /// Get the current value, recomputing if necessary.
    ///
    /// Falls back to `T::default()` if the computation never completed.
    pub fn get(&self) -> T {
        self.try_get().unwrap_or_default()
    }
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Memo<T>
where
    T: Clone + SameValue + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .field("value", &self.peek())
            .field("dependent_count", &self.dependent_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memo_computes_on_first_access() {
        let rt = Runtime::new();
        let memo = rt.memo(|| 42);

        assert!(!memo.has_value());
        assert_eq!(memo.compute_count(), 0);

        assert_eq!(memo.get(), 42);
        assert_eq!(memo.compute_count(), 1);
        assert!(memo.has_value());
    }

    #[test]
    fn memo_caches_value_when_clean() {
        let rt = Runtime::new();
        let memo = rt.memo(|| 42);

        assert_eq!(memo.get(), 42);
        assert_eq!(memo.get(), 42);
        assert_eq!(memo.get(), 42);
        assert_eq!(memo.compute_count(), 1);
    }

    #[test]
    fn memo_recomputes_after_dependency_change() {
        let rt = Runtime::new();
        let base = Observable::new(2);
        let b = base.clone();
        let doubled = rt.memo(move || b.get() * 2);

        assert_eq!(doubled.get(), 4);
        base.set(5);
        assert!(doubled.is_dirty());
        assert_eq!(doubled.compute_count(), 1);

        assert_eq!(doubled.get(), 10);
        assert_eq!(doubled.compute_count(), 2);
    }

    #[test]
    fn memo_state_transitions() {
        let rt = Runtime::new();
        let base = Observable::new(0);
        let b = base.clone();
        let memo = rt.memo(move || b.get());

        assert_eq!(memo.state(), MemoState::Dirty);
        memo.get();
        assert_eq!(memo.state(), MemoState::Clean);
        base.set(1);
        assert_eq!(memo.state(), MemoState::Dirty);
        memo.stop();
        assert_eq!(memo.state(), MemoState::Stopped);
    }

    #[test]
    fn memo_chain_propagates_by_change() {
        let rt = Runtime::new();
        let a = Observable::new(1);

        let a_clone = a.clone();
        let parity = rt.memo(move || a_clone.get() % 2);
        let p = parity.clone();
        let label = rt.memo(move || if p.get() == 0 { "even" } else { "odd" });

        let runs = Rc::new(Cell::new(0));
        let (l, r) = (label.clone(), runs.clone());
        let _effect = rt.effect(move || {
            l.get();
            r.set(r.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        // 1 -> 3 keeps parity: label's consumers never re-run.
        a.set(3);
        rt.flush_sync();
        assert_eq!(runs.get(), 1);
        assert_eq!(label.compute_count(), 1);

        a.set(4);
        rt.flush_sync();
        assert_eq!(runs.get(), 2);
        assert_eq!(label.get(), "even");
    }

    #[test]
    fn memo_read_inside_effect_tracks_both() {
        let rt = Runtime::new();
        let a = Observable::new(1);
        let a_clone = a.clone();
        let squared = rt.memo(move || a_clone.get() * a_clone.get());

        let seen = Rc::new(Cell::new(0));
        let (s, seen_clone) = (squared.clone(), seen.clone());
        let effect = rt.effect(move || seen_clone.set(s.get()));

        assert_eq!(seen.get(), 1);
        assert_eq!(effect.dependency_count(), 1);
        assert_eq!(squared.dependent_count(), 1);

        a.set(3);
        rt.flush_sync();
        assert_eq!(seen.get(), 9);
    }

    #[test]
    fn failed_compute_keeps_previous_value() {
        let rt = Runtime::new();
        rt.boundary().set_handler(|_, _| {});
        let a = Observable::new(1);
        let a_clone = a.clone();
        let memo = rt.memo(move || {
            let v = a_clone.get();
            assert!(v != 0, "zero is not allowed");
            10 / v
        });

        assert_eq!(memo.get(), 10);
        a.set(0);
        assert_eq!(memo.get(), 10);
        assert!(memo.is_dirty());

        a.set(5);
        assert_eq!(memo.get(), 2);
    }

    #[test]
    fn memo_clone_shares_state() {
        let rt = Runtime::new();
        let memo1 = rt.memo(|| 42);
        assert_eq!(memo1.get(), 42);

        let memo2 = memo1.clone();
        assert_eq!(memo1.id(), memo2.id());
        assert!(memo2.has_value());
        assert_eq!(memo2.compute_count(), 1);
    }

    #[test]
    fn dropped_memo_releases_dependencies() {
        let rt = Runtime::new();
        let cell = Observable::new(1);

        let c = cell.clone();
        let memo = rt.memo(move || c.get() * 2);
        assert_eq!(memo.get(), 2);
        assert_eq!(cell.subscriber_count(), 1);

        drop(memo);
        assert_eq!(cell.subscriber_count(), 0);
    }
}
