//! Effect Implementation
//!
//! An Effect is a side-effecting computation that re-runs whenever its
//! dependencies change.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its body immediately to establish
//!    initial dependencies.
//!
//! 2. When any dependency changes, the effect is handed to the scheduler and
//!    re-runs at the next flush. It never re-enters itself synchronously.
//!
//! 3. Before re-running, the effect drops every edge and tracks new ones
//!    during execution, so a dependency that is no longer read is released.
//!
//! # Failure
//!
//! The body runs inside the runtime's error boundary. A panic is reported and
//! the effect stays active; edges read before the panic are kept.
//!
//! # Lifecycle
//!
//! Active until [`Effect::stop`]. Stopping is terminal and idempotent.
//! The runtime owns every live effect, so dropping the last [`Effect`]
//! handle does not end the computation; only `stop` (or dropping the runtime
//! itself) does.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::boundary::{ErrorBoundary, ErrorContext};
use super::context::ReactiveContext;
use super::runtime::{Reactive, Runtime};
use super::scheduler::Scheduler;
use super::subscriber::{SourceId, SubscriberId, Subscription};

/// Live effects of one runtime, keyed by id. An entry is removed on stop.
pub(crate) type EffectRegistry = RefCell<IndexMap<SubscriberId, Rc<EffectInner>>>;

pub(crate) struct EffectInner {
    id: SubscriberId,
    body: Box<dyn Fn()>,
    scheduler: Rc<Scheduler>,
    boundary: Rc<ErrorBoundary>,
    owner: Weak<EffectRegistry>,
    context: ErrorContext,
    active: Cell<bool>,
    scheduled: Cell<bool>,
    edges: RefCell<IndexMap<SourceId, Subscription>>,
    run_count: Cell<usize>,
}

impl EffectInner {
    fn clear_edges(&self) {
        let edges = std::mem::take(&mut *self.edges.borrow_mut());
        for (_, subscription) in edges {
            subscription.unsubscribe();
        }
    }

    fn release(&self) {
        if let Some(owner) = self.owner.upgrade() {
            let entry = owner.borrow_mut().shift_remove(&self.id);
            drop(entry);
        }
    }

    fn execute(self: &Rc<Self>) {
        if !self.active.get() {
            return;
        }
        self.scheduled.set(false);
        self.clear_edges();

        {
            let _ctx = ReactiveContext::enter(self.clone());
            self.boundary.guard(&self.context, || (self.body)());
        }

        self.run_count.set(self.run_count.get() + 1);
        tracing::trace!(
            effect_id = %self.id,
            dependencies = self.edges.borrow().len(),
            "effect ran"
        );
    }
}

impl Reactive for EffectInner {
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
        self.scheduled.set(true);
        let scheduler = self.scheduler.clone();
        scheduler.schedule(self);
    }

    fn run(self: Rc<Self>) {
        // Cleared when an explicit run already consumed this re-run.
        if self.scheduled.get() {
            self.execute();
        }
    }
}

impl Drop for EffectInner {
    fn drop(&mut self) {
        for (_, subscription) in std::mem::take(self.edges.get_mut()) {
            subscription.unsubscribe();
        }
    }
}

/// A side-effecting computation that runs when dependencies change.
///
/// Cloning an `Effect` creates a new handle to the same computation.
///
/// # Example
///
/// ```rust,ignore
/// let count = Observable::new(0);
///
/// let effect = runtime.effect(move || {
///     println!("Count is: {}", count.get());
/// });
///
/// count.set(5);
/// runtime.flush_sync(); // Prints: "Count is: 5"
/// ```
#[derive(Clone)]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    /// Create an effect and run it once to establish its dependencies.
    pub fn new<F>(runtime: &Runtime, body: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self::with_context(runtime, ErrorContext::default(), body)
    }

    /// Like [`Effect::new`], with context reported to the error boundary
    /// when the body fails.
    pub fn with_context<F>(runtime: &Runtime, context: ErrorContext, body: F) -> Self
    where
        F: Fn() + 'static,
    {
        let effect = Self::new_lazy(runtime, context, body);
        effect.inner.execute();
        effect
    }

    /// Create an effect without running it. It has no dependencies until
    /// [`Effect::run`] is called.
    pub fn new_lazy<F>(runtime: &Runtime, context: ErrorContext, body: F) -> Self
    where
        F: Fn() + 'static,
    {
        let inner = Rc::new(EffectInner {
            id: SubscriberId::new(),
            body: Box::new(body),
            scheduler: runtime.scheduler().clone(),
            boundary: runtime.boundary().clone(),
            owner: Rc::downgrade(runtime.effects()),
            context,
            active: Cell::new(true),
            scheduled: Cell::new(false),
            edges: RefCell::new(IndexMap::new()),
            run_count: Cell::new(0),
        });
        runtime
            .effects()
            .borrow_mut()
            .insert(inner.id, inner.clone());
        Self { inner }
    }

    /// Get the subscriber ID for this effect.
    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    /// Re-run the body now, rebuilding dependencies. No-op once stopped.
    pub fn run(&self) {
        self.inner.execute();
    }

    /// Queue the effect for the next flush, as if a dependency changed.
    pub fn schedule(&self) {
        self.inner.clone().notify();
    }

    /// Unsubscribe from every dependency and deactivate. Idempotent.
    pub fn stop(&self) {
        if self.inner.active.replace(false) {
            self.inner.clear_edges();
            self.inner.release();
            tracing::trace!(effect_id = %self.inner.id, "effect stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    /// Whether a re-run is waiting for the next flush.
    pub fn is_scheduled(&self) -> bool {
        self.inner.scheduled.get() && self.inner.active.get()
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.get()
    }

    /// Get the number of dependencies recorded by the last run.
    pub fn dependency_count(&self) -> usize {
        self.inner.edges.borrow().len()
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.inner.id)
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("active", &self.is_active())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
