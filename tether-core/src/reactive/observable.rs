//! Observable Cell
//!
//! An [`Observable`] is the fundamental reactive primitive. It holds a value
//! and the callbacks of everything that depends on it.
//!
//! # How Observables Work
//!
//! 1. When an observable is read within a reactive context (memo/effect), it
//!    subscribes that context. A context holds at most one edge per cell.
//!
//! 2. When the value changes, every subscriber is called with
//!    `(new, old)`. Subscribers are called in insertion order over a snapshot
//!    taken at write time, so callbacks may subscribe or unsubscribe freely.
//!
//! 3. Writing a value that is [`SameValue`] as the current one is a no-op.
//!
//! # Change detection
//!
//! Change detection is identity based: primitives compare by value, shared
//! handles compare by allocation. Replacing a value with a structurally equal
//! but newly allocated one always notifies. This is intended; deep equality
//! would change when dependents re-run.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::boundary::panic_message;
use super::context::ReactiveContext;
use super::subscriber::{SourceId, Subscription};

/// Identity-style equality used for change detection.
pub trait SameValue {
    /// Whether writing `other` over `self` should be treated as "no change".
    fn same_value(&self, other: &Self) -> bool;
}

macro_rules! same_value_by_eq {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SameValue for $ty {
                fn same_value(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

same_value_by_eq!(
    (), bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, &'static str,
);

impl<T: ?Sized> SameValue for Rc<T> {
    fn same_value(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: SameValue> SameValue for Option<T> {
    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same_value(b),
            (None, None) => true,
            _ => false,
        }
    }
}

type Callback<T> = Rc<dyn Fn(&T, &T)>;

struct ObservableInner<T> {
    id: SourceId,
    value: RefCell<T>,
    subscribers: RefCell<IndexMap<u64, Callback<T>>>,
    next_key: Cell<u64>,
}

/// A reactive cell holding a value of type `T`.
///
/// Cloning an `Observable` creates a new handle to the same cell.
///
/// # Example
///
/// ```rust,ignore
/// let count = Observable::new(0);
///
/// // Read the value
/// let value = count.get();
///
/// // Update the value (notifies subscribers)
/// count.set(5);
/// ```
pub struct Observable<T> {
    inner: Rc<ObservableInner<T>>,
}

impl<T> Observable<T>
where
    T: Clone + SameValue + 'static,
{
    /// Create a new cell with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                id: SourceId::new(),
                value: RefCell::new(value),
                subscribers: RefCell::new(IndexMap::new()),
                next_key: Cell::new(0),
            }),
        }
    }

    /// Get the cell's unique ID.
    pub fn id(&self) -> SourceId {
        self.inner.id
    }

    /// Get the current value.
    ///
    /// If called within a reactive context, this also registers the
    /// current computation as a subscriber.
    pub fn get(&self) -> T {
        self.track();
        self.get_untracked()
    }

    /// Get the current value without tracking dependencies.
    pub fn get_untracked(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value (tracked) without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&self.inner.value.borrow())
    }

    /// Borrow the current value without tracking.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Register the active computation, if any, as a dependent.
    pub fn track(&self) {
        let Some(tracker) = ReactiveContext::current() else {
            return;
        };
        if tracker.has_source(self.inner.id) {
            return;
        }

        let weak = Rc::downgrade(&tracker);
        let subscription = self.subscribe(move |_, _| {
            if let Some(tracker) = weak.upgrade() {
                tracker.notify();
            }
        });

        tracing::trace!(
            cell_id = %self.inner.id,
            subscriber = %tracker.subscriber_id(),
            "tracked read"
        );
        tracker.add_source(self.inner.id, subscription);
    }

    /// Set a new value and notify subscribers.
    ///
    /// Returns `false` (and notifies nobody) when `value` is the same as the
    /// stored value.
    pub fn set(&self, value: T) -> bool {
        let old = {
            let mut slot = self.inner.value.borrow_mut();
            if slot.same_value(&value) {
                return false;
            }
            std::mem::replace(&mut *slot, value.clone())
        };

        self.notify_subscribers(&value, &old);
        true
    }

    /// Update the value using a function of the current value.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.inner.value.borrow());
        self.set(next)
    }

    /// Register a callback invoked with `(new, old)` after every change.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T, &T) + 'static,
    {
        let key = self.inner.next_key.get();
        self.inner.next_key.set(key + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .insert(key, Rc::new(callback));

        let weak: Weak<ObservableInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.subscribers.borrow_mut().shift_remove(&key);
            }
        })
    }

    /// Notify all subscribers that the value has changed.
    fn notify_subscribers(&self, new: &T, old: &T) {
        let snapshot: Vec<Callback<T>> =
            self.inner.subscribers.borrow().values().cloned().collect();

        for callback in snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| callback(new, old)));
            if let Err(payload) = outcome {
                tracing::error!(
                    cell_id = %self.inner.id,
                    message = %panic_message(payload.as_ref()),
                    "subscriber panicked during notification"
                );
            }
        }
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Whether two handles point at the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Observable<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("id", &self.inner.id)
            .field("value", &self.inner.value.borrow())
            .field("subscriber_count", &self.inner.subscribers.borrow().len())
            .finish()
    }
}
