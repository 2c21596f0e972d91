//! Reactive Context
//!
//! The reactive context tracks which computation is currently running.
//! This enables automatic dependency tracking: when a cell is read, it can
//! register the current computation as a dependent.
//!
//! # Implementation
//!
//! We use a thread-local stack to track the currently executing computation.
//! Entering a context pushes the computation and returns a guard; dropping the
//! guard pops it. Because restoration happens in `Drop`, the stack stays
//! balanced even when a computation body panics.
//!
//! Nested contexts are supported (a memo read inside an effect pushes the memo
//! on top of the effect and pops back to it when done). An entry may also be
//! empty, which is how [`untrack`] suspends tracking for a region.

use std::cell::RefCell;
use std::rc::Rc;

use super::runtime::Reactive;
use super::subscriber::SubscriberId;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Option<Rc<dyn Reactive>>>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops the context when dropped.
///
/// This ensures the context stack is properly maintained even if
/// the computation panics.
pub struct ReactiveContext {
    subscriber_id: Option<SubscriberId>,
}

impl ReactiveContext {
    /// Enter a new reactive context for the given computation.
    ///
    /// While this context is active, any cells that are read will
    /// register the computation as a dependent.
    pub fn enter(tracker: Rc<dyn Reactive>) -> Self {
        let subscriber_id = Some(tracker.subscriber_id());
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(Some(tracker)));
        Self { subscriber_id }
    }

    /// Enter a context in which reads are not tracked.
    pub fn suspend() -> Self {
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(None));
        Self {
            subscriber_id: None,
        }
    }

    /// Check if a tracking computation is currently running.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| matches!(stack.borrow().last(), Some(Some(_))))
    }

    /// The computation reads should be attributed to, if any.
    pub fn current() -> Option<Rc<dyn Reactive>> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().cloned().flatten())
    }

    /// Get the current subscriber ID, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .and_then(|entry| entry.as_ref().map(|t| t.subscriber_id()))
        })
    }

    /// Nesting depth of the context stack.
    pub fn depth() -> usize {
        CONTEXT_STACK.with(|stack| stack.borrow().len())
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.as_ref().map(|t| t.subscriber_id()),
                    self.subscriber_id,
                    "ReactiveContext mismatch"
                );
            }
        });
    }
}

/// Run `body` with `tracker` as the active computation.
///
/// The previous computation is restored afterwards, including when `body`
/// unwinds.
pub fn track<R>(tracker: Rc<dyn Reactive>, body: impl FnOnce() -> R) -> R {
    let _ctx = ReactiveContext::enter(tracker);
    body()
}

/// Run `body` without attributing any reads to the active computation.
pub fn untrack<R>(body: impl FnOnce() -> R) -> R {
    let _ctx = ReactiveContext::suspend();
    body()
}
