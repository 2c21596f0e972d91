//! Reactive Primitives
//!
//! This module implements the core reactive system: observable cells, memos,
//! effects and the batch scheduler that paces them.
//!
//! # Concepts
//!
//! ## Observables
//!
//! An [`Observable`] is a container for mutable state. When it is read within
//! a tracking context (a memo or effect), it registers that context as a
//! dependent. When its value changes, all dependents are notified.
//!
//! ## Memos
//!
//! A [`Memo`] is a derived value that caches its result. It re-evaluates only
//! when one of its dependencies changed and someone reads it, and it notifies
//! its own dependents only if the new value differs.
//!
//! ## Effects
//!
//! An [`Effect`] is a side-effecting computation that re-runs whenever its
//! dependencies change. Re-runs are batched by the [`Scheduler`]: any number
//! of writes before a flush produce at most one re-run.
//!
//! # Implementation Notes
//!
//! Tracking uses a thread-local context stack with guard-based push/pop
//! ([`ReactiveContext`]). Everything else lives in an explicit [`Runtime`]
//! instance. All types are single-threaded.

mod boundary;
mod context;
mod effect;
mod memo;
mod observable;
mod runtime;
mod scheduler;
mod subscriber;

pub use boundary::{ErrorBoundary, ErrorContext};
pub use context::{track, untrack, ReactiveContext};
pub use effect::Effect;
pub use memo::{Memo, MemoState};
pub use observable::{Observable, SameValue};
pub use runtime::{Reactive, Runtime};
pub use scheduler::{FrameSource, ManualFrames, Scheduler};
pub use subscriber::{SourceId, SubscriberId, Subscription};

