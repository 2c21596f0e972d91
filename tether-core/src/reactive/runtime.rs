//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects cells, memos, and
//! effects. It owns the batch scheduler, the error boundary and the
//! configuration for one engine instance.
//!
//! # How It Works
//!
//! 1. A cell read inside a running computation subscribes that computation
//!    (see [`ReactiveContext`](super::ReactiveContext)).
//!
//! 2. When the cell's value changes, the subscriber is notified:
//!    a. Effects mark themselves scheduled and queue with the scheduler
//!    b. Memos mark themselves dirty; they recompute on next access
//!
//! 3. At the next frame the scheduler runs every queued computation once.
//!
//! # Instances
//!
//! There is no process-wide runtime. Each [`Runtime`] is an independent
//! engine; computations remember the runtime that created them, and the
//! runtime owns its effects until they are stopped. Runtimes are
//! single-threaded (`!Send`); clone the handle to share it.

use std::fmt;
use std::rc::Rc;

use tokio::sync::oneshot;

use super::boundary::ErrorBoundary;
use super::effect::{Effect, EffectRegistry};
use super::memo::Memo;
use super::observable::SameValue;
use super::scheduler::{FrameSource, ManualFrames, Scheduler};
use super::subscriber::{SourceId, SubscriberId, Subscription};
use crate::config::RuntimeConfig;

/// A computation that can depend on reactive sources.
pub trait Reactive {
    /// Get the subscriber ID for this computation.
    fn subscriber_id(&self) -> SubscriberId;

    /// Stopped computations ignore notifications and are skipped at flush.
    fn is_active(&self) -> bool;

    /// Whether an edge to `source` was recorded during the current run.
    fn has_source(&self, source: SourceId) -> bool;

    /// Record an edge to `source`, held as its unsubscribe capability.
    fn add_source(&self, source: SourceId, subscription: Subscription);

    /// A dependency changed.
    fn notify(self: Rc<Self>);

    /// Re-run at flush time.
    fn run(self: Rc<Self>);
}

struct RuntimeInner {
    config: RuntimeConfig,
    scheduler: Rc<Scheduler>,
    boundary: Rc<ErrorBoundary>,
    frames: Rc<dyn FrameSource>,
    effects: Rc<EffectRegistry>,
}

/// Handle to one engine instance.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    /// A runtime with default configuration driven by [`ManualFrames`].
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// A runtime with the given configuration driven by [`ManualFrames`].
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::with_frame_source(config, Rc::new(ManualFrames::new()))
    }

    /// A runtime whose flushes are paced by the host's frame source.
    pub fn with_frame_source(config: RuntimeConfig, frames: Rc<dyn FrameSource>) -> Self {
        let scheduler = Scheduler::new(frames.clone(), config.max_flush_passes);
        tracing::debug!(runtime = %config.name, "runtime created");
        Self {
            inner: Rc::new(RuntimeInner {
                config,
                scheduler,
                boundary: Rc::new(ErrorBoundary::new()),
                frames,
                effects: Rc::new(EffectRegistry::default()),
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn scheduler(&self) -> &Rc<Scheduler> {
        &self.inner.scheduler
    }

    pub fn boundary(&self) -> &Rc<ErrorBoundary> {
        &self.inner.boundary
    }

    pub fn frame_source(&self) -> &Rc<dyn FrameSource> {
        &self.inner.frames
    }

    pub(crate) fn effects(&self) -> &Rc<EffectRegistry> {
        &self.inner.effects
    }

    /// Number of effects that have not been stopped.
    pub fn effect_count(&self) -> usize {
        self.inner.effects.borrow().len()
    }

    /// Create an effect owned by this runtime. It runs once immediately.
    ///
    /// The runtime keeps the effect alive until [`Effect::stop`]; the
    /// returned handle may be dropped.
    pub fn effect<F>(&self, body: F) -> Effect
    where
        F: Fn() + 'static,
    {
        Effect::new(self, body)
    }

    /// Create a memo owned by this runtime. It computes on first read.
    pub fn memo<T, F>(&self, compute: F) -> Memo<T>
    where
        T: Clone + SameValue + 'static,
        F: Fn() -> T + 'static,
    {
        Memo::new(self, compute)
    }

    /// Run all pending work now, before returning.
    pub fn flush_sync(&self) {
        self.inner.scheduler.flush_sync();
    }

    /// A one-shot signal completed when the next flush finishes.
    pub fn after_flush(&self) -> oneshot::Receiver<()> {
        self.inner.scheduler.after_flush()
    }

    /// Whether two handles refer to the same runtime.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("name", &self.inner.config.name)
            .field("scheduler", &self.inner.scheduler)
            .field("effects", &self.effect_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Observable;
    use std::cell::Cell;

    #[test]
    fn runtimes_are_independent() {
        let a = Runtime::new();
        let b = Runtime::new();
        let cell = Observable::new(0);
        let runs = Rc::new(Cell::new(0));

        let cell_clone = cell.clone();
        let runs_clone = runs.clone();
        let _effect = b.effect(move || {
            cell_clone.get();
            runs_clone.set(runs_clone.get() + 1);
        });

        cell.set(1);
        assert_eq!(a.scheduler().pending_count(), 0);
        assert_eq!(b.scheduler().pending_count(), 1);

        a.flush_sync();
        assert_eq!(runs.get(), 1);
        b.flush_sync();
        assert_eq!(runs.get(), 2);
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn custom_frame_source_paces_flushes() {
        let frames = Rc::new(ManualFrames::new());
        let rt = Runtime::with_frame_source(RuntimeConfig::default(), frames.clone());
        let cell = Observable::new(0);
        let seen = Rc::new(Cell::new(-1));

        let cell_clone = cell.clone();
        let seen_clone = seen.clone();
        let _effect = rt.effect(move || seen_clone.set(cell_clone.get()));

        cell.set(5);
        assert_eq!(seen.get(), 0);
        assert_eq!(frames.pending_frames(), 1);

        frames.tick();
        assert_eq!(seen.get(), 5);
    }
}
