//! Batch Scheduler
//!
//! The scheduler coalesces re-runs of computations so that each one runs at
//! most once per render frame, no matter how many of its dependencies were
//! written in between.
//!
//! # Algorithm
//!
//! 1. A cell write notifies its subscribers; each computation hands itself to
//!    [`Scheduler::schedule`]. The pending set is insertion ordered and
//!    deduplicated by [`SubscriberId`].
//! 2. The first schedule after a flush requests exactly one frame from the
//!    [`FrameSource`].
//! 3. At frame time [`Scheduler::flush`] snapshots and clears the pending set,
//!    then runs every still-active entry in insertion order.
//! 4. Runs may schedule further work. That work is not executed recursively;
//!    another frame is requested instead, which bounds stack depth for long
//!    dependency chains.
//!
//! Stopped computations are not removed eagerly; they are skipped at flush
//! time.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tokio::sync::oneshot;

use super::runtime::Reactive;
use super::subscriber::SubscriberId;

/// The host's render-frame cadence.
///
/// The scheduler calls [`request_frame`](FrameSource::request_frame) at most
/// once per batch; the host invokes the callback when the frame arrives.
pub trait FrameSource {
    fn request_frame(&self, callback: Box<dyn FnOnce()>);
}

/// A frame source driven by hand: callbacks queue up until [`tick`] runs
/// them. This is the default for headless runtimes and tests.
///
/// [`tick`]: ManualFrames::tick
#[derive(Default)]
pub struct ManualFrames {
    queue: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every frame callback requested so far. Callbacks requested while
    /// ticking wait for the next tick. Returns the number of callbacks run.
    pub fn tick(&self) -> usize {
        let batch: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        let count = batch.len();
        for callback in batch {
            callback();
        }
        count
    }

    /// Number of frames requested and not yet delivered.
    pub fn pending_frames(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl FrameSource for ManualFrames {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push_back(callback);
    }
}

impl fmt::Debug for ManualFrames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualFrames")
            .field("pending_frames", &self.pending_frames())
            .finish()
    }
}

/// Resets the flushing flag even if a pass unwinds.
struct FlushGuard<'a>(&'a Cell<bool>);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Deduplicating, frame-driven queue of computations awaiting a re-run.
pub struct Scheduler {
    pending: RefCell<IndexMap<SubscriberId, Rc<dyn Reactive>>>,
    is_scheduled: Cell<bool>,
    is_flushing: Cell<bool>,
    frames: Rc<dyn FrameSource>,
    waiters: RefCell<Vec<oneshot::Sender<()>>>,
    max_flush_passes: usize,
    this: Weak<Scheduler>,
}

impl Scheduler {
    /// Create a scheduler that requests frames from `frames`.
    pub fn new(frames: Rc<dyn FrameSource>, max_flush_passes: usize) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            pending: RefCell::new(IndexMap::new()),
            is_scheduled: Cell::new(false),
            is_flushing: Cell::new(false),
            frames,
            waiters: RefCell::new(Vec::new()),
            max_flush_passes: max_flush_passes.max(1),
            this: this.clone(),
        })
    }

    /// Queue `reactive` for the next flush.
    pub fn schedule(&self, reactive: Rc<dyn Reactive>) {
        let id = reactive.subscriber_id();
        self.pending.borrow_mut().entry(id).or_insert(reactive);

        if !self.is_scheduled.get() && !self.is_flushing.get() {
            self.request_frame();
        }
    }

    fn request_frame(&self) {
        self.is_scheduled.set(true);
        let this = self.this.clone();
        tracing::trace!(pending = self.pending_count(), "requesting frame");
        self.frames.request_frame(Box::new(move || {
            if let Some(scheduler) = this.upgrade() {
                scheduler.flush();
            }
        }));
    }

    /// Run one batch. A no-op if a flush is already in progress.
    ///
    /// Work scheduled during the batch is deferred to another frame.
    pub fn flush(&self) {
        if self.is_flushing.get() {
            return;
        }
        self.is_scheduled.set(false);

        let ran = self.run_pass();
        tracing::debug!(ran, pending = self.pending_count(), "flushed batch");

        if !self.pending.borrow().is_empty() && !self.is_scheduled.get() {
            self.request_frame();
        }
        self.wake_waiters();
    }

    /// Flush immediately, running consecutive passes until nothing is
    /// pending or the configured pass limit is reached.
    pub fn flush_sync(&self) {
        if self.is_flushing.get() {
            tracing::debug!("flush_sync called during a flush; ignored");
            return;
        }

        let mut passes = 0;
        while !self.pending.borrow().is_empty() {
            if passes >= self.max_flush_passes {
                tracing::error!(
                    passes,
                    pending = self.pending_count(),
                    "flush did not converge; deferring remaining work to the next frame"
                );
                if !self.is_scheduled.get() {
                    self.request_frame();
                }
                break;
            }
            self.run_pass();
            passes += 1;
        }

        tracing::debug!(passes, "synchronous flush complete");
        self.wake_waiters();
    }

    /// Snapshot, clear, and run the pending set. Returns how many entries ran.
    fn run_pass(&self) -> usize {
        self.is_flushing.set(true);
        let _guard = FlushGuard(&self.is_flushing);

        let batch: Vec<Rc<dyn Reactive>> = std::mem::take(&mut *self.pending.borrow_mut())
            .into_values()
            .collect();

        let mut ran = 0;
        for reactive in batch {
            if reactive.is_active() {
                reactive.run();
                ran += 1;
            }
        }
        ran
    }

    /// A one-shot signal completed at the end of the next flush.
    pub fn after_flush(&self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.waiters.borrow_mut().push(tx);
        rx
    }

    fn wake_waiters(&self) {
        let waiters = std::mem::take(&mut *self.waiters.borrow_mut());
        for waiter in waiters {
            // The receiver may have been dropped; nobody is listening then.
            let _ = waiter.send(());
        }
    }

    /// Number of computations waiting for the next flush.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Whether a frame has been requested and not yet delivered.
    pub fn is_scheduled(&self) -> bool {
        self.is_scheduled.get()
    }

    /// Whether a batch is currently running.
    pub fn is_flushing(&self) -> bool {
        self.is_flushing.get()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending_count())
            .field("is_scheduled", &self.is_scheduled.get())
            .field("is_flushing", &self.is_flushing.get())
            .finish()
    }
}
