//! Main-thread dispatch queue.
//!
//! Producer threads call [`MainThreadDispatcher::enqueue`] to schedule work.
//! The host calls [`MainThreadDispatcher::drain_tick`] once per frame from the
//! main thread. A drain swaps the queue out under the lock and runs the
//! captured callbacks after releasing it, so callbacks may enqueue more work
//! (picked up by the next tick) and slow callbacks never stall producers.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::callback::PendingCallback;
use crate::diagnostics::{CallbackFailure, FailureSink, LogSink};
use crate::error::{DispatchError, Result};
use crate::options::{FailurePolicy, Options};

/// Outcome of a single drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The tick number (1-based).
    pub tick: u64,
    /// Number of callbacks that ran, failed ones included.
    pub executed: usize,
    /// Failures isolated during this tick.
    pub failures: Vec<CallbackFailure>,
}

impl TickReport {
    /// Returns the number of callbacks that completed without failing.
    pub fn succeeded(&self) -> usize {
        self.executed - self.failures.len()
    }

    /// Returns whether every callback in the tick succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// FIFO queue of callbacks filled from any thread and drained on the main thread.
pub struct MainThreadDispatcher {
    queue: Mutex<Vec<PendingCallback>>,
    options: Options,
    sink: Arc<dyn FailureSink>,
    main_thread: ThreadId,
    ticks: AtomicU64,
}

impl MainThreadDispatcher {
    /// Creates a dispatcher bound to the calling thread, logging failures.
    pub fn new(options: Options) -> Result<Self> {
        Self::with_sink(options, Arc::new(LogSink))
    }

    /// Creates a dispatcher bound to the calling thread with a custom failure sink.
    pub fn with_sink(options: Options, sink: Arc<dyn FailureSink>) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            queue: Mutex::new(Vec::with_capacity(options.initial_capacity)),
            main_thread: thread::current().id(),
            ticks: AtomicU64::new(0),
            options,
            sink,
        })
    }

    /// Schedules `f` to run on the next drain. Callable from any thread.
    pub fn enqueue<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(PendingCallback::new(f));
    }

    /// Schedules a fallible callback. An `Err` is treated like a panic by the drain.
    pub fn enqueue_fallible<F, E>(&self, f: F)
    where
        F: FnOnce() -> std::result::Result<(), E> + Send + 'static,
        E: fmt::Display,
    {
        self.push(PendingCallback::fallible(f));
    }

    /// Appends an already-wrapped callback to the tail of the queue.
    pub fn push(&self, callback: PendingCallback) {
        self.lock_queue().push(callback);
    }

    /// Runs every callback queued before this call, in submission order.
    ///
    /// Callbacks enqueued while the drain is running wait for the next tick.
    pub fn drain_tick(&self) -> Result<TickReport> {
        self.check_main_thread()?;

        let batch = {
            let mut queue = self.lock_queue();
            if queue.is_empty() {
                None
            } else {
                Some(std::mem::replace(
                    &mut *queue,
                    Vec::with_capacity(self.options.initial_capacity),
                ))
            }
        };

        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        let mut report = TickReport {
            tick,
            executed: 0,
            failures: Vec::new(),
        };
        let Some(batch) = batch else {
            return Ok(report);
        };
        log::trace!("tick {tick}: draining {} callbacks", batch.len());

        let mut callbacks = batch.into_iter().enumerate();
        while let Some((index, callback)) = callbacks.next() {
            report.executed += 1;
            let Err(kind) = callback.run() else {
                continue;
            };
            let failure = CallbackFailure { tick, index, kind };
            self.report_failure(&failure);

            match self.options.failure_policy {
                FailurePolicy::Isolate => report.failures.push(failure),
                FailurePolicy::Propagate => {
                    let remainder: Vec<_> = callbacks.map(|(_, cb)| cb).collect();
                    if !remainder.is_empty() {
                        log::debug!(
                            "tick {tick}: requeueing {} callbacks after failure",
                            remainder.len()
                        );
                        self.requeue_front(remainder);
                    }
                    return Err(DispatchError::CallbackFailed(failure));
                }
            }
        }

        log::debug!(
            "tick {tick}: ran {} callbacks ({} failed)",
            report.executed,
            report.failures.len()
        );
        Ok(report)
    }

    /// Returns the number of callbacks waiting for the next drain.
    pub fn pending(&self) -> usize {
        self.lock_queue().len()
    }

    /// Returns the number of drains performed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Returns the thread this dispatcher treats as the main execution context.
    pub fn main_thread(&self) -> ThreadId {
        self.main_thread
    }

    /// Returns whether the calling thread is the main execution context.
    pub fn is_main_thread(&self) -> bool {
        thread::current().id() == self.main_thread
    }

    /// Returns the options this dispatcher was created with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    fn check_main_thread(&self) -> Result<()> {
        if !self.options.enforce_main_thread || self.is_main_thread() {
            return Ok(());
        }
        let err = DispatchError::OffMainThread {
            expected: format!("{:?}", self.main_thread),
            actual: format!("{:?}", thread::current().id()),
        };
        log::error!("{err}");
        Err(err)
    }

    // The batch is already out of the queue, so a panicking sink must not end the drain.
    fn report_failure(&self, failure: &CallbackFailure) {
        let reported = panic::catch_unwind(AssertUnwindSafe(|| self.sink.report(failure)));
        if reported.is_err() {
            log::error!("failure sink panicked while reporting: {failure}");
        }
    }

    /// Puts `remainder` back ahead of anything enqueued during the drain.
    fn requeue_front(&self, mut remainder: Vec<PendingCallback>) {
        let mut queue = self.lock_queue();
        remainder.append(&mut queue);
        *queue = remainder;
    }

    // No callback ever runs under this lock, so a poisoned guard still holds a valid queue.
    fn lock_queue(&self) -> MutexGuard<'_, Vec<PendingCallback>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for MainThreadDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainThreadDispatcher")
            .field("pending", &self.pending())
            .field("ticks", &self.ticks())
            .field("main_thread", &self.main_thread)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Drop for MainThreadDispatcher {
    fn drop(&mut self) {
        let pending = self
            .queue
            .get_mut()
            .map_or_else(|poisoned| poisoned.into_inner().len(), |queue| queue.len());
        if pending > 0 {
            log::warn!("dispatcher dropped with {pending} callbacks never run");
        }
    }
}
