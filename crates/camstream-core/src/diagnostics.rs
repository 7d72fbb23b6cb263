//! Reporting of callback failures.
//!
//! A drain never lets one failing callback stop the others silently. Each
//! failure is described by a [`CallbackFailure`] and handed to a
//! [`FailureSink`]. The default sink writes to the `log` facade.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Why a callback failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The callback panicked. Holds the panic message when it was a string.
    Panicked(String),
    /// A fallible callback returned an error. Holds the error's display text.
    Errored(String),
}

/// A single callback failure observed during a drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackFailure {
    /// The tick number (1-based) in which the failure happened.
    pub tick: u64,
    /// Position of the callback within that tick's snapshot.
    pub index: usize,
    /// What went wrong.
    pub kind: FailureKind,
}

impl CallbackFailure {
    /// Returns the failure message without the tick/index prefix.
    pub fn message(&self) -> &str {
        match &self.kind {
            FailureKind::Panicked(msg) | FailureKind::Errored(msg) => msg,
        }
    }
}

impl fmt::Display for CallbackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            FailureKind::Panicked(_) => "panicked",
            FailureKind::Errored(_) => "failed",
        };
        write!(
            f,
            "callback {} in tick {} {verb}: {}",
            self.index,
            self.tick,
            self.message()
        )
    }
}

/// Receives failures surfaced by a drain.
pub trait FailureSink: Send + Sync {
    /// Called once per failed callback, on the draining thread.
    fn report(&self, failure: &CallbackFailure);
}

/// Sink that logs each failure at `error` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl FailureSink for LogSink {
    fn report(&self, failure: &CallbackFailure) {
        log::error!("{failure}");
    }
}

/// Sink that keeps every failure in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    failures: Mutex<Vec<CallbackFailure>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all failures recorded so far.
    pub fn failures(&self) -> Vec<CallbackFailure> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns all recorded failures.
    pub fn take(&self) -> Vec<CallbackFailure> {
        std::mem::take(&mut *self.failures.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl FailureSink for RecordingSink {
    fn report(&self, failure: &CallbackFailure) {
        log::warn!("{failure}");
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure.clone());
    }
}
