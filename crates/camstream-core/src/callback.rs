//! Deferred units of work.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::diagnostics::FailureKind;

type Infallible = Box<dyn FnOnce() + Send + 'static>;
type Fallible = Box<dyn FnOnce() -> Result<(), String> + Send + 'static>;

/// A zero-argument callback waiting to run on the main thread.
///
/// Once queued, the dispatcher owns the callback exclusively. It is consumed
/// by [`PendingCallback::run`], so it can execute at most once.
pub enum PendingCallback {
    /// A callback that can only fail by panicking.
    Infallible(Infallible),
    /// A callback that reports failure through its return value.
    Fallible(Fallible),
}

impl PendingCallback {
    /// Wraps a plain closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::Infallible(Box::new(f))
    }

    /// Wraps a closure returning `Result`. The error is kept as its display text.
    pub fn fallible<F, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: fmt::Display,
    {
        Self::Fallible(Box::new(move || f().map_err(|e| e.to_string())))
    }

    /// Runs the callback, converting a panic or an `Err` into a [`FailureKind`].
    pub fn run(self) -> Result<(), FailureKind> {
        let outcome = match self {
            Self::Infallible(f) => panic::catch_unwind(AssertUnwindSafe(f)).map(Ok),
            Self::Fallible(f) => panic::catch_unwind(AssertUnwindSafe(f)),
        };
        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(msg)) => Err(FailureKind::Errored(msg)),
            Err(payload) => Err(FailureKind::Panicked(panic_payload_to_string(&payload))),
        }
    }
}

impl fmt::Debug for PendingCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infallible(_) => f.write_str("PendingCallback::Infallible"),
            Self::Fallible(_) => f.write_str("PendingCallback::Fallible"),
        }
    }
}

fn panic_payload_to_string(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
