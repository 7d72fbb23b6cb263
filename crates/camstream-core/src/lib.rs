//! Core abstractions for camstream-rs.
//!
//! Camera capture delivers frames on a worker thread, while the host's
//! presentation layer may only be touched from its main thread. This crate
//! provides the hand-off between the two:
//! - [`MainThreadDispatcher`], a FIFO of callbacks drained once per host tick
//! - [`DispatcherSlot`] and the process-wide slot enforcing a single instance
//! - [`FailureSink`] for surfacing callbacks that panic or return errors
//! - [`Options`] for failure policy and tick pacing

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod callback;
pub mod diagnostics;
pub mod dispatcher;
pub mod error;
pub mod options;
pub mod state;

pub use callback::PendingCallback;
pub use diagnostics::{CallbackFailure, FailureKind, FailureSink, LogSink, RecordingSink};
pub use dispatcher::{MainThreadDispatcher, TickReport};
pub use error::{DispatchError, Result};
pub use options::{FailurePolicy, Options};
pub use state::DispatcherSlot;
