//! camstream-rs: main-thread dispatch for camera-stream hosts.
//!
//! Frame callbacks from a capture device arrive on a worker thread, but the
//! host's scene and UI can only be touched from its main thread. camstream
//! queues work from any thread and runs it on the main thread once per frame.
//!
//! # Quick Start
//!
//! ```no_run
//! use camstream::*;
//!
//! fn main() -> Result<()> {
//!     // Bind the dispatcher to this (main) thread
//!     init()?;
//!
//!     // Hand work over from a capture thread
//!     std::thread::spawn(|| {
//!         invoke_on_main_thread(|| println!("frame received")).unwrap();
//!     });
//!
//!     // Once per host frame
//!     frame_tick()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Failure handling
//!
//! By default a callback that panics or returns an error is reported to the
//! failure sink and the rest of the tick still runs. Set
//! [`FailurePolicy::Propagate`] to stop the tick at the first failure instead;
//! the callbacks it did not reach stay queued for the next tick.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_errors_doc)]

mod init;
mod tick_loop;

pub use camstream_core::{
    callback::PendingCallback,
    diagnostics::{CallbackFailure, FailureKind, FailureSink, LogSink, RecordingSink},
    dispatcher::{MainThreadDispatcher, TickReport},
    error::{DispatchError, Result},
    options::{FailurePolicy, Options},
    state::DispatcherSlot,
};

pub use init::{
    dispatcher, frame_tick, init, init_with_options, init_with_sink, invoke_on_main_thread,
    invoke_on_main_thread_fallible, is_initialized, pending,
};
pub use tick_loop::TickLoop;
