//! Process-wide dispatcher lifecycle.
//!
//! These functions operate on the single dispatcher shared by the whole
//! process. Components that should not reach for global state can instead
//! take the `Arc<MainThreadDispatcher>` returned by [`init()`] or
//! [`dispatcher()`].

use std::fmt;
use std::sync::Arc;

use camstream_core::state;

use crate::{FailureSink, MainThreadDispatcher, Options, Result, TickReport};

/// Initializes the process-wide dispatcher with default options.
///
/// The calling thread becomes the main execution context: only it may call
/// [`frame_tick()`]. Also installs `env_logger` unless a logger is already set.
///
/// # Errors
///
/// Returns [`DispatchError::AlreadyInitialized`](crate::DispatchError::AlreadyInitialized)
/// if a dispatcher already exists. The existing dispatcher is left untouched.
///
/// # Example
///
/// ```no_run
/// use camstream::*;
///
/// fn main() -> Result<()> {
///     init()?;
///     frame_tick()?;
///     Ok(())
/// }
/// ```
pub fn init() -> Result<Arc<MainThreadDispatcher>> {
    init_with_options(Options::default())
}

/// Initializes the process-wide dispatcher with the given options.
pub fn init_with_options(options: Options) -> Result<Arc<MainThreadDispatcher>> {
    let _ = env_logger::try_init();
    let dispatcher = state::init_dispatcher(options)?;
    log::info!(
        "camstream-rs initialized (failure policy: {:?})",
        dispatcher.options().failure_policy
    );
    Ok(dispatcher)
}

/// Initializes the process-wide dispatcher with a custom failure sink.
pub fn init_with_sink(
    options: Options,
    sink: Arc<dyn FailureSink>,
) -> Result<Arc<MainThreadDispatcher>> {
    let _ = env_logger::try_init();
    let dispatcher = state::init_dispatcher_with_sink(options, sink)?;
    log::info!("camstream-rs initialized with custom failure sink");
    Ok(dispatcher)
}

/// Returns whether the process-wide dispatcher has been initialized.
#[must_use]
pub fn is_initialized() -> bool {
    state::is_initialized()
}

/// Returns a handle to the process-wide dispatcher.
pub fn dispatcher() -> Result<Arc<MainThreadDispatcher>> {
    state::dispatcher()
}

/// Schedules `f` to run on the main thread during the next [`frame_tick()`].
///
/// Safe to call from any thread.
pub fn invoke_on_main_thread<F>(f: F) -> Result<()>
where
    F: FnOnce() + Send + 'static,
{
    state::dispatcher()?.enqueue(f);
    Ok(())
}

/// Schedules a fallible callback on the main thread.
///
/// An `Err` returned by `f` is reported like a panic.
pub fn invoke_on_main_thread_fallible<F, E>(f: F) -> Result<()>
where
    F: FnOnce() -> std::result::Result<(), E> + Send + 'static,
    E: fmt::Display,
{
    state::dispatcher()?.enqueue_fallible(f);
    Ok(())
}

/// Performs one drain of the process-wide dispatcher.
///
/// Call this exactly once per host frame from the main thread.
pub fn frame_tick() -> Result<TickReport> {
    state::dispatcher()?.drain_tick()
}

/// Returns the number of callbacks waiting for the next tick.
pub fn pending() -> Result<usize> {
    Ok(state::dispatcher()?.pending())
}
