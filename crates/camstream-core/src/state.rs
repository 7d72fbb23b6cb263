//! Single-instance ownership of the dispatcher.
//!
//! [`DispatcherSlot`] is the composition-root side of the dispatcher: the
//! owner initializes it once and hands `Arc` clones to producers. The
//! process-wide slot used by the `camstream` facade lives here too.

use std::sync::{Arc, PoisonError, RwLock};

use crate::diagnostics::FailureSink;
use crate::dispatcher::{MainThreadDispatcher, TickReport};
use crate::error::{DispatchError, Result};
use crate::options::Options;

/// Process-wide slot.
static GLOBAL: RwLock<DispatcherSlot> = RwLock::new(DispatcherSlot::new());

/// Holds at most one dispatcher.
///
/// A second initialization is reported and leaves the existing instance in
/// place. Using the slot before initialization is reported as
/// [`DispatchError::NotInitialized`].
#[derive(Debug, Default)]
pub struct DispatcherSlot {
    instance: Option<Arc<MainThreadDispatcher>>,
}

impl DispatcherSlot {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self { instance: None }
    }

    /// Creates the dispatcher, bound to the calling thread.
    pub fn initialize(&mut self, options: Options) -> Result<Arc<MainThreadDispatcher>> {
        self.install(|| MainThreadDispatcher::new(options))
    }

    /// Creates the dispatcher with a custom failure sink.
    pub fn initialize_with_sink(
        &mut self,
        options: Options,
        sink: Arc<dyn FailureSink>,
    ) -> Result<Arc<MainThreadDispatcher>> {
        self.install(|| MainThreadDispatcher::with_sink(options, sink))
    }

    fn install(
        &mut self,
        create: impl FnOnce() -> Result<MainThreadDispatcher>,
    ) -> Result<Arc<MainThreadDispatcher>> {
        if self.instance.is_some() {
            log::error!("cannot create two dispatcher instances; keeping the existing one");
            return Err(DispatchError::AlreadyInitialized);
        }
        let dispatcher = Arc::new(create()?);
        self.instance = Some(Arc::clone(&dispatcher));
        Ok(dispatcher)
    }

    /// Returns whether the slot holds a dispatcher.
    pub fn is_initialized(&self) -> bool {
        self.instance.is_some()
    }

    /// Returns a handle to the dispatcher.
    pub fn get(&self) -> Result<Arc<MainThreadDispatcher>> {
        self.instance.clone().ok_or_else(|| {
            log::error!("dispatcher used before initialization");
            DispatchError::NotInitialized
        })
    }

    /// Enqueues `f` on the held dispatcher.
    pub fn enqueue<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.get()?.enqueue(f);
        Ok(())
    }

    /// Drains the held dispatcher once.
    pub fn drain_tick(&self) -> Result<TickReport> {
        self.get()?.drain_tick()
    }
}

/// Initializes the process-wide dispatcher, bound to the calling thread.
pub fn init_dispatcher(options: Options) -> Result<Arc<MainThreadDispatcher>> {
    GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .initialize(options)
}

/// Initializes the process-wide dispatcher with a custom failure sink.
pub fn init_dispatcher_with_sink(
    options: Options,
    sink: Arc<dyn FailureSink>,
) -> Result<Arc<MainThreadDispatcher>> {
    GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .initialize_with_sink(options, sink)
}

/// Returns whether the process-wide dispatcher exists.
pub fn is_initialized() -> bool {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_initialized()
}

/// Returns a handle to the process-wide dispatcher.
pub fn dispatcher() -> Result<Arc<MainThreadDispatcher>> {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner).get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_use_before_initialize() {
        let slot = DispatcherSlot::new();
        assert!(!slot.is_initialized());
        assert!(matches!(slot.enqueue(|| {}), Err(DispatchError::NotInitialized)));
        assert!(matches!(slot.drain_tick(), Err(DispatchError::NotInitialized)));
    }

    #[test]
    fn test_double_initialize_keeps_first_instance() {
        let mut slot = DispatcherSlot::new();
        let first = slot.initialize(Options::default()).unwrap();
        first.enqueue(|| {});

        let err = slot
            .initialize(Options::default().with_max_fps(30))
            .unwrap_err();
        assert!(matches!(err, DispatchError::AlreadyInitialized));

        let current = slot.get().unwrap();
        assert!(Arc::ptr_eq(&first, &current));
        assert_eq!(current.options().max_fps, 60);
        assert_eq!(current.pending(), 1);
    }

    #[test]
    fn test_failed_creation_leaves_slot_empty() {
        let mut slot = DispatcherSlot::new();
        let err = slot
            .initialize(Options::default().with_max_fps(u32::MAX))
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidOptions(_)));
        assert!(!slot.is_initialized());
    }

    #[test]
    fn test_slot_enqueue_and_drain() {
        let mut slot = DispatcherSlot::new();
        slot.initialize(Options::default()).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            slot.enqueue(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        let report = slot.drain_tick().unwrap();
        assert_eq!(report.executed, 3);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }
}
