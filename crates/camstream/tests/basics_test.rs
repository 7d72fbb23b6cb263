//! Basic integration tests for the process-wide dispatcher.
//!
//! Note: the process-wide dispatcher can only be initialized once per
//! process, so all tests touching it are combined into a single test function.

use std::sync::{Arc, Mutex};
use std::thread;

use camstream::*;

#[test]
fn test_basics() {
    // Test 1: use before init is reported distinctly
    {
        assert!(!is_initialized());
        let err = invoke_on_main_thread(|| {}).unwrap_err();
        assert!(matches!(err, DispatchError::NotInitialized));
        assert!(matches!(frame_tick(), Err(DispatchError::NotInitialized)));
    }

    let sink = Arc::new(RecordingSink::new());
    let first = init_with_sink(Options::default().with_max_fps(0), sink.clone())
        .expect("init failed");
    assert!(is_initialized());

    // Test 2: second init is an error and keeps the first instance
    {
        let err = init().unwrap_err();
        assert!(matches!(err, DispatchError::AlreadyInitialized));
        let current = dispatcher().unwrap();
        assert!(Arc::ptr_eq(&first, &current));
        assert_eq!(current.options().max_fps, 0);
    }

    // Test 3: callbacks from a worker thread run on this thread at the next tick
    {
        let main_id = thread::current().id();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let producer = {
            let seen = Arc::clone(&seen);
            thread::spawn(move || {
                for frame in 0..4_u32 {
                    let seen = Arc::clone(&seen);
                    invoke_on_main_thread(move || {
                        seen.lock().unwrap().push((frame, thread::current().id()));
                    })
                    .unwrap();
                }
            })
        };
        producer.join().unwrap();
        assert_eq!(pending().unwrap(), 4);

        let report = frame_tick().unwrap();
        assert_eq!(report.executed, 4);
        assert_eq!(pending().unwrap(), 0);

        let seen = seen.lock().unwrap();
        let frames: Vec<u32> = seen.iter().map(|(frame, _)| *frame).collect();
        assert_eq!(frames, vec![0, 1, 2, 3]);
        assert!(seen.iter().all(|(_, id)| *id == main_id));
    }

    // Test 4: a fallible failure goes to the sink, the rest of the tick runs
    {
        let ran = Arc::new(Mutex::new(false));
        invoke_on_main_thread_fallible(|| Err::<(), _>("sample buffer too small")).unwrap();
        let ran_clone = Arc::clone(&ran);
        invoke_on_main_thread(move || *ran_clone.lock().unwrap() = true).unwrap();

        let report = frame_tick().unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(*ran.lock().unwrap());

        let failures = sink.take();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message(), "sample buffer too small");
    }

    // Test 5: draining off the main thread is rejected
    {
        invoke_on_main_thread(|| {}).unwrap();
        let result = thread::spawn(frame_tick).join().unwrap();
        assert!(matches!(result, Err(DispatchError::OffMainThread { .. })));
        assert_eq!(pending().unwrap(), 1);
        frame_tick().unwrap();
    }

    // Test 6: a tick loop drives the process-wide dispatcher
    {
        let ticks_before = first.ticks();
        let mut tick_loop = TickLoop::new(dispatcher().unwrap());
        tick_loop.run_for(3).unwrap();
        assert_eq!(first.ticks(), ticks_before + 3);
    }
}
