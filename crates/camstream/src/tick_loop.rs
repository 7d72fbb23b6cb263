//! Fixed-rate tick loop for hosts without their own frame signal.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::{MainThreadDispatcher, Result, TickReport};

/// Drives [`MainThreadDispatcher::drain_tick`] at the dispatcher's `max_fps`.
///
/// Must be run on the dispatcher's main thread.
pub struct TickLoop {
    dispatcher: Arc<MainThreadDispatcher>,
    frame_interval: Option<Duration>,
    last_frame_time: Option<Instant>,
}

impl TickLoop {
    /// Creates a loop paced by `dispatcher.options().max_fps` (0 = unpaced).
    pub fn new(dispatcher: Arc<MainThreadDispatcher>) -> Self {
        let max_fps = dispatcher.options().max_fps;
        let frame_interval =
            (max_fps > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(max_fps)));
        Self {
            dispatcher,
            frame_interval,
            last_frame_time: None,
        }
    }

    /// Returns the time budget of one frame, if paced.
    pub fn frame_interval(&self) -> Option<Duration> {
        self.frame_interval
    }

    /// Waits out the rest of the current frame, then drains once.
    pub fn tick(&mut self) -> Result<TickReport> {
        if let (Some(interval), Some(last)) = (self.frame_interval, self.last_frame_time) {
            let elapsed = last.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        self.last_frame_time = Some(Instant::now());
        self.dispatcher.drain_tick()
    }

    /// Ticks until `keep_running` returns false for a report. Returns the number of ticks run.
    pub fn run_until<F>(&mut self, mut keep_running: F) -> Result<u64>
    where
        F: FnMut(&TickReport) -> bool,
    {
        let mut ticks = 0;
        loop {
            let report = self.tick()?;
            ticks += 1;
            if !keep_running(&report) {
                log::debug!("tick loop stopped after {ticks} ticks");
                return Ok(ticks);
            }
        }
    }

    /// Runs exactly `count` ticks.
    pub fn run_for(&mut self, count: u64) -> Result<()> {
        for _ in 0..count {
            self.tick()?;
        }
        Ok(())
    }
}
