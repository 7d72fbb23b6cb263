//! Configuration options for the dispatcher.

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// Upper bound accepted for [`Options::max_fps`].
pub const MAX_TICK_RATE: u32 = 1000;

/// Configuration options for a [`MainThreadDispatcher`](crate::MainThreadDispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// What a drain does when a callback panics or returns an error.
    pub failure_policy: FailurePolicy,

    /// Whether `drain_tick` rejects calls from threads other than the one
    /// that created the dispatcher.
    pub enforce_main_thread: bool,

    /// Tick rate used by headless tick loops (0 = unpaced).
    pub max_fps: u32,

    /// Capacity reserved for the queue after each swap.
    pub initial_capacity: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Isolate,
            enforce_main_thread: true,
            max_fps: 60,
            initial_capacity: 16,
        }
    }
}

impl Options {
    /// Parses options from a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Serializes the options as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that all values are in range.
    pub fn validate(&self) -> Result<()> {
        if self.max_fps > MAX_TICK_RATE {
            return Err(DispatchError::InvalidOptions(format!(
                "max_fps must be at most {MAX_TICK_RATE}, got {}",
                self.max_fps
            )));
        }
        Ok(())
    }

    /// Sets the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Enables or disables the main-thread check on drains.
    pub fn with_enforce_main_thread(mut self, enforce: bool) -> Self {
        self.enforce_main_thread = enforce;
        self
    }

    /// Sets the headless tick rate.
    pub fn with_max_fps(mut self, max_fps: u32) -> Self {
        self.max_fps = max_fps;
        self
    }
}

/// How a drain reacts to a failing callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Report the failure to the sink and keep running the rest of the tick.
    #[default]
    Isolate,
    /// Stop the tick at the first failure and return it to the caller.
    /// Callbacks not yet run stay queued, ahead of anything enqueued since.
    Propagate,
}
