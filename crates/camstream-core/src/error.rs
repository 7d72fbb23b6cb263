//! Error types for camstream-rs.

use thiserror::Error;

use crate::diagnostics::CallbackFailure;

/// The main error type for camstream-rs operations.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The dispatcher has not been initialized.
    #[error("dispatcher not initialized - call camstream::init() first")]
    NotInitialized,

    /// A dispatcher instance already exists.
    #[error("cannot create two dispatcher instances")]
    AlreadyInitialized,

    /// A drain was requested from a thread other than the bound main thread.
    #[error("drain_tick called off the main thread (bound to {expected}, called from {actual})")]
    OffMainThread { expected: String, actual: String },

    /// A callback failed and the failure policy asked for it to be propagated.
    #[error("{0}")]
    CallbackFailed(CallbackFailure),

    /// Options failed validation.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for camstream-rs operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
