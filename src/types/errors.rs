//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.
//!
//! A failure inside a single job's execution is NOT an `Error` — it rides
//! inside the job's `JobResult` and never crosses a task boundary. The
//! variants here cover queue admission, cancellation, timeouts, and the
//! shutdown state machine.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the dispatch system.
#[derive(Error, Debug)]
pub enum Error {
    /// Non-blocking enqueue attempted on a queue at capacity. Transient and
    /// retryable.
    #[error("queue full: {0}")]
    QueueFull(String),

    /// Enqueue attempted on a closed queue. Dequeue-side end-of-stream is
    /// `None`, never this error.
    #[error("closed: {0}")]
    Closed(String),

    /// A bounded wait elapsed without the awaited event.
    #[error("timeout: {0}")]
    Timeout(String),

    /// A blocked caller was released by cancellation (e.g. the rate limiter
    /// was stopped while a task waited in `allow()`).
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// The shutdown grace period expired with jobs still in flight.
    #[error("grace period expired: {0}")]
    GraceExpired(String),

    /// Invalid shutdown state transition.
    #[error("state transition error: {0}")]
    StateTransition(String),

    /// Validation errors (configuration, startup parameters).
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors (signal handler installation).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience constructors
impl Error {
    pub fn queue_full(msg: impl Into<String>) -> Self {
        Self::QueueFull(msg.into())
    }

    pub fn closed(msg: impl Into<String>) -> Self {
        Self::Closed(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    pub fn grace_expired(msg: impl Into<String>) -> Self {
        Self::GraceExpired(msg.into())
    }

    pub fn state_transition(msg: impl Into<String>) -> Self {
        Self::StateTransition(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether the caller may reasonably retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::QueueFull(_) | Error::Timeout(_))
    }
}
