//! # Foreman Core - Concurrent Job Dispatch System
//!
//! A bounded fan-out/fan-in job pipeline providing:
//! - Bounded job and result queues with backpressure
//! - A fixed-size worker pool pulling until close-and-drain
//! - Tick-driven rate limiting in front of producers
//! - A multi-source event selector with timeout
//! - A graceful-shutdown state machine driven by an external interrupt
//!
//! ## Architecture
//!
//! The `Dispatcher` owns all mutable state; tasks communicate only through
//! the bounded queues and the shutdown watch channel:
//! ```text
//!   producer ──► [Rate Limiter] ──► Job Queue ──► Worker Pool (N)
//!                                                      │
//!              collector ◄── Result Channel ◄──────────┘
//!                                       ▲
//!          interrupt ──► Shutdown Coordinator (running → draining → stopped)
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod dispatcher;
pub mod job;
pub mod limiter;
pub mod pool;
pub mod queue;
pub mod select;
pub mod shutdown;
pub mod types;

// Internal utilities
pub mod observability;

pub use dispatcher::Dispatcher;
pub use job::{Job, JobResult};
pub use limiter::IntervalLimiter;
pub use pool::{JobProcessor, WorkerPool};
pub use queue::BoundedQueue;
pub use select::{EventSelector, Selected};
pub use shutdown::{ShutdownCoordinator, ShutdownReport, ShutdownState};
pub use types::{Config, Error, JobId, Result};
