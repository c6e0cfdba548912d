//! Core types for the dispatch system.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers (JobId)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for pool, queues, limiter, shutdown

mod config;
mod errors;
mod ids;

pub use config::{
    Config, LimiterConfig, ObservabilityConfig, PoolConfig, QueueConfig, ShutdownConfig,
};
pub use errors::{Error, Result};
pub use ids::JobId;
