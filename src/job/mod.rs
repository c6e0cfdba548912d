//! Job and result payload types.
//!
//! A `Job` is a unit of work submitted for processing; a `JobResult` is the
//! outcome of processing exactly one job. Jobs are immutable after creation
//! and carry an opaque byte payload (JSON-encoded by convention). Results
//! back-reference the originating job by `JobId` only — collectors that need
//! deterministic pairing key on that identifier, since workers race
//! independently and result order is unspecified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{JobId, Result};

/// A unit of work submitted for processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Opaque payload, JSON-encoded by convention.
    pub payload: Vec<u8>,
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    /// Create a job with a generated identifier.
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            id: JobId::new(),
            payload,
            submitted_at: Utc::now(),
        }
    }

    /// Create a job with a caller-assigned identifier.
    pub fn with_id(id: JobId, payload: Vec<u8>) -> Self {
        Self {
            id,
            payload,
            submitted_at: Utc::now(),
        }
    }

    /// Create a job from any serializable payload.
    pub fn with_json<T: Serialize>(id: JobId, payload: &T) -> Result<Self> {
        Ok(Self::with_id(id, serde_json::to_vec(payload)?))
    }
}

/// The outcome of processing one job.
///
/// Exactly one `JobResult` exists per consumed job, failed or not — a failed
/// job never silently disappears.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// Back-reference to the originating job.
    pub job_id: JobId,
    pub output: Vec<u8>,
    /// `Some` marks a failed job. How to react (log, re-submit, report
    /// upward) is the collector's decision, not the pool's.
    pub error: Option<String>,
    /// Numeric identity of the worker that produced this result.
    pub worker: usize,
    pub completed_at: DateTime<Utc>,
}

impl JobResult {
    /// Build a success result for `job_id`.
    pub fn success(job_id: JobId, worker: usize, output: Vec<u8>) -> Self {
        Self {
            job_id,
            output,
            error: None,
            worker,
            completed_at: Utc::now(),
        }
    }

    /// Build a failure result for `job_id`.
    pub fn failure(job_id: JobId, worker: usize, error: impl Into<String>) -> Self {
        Self {
            job_id,
            output: Vec::new(),
            error: Some(error.into()),
            worker,
            completed_at: Utc::now(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}
