//! Dispatcher — pipeline assembly and ownership.
//!
//! The `Dispatcher` owns every subsystem (queues, limiter, pool,
//! coordinator) and wires the data flow
//!
//! ```text
//!   producer → [Rate Limiter gate] → Job Queue → Worker Pool (N workers)
//!                                                     │
//!                collector ← Result Channel ←─────────┘
//! ```
//!
//! All state lives here, lifecycle-bound to this struct — nothing is
//! process-global. Producers submit through [`Dispatcher::submit`], the
//! collector drains [`Dispatcher::results`], and the embedding application
//! hands an interrupt future to [`Dispatcher::run_until`].

use std::future::Future;
use std::sync::Arc;

use crate::job::{Job, JobResult};
use crate::limiter::IntervalLimiter;
use crate::pool::{JobProcessor, WorkerPool};
use crate::queue::BoundedQueue;
use crate::shutdown::{ShutdownCoordinator, ShutdownReport, ShutdownState};
use crate::types::{Config, Error, Result};

/// Owner of the whole pipeline.
#[derive(Debug)]
pub struct Dispatcher {
    jobs: BoundedQueue<Job>,
    results: BoundedQueue<JobResult>,
    limiter: IntervalLimiter,
    pool: WorkerPool,
    coordinator: ShutdownCoordinator,
}

impl Dispatcher {
    /// Validate `config` and bring up the pipeline.
    ///
    /// Resource-acquisition failures here are fatal to the whole system;
    /// nothing is left half-started on error.
    pub fn new(config: &Config, processor: Arc<dyn JobProcessor>) -> Result<Self> {
        config.validate()?;

        let jobs = BoundedQueue::new("jobs", config.queue.job_capacity);
        let results = BoundedQueue::new("results", config.queue.result_capacity);
        let limiter = IntervalLimiter::new(config.limiter.interval);
        let pool = WorkerPool::start(
            config.pool.workers,
            jobs.clone(),
            results.clone(),
            processor,
        )?;
        let coordinator = ShutdownCoordinator::new(config.shutdown.grace_period);

        tracing::info!(
            workers = config.pool.workers,
            job_capacity = config.queue.job_capacity,
            result_capacity = config.queue.result_capacity,
            interval = ?config.limiter.interval,
            grace_period = ?config.shutdown.grace_period,
            "dispatcher started"
        );

        Ok(Self {
            jobs,
            results,
            limiter,
            pool,
            coordinator,
        })
    }

    /// Submit a job, waiting for a rate-limiter admission slot and for
    /// queue space.
    ///
    /// Rejected with `Closed` once draining has begun, and with `Cancelled`
    /// if the interrupt lands while this producer waits in the limiter.
    pub async fn submit(&self, job: Job) -> Result<()> {
        if self.coordinator.state() != ShutdownState::Running {
            return Err(Error::closed("dispatcher is draining"));
        }
        self.limiter.allow().await?;
        tracing::debug!(job_id = %job.id, "job admitted");
        self.jobs.enqueue(job).await
    }

    /// Submit without blocking on queue space. Still consumes an admission
    /// slot; surfaces `QueueFull` for the caller to retry.
    pub async fn try_submit(&self, job: Job) -> Result<()> {
        if self.coordinator.state() != ShutdownState::Running {
            return Err(Error::closed("dispatcher is draining"));
        }
        self.limiter.allow().await?;
        self.jobs.try_enqueue(job)
    }

    /// Handle to the result channel for the collector. `None` from
    /// `dequeue` means the pipeline has fully stopped and drained.
    pub fn results(&self) -> BoundedQueue<JobResult> {
        self.results.clone()
    }

    /// Current shutdown state.
    pub fn state(&self) -> ShutdownState {
        self.coordinator.state()
    }

    /// Watch handle over shutdown state changes.
    pub fn shutdown_state(&self) -> tokio::sync::watch::Receiver<ShutdownState> {
        self.coordinator.subscribe()
    }

    /// Number of jobs currently pending in the job queue.
    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Block until `signal` fires, then drive the orderly stop: no new
    /// jobs, in-flight jobs drained within the grace period, forced
    /// abandonment past it.
    pub async fn run_until(&self, signal: impl Future<Output = ()>) -> Result<ShutdownReport> {
        self.coordinator
            .run(signal, &self.pool, &self.limiter, &self.results)
            .await
    }

    /// Begin shutdown immediately (interrupt already observed elsewhere).
    pub async fn shutdown(&self) -> Result<ShutdownReport> {
        self.coordinator
            .drain(&self.pool, &self.limiter, &self.results)
            .await
    }
}
