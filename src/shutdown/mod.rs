//! Graceful shutdown coordination.
//!
//! Implements the shutdown state machine, strictly forward:
//! RUNNING → DRAINING → STOPPED
//!
//! The coordinator is the sole cancellation authority in the system. On the
//! external interrupt notification it closes the job queue (no new jobs),
//! stops the rate limiter, and gives in-flight jobs a bounded grace period
//! to drain. Drain completes in time → clean stop. Grace expires first →
//! still-running job executions are abandoned and their eventual results
//! discarded: a documented, logged loss, not a silent bug.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

use crate::job::JobResult;
use crate::limiter::IntervalLimiter;
use crate::pool::WorkerPool;
use crate::queue::BoundedQueue;
use crate::types::{Error, Result};

/// Resolve once the platform interrupt (Ctrl+C / SIGTERM-equivalent) is
/// delivered. This is the external shutdown trigger; handler installation
/// failures surface as `Io`.
pub async fn interrupt() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

/// Shutdown lifecycle state. Transitions are monotonic and never reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    /// Producers enqueue, workers process normally.
    Running,
    /// No new jobs accepted; already-enqueued jobs drain.
    Draining,
    /// Terminal. All owned resources closed/released.
    Stopped,
}

impl ShutdownState {
    /// Whether `self → next` is a legal transition. Forced stops still pass
    /// through `Draining`, so `Running → Stopped` is not legal.
    pub fn can_transition_to(self, next: ShutdownState) -> bool {
        matches!(
            (self, next),
            (ShutdownState::Running, ShutdownState::Draining)
                | (ShutdownState::Draining, ShutdownState::Stopped)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == ShutdownState::Stopped
    }
}

/// Outcome of a completed shutdown sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// True when the grace period expired and in-flight jobs were abandoned.
    pub forced: bool,
}

/// Drives the orderly stop of the pipeline.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    state_tx: watch::Sender<ShutdownState>,
    grace_period: Duration,
}

impl ShutdownCoordinator {
    pub fn new(grace_period: Duration) -> Self {
        let (state_tx, _) = watch::channel(ShutdownState::Running);
        Self {
            state_tx,
            grace_period,
        }
    }

    /// Current state.
    pub fn state(&self) -> ShutdownState {
        *self.state_tx.borrow()
    }

    /// Watch handle for observers awaiting state changes.
    pub fn subscribe(&self) -> watch::Receiver<ShutdownState> {
        self.state_tx.subscribe()
    }

    /// Transition to `next`, enforcing forward-only movement.
    fn transition(&self, next: ShutdownState) -> Result<()> {
        let current = self.state();
        if !current.can_transition_to(next) {
            return Err(Error::state_transition(format!(
                "cannot transition {:?} -> {:?}",
                current, next
            )));
        }
        self.state_tx.send_replace(next);
        tracing::info!(from = ?current, to = ?next, "shutdown state transition");
        Ok(())
    }

    /// Wait for `signal`, then drive the pipeline to a stop.
    ///
    /// `signal` is any future — the platform interrupt in production, an
    /// arbitrary trigger in tests. A second invocation after draining has
    /// begun fails with a state-transition error.
    pub async fn run(
        &self,
        signal: impl Future<Output = ()>,
        pool: &WorkerPool,
        limiter: &IntervalLimiter,
        results: &BoundedQueue<JobResult>,
    ) -> Result<ShutdownReport> {
        signal.await;
        self.drain(pool, limiter, results).await
    }

    /// Begin draining immediately (interrupt already observed).
    pub async fn drain(
        &self,
        pool: &WorkerPool,
        limiter: &IntervalLimiter,
        results: &BoundedQueue<JobResult>,
    ) -> Result<ShutdownReport> {
        self.transition(ShutdownState::Draining)?;

        // No new jobs; release producers blocked in the limiter.
        pool.close();
        limiter.stop();

        // Grace-period timer starts at the draining transition.
        let forced = match tokio::time::timeout(self.grace_period, pool.join()).await {
            Ok(()) => {
                tracing::info!("drain complete within grace period");
                false
            }
            Err(_) => {
                let err = Error::grace_expired(format!(
                    "drain exceeded grace period of {:?}",
                    self.grace_period
                ));
                tracing::warn!(%err, "abandoning in-flight jobs");
                pool.abort().await;
                true
            }
        };

        // Terminal: release owned resources. Closing the result channel
        // leaves already-produced results consumable; results of abandoned
        // jobs never materialize.
        results.close();
        self.transition(ShutdownState::Stopped)?;

        Ok(ShutdownReport { forced })
    }
}
