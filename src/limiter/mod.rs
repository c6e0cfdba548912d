//! Rate limiting and throttling.
//!
//! Tick-driven admission gate: each tick of a fixed-interval ticker produces
//! one admission token, and `allow()` consumes exactly one token per call.
//! Callers arriving faster than the interval wait out the remainder; the
//! interval between two consecutive admissions never drops below the
//! configured duration.
//!
//! Composed in front of a producer or worker by calling `allow()` right
//! before handing a unit of work to the next stage, which decouples the
//! production rate from the processing rate.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::types::{Error, Result};

/// Tick-driven rate limiter.
///
/// Shared by reference across producers; the ticker itself is serialized
/// behind a mutex so concurrent `allow()` calls queue up for tokens in lock
/// order.
#[derive(Debug)]
pub struct IntervalLimiter {
    ticker: Mutex<Interval>,
    interval: Duration,
    cancel: CancellationToken,
}

impl IntervalLimiter {
    /// Create a limiter admitting at most one unit of work per `period`.
    pub fn new(period: Duration) -> Self {
        let mut ticker = interval(period);
        // Delay, not burst: a late tick must not compress the gap to the
        // next admission below the configured interval.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ticker: Mutex::new(ticker),
            interval: period,
            cancel: CancellationToken::new(),
        }
    }

    /// Wait for the next admission slot.
    ///
    /// Returns `Cancelled` if the limiter is stopped while waiting — a
    /// blocked caller is always released, never left waiting forever.
    pub async fn allow(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::cancelled("rate limiter stopped"));
        }
        let mut ticker = self.ticker.lock().await;
        tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::cancelled("rate limiter stopped")),
            _ = ticker.tick() => Ok(()),
        }
    }

    /// Stop the limiter, releasing any caller blocked in [`allow`](Self::allow).
    /// Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The configured minimum gap between admissions.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
