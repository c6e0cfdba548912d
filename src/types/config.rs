//! Configuration structures.
//!
//! Configuration is supplied by the embedding application as plain values;
//! every section has production defaults and deserializes from config files
//! or environment-driven sources if the embedder wants that.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Error, Result};

/// Global dispatch system configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Worker pool configuration.
    #[serde(default)]
    pub pool: PoolConfig,

    /// Queue capacities.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Rate limiter configuration.
    #[serde(default)]
    pub limiter: LimiterConfig,

    /// Shutdown configuration.
    #[serde(default)]
    pub shutdown: ShutdownConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Validate startup parameters. A failure here is fatal to the whole
    /// system; nothing is partially constructed on error.
    pub fn validate(&self) -> Result<()> {
        if self.pool.workers == 0 {
            return Err(Error::validation("pool.workers must be at least 1"));
        }
        if self.queue.job_capacity == 0 {
            return Err(Error::validation("queue.job_capacity must be at least 1"));
        }
        if self.queue.result_capacity == 0 {
            return Err(Error::validation(
                "queue.result_capacity must be at least 1",
            ));
        }
        if self.limiter.interval.is_zero() {
            return Err(Error::validation("limiter.interval must be non-zero"));
        }
        Ok(())
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of concurrent workers.
    pub workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Bounded queue capacities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Job queue capacity. Producers block (or get `QueueFull` from the
    /// non-blocking variant) once this many jobs are pending.
    pub job_capacity: usize,

    /// Result channel capacity. A slow collector throttles the workers
    /// through this bound.
    pub result_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            job_capacity: 64,
            result_capacity: 64,
        }
    }
}

/// Rate limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Minimum interval between two consecutive admissions.
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// Grace period allowed for in-flight jobs to drain after the interrupt
    /// notification. Jobs still running at expiry are abandoned.
    #[serde(with = "humantime_serde")]
    pub grace_period: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(10),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = Config::default();
        config.pool.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = Config::default();
        config.queue.job_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.queue.result_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = Config::default();
        config.limiter.interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_durations_roundtrip_humantime() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("100ms"));
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.limiter.interval, config.limiter.interval);
    }
}
