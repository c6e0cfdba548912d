//! Foreman demo binary - main entry point.
//!
//! Plays the external collaborators the core itself does not provide: a
//! producer submitting synthetic jobs, a collector draining results, and
//! the platform interrupt wired to the shutdown coordinator. Press Ctrl+C
//! to watch the graceful drain.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use foreman_core::job::Job;
use foreman_core::pool::JobProcessor;
use foreman_core::types::{Config, JobId};
use foreman_core::Dispatcher;

#[derive(Debug, Parser)]
#[command(name = "foreman", about = "Concurrent job dispatch demo")]
struct Args {
    /// Number of concurrent workers.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Job queue capacity.
    #[arg(long, default_value_t = 64)]
    job_capacity: usize,

    /// Result channel capacity.
    #[arg(long, default_value_t = 64)]
    result_capacity: usize,

    /// Minimum interval between job admissions, in milliseconds.
    #[arg(long, default_value_t = 100)]
    rate_interval_ms: u64,

    /// Shutdown grace period, in seconds.
    #[arg(long, default_value_t = 10)]
    grace_secs: u64,

    /// Number of synthetic jobs to submit (0 = produce until interrupted).
    #[arg(long, default_value_t = 0)]
    jobs: usize,

    /// Simulated per-job processing time, in milliseconds.
    #[arg(long, default_value_t = 250)]
    work_ms: u64,
}

/// Simulates work by sleeping, then echoes the payload back.
#[derive(Debug)]
struct DemoProcessor {
    work: Duration,
}

#[async_trait::async_trait]
impl JobProcessor for DemoProcessor {
    async fn process(&self, job: &Job) -> Result<Vec<u8>, String> {
        tokio::time::sleep(self.work).await;
        Ok(job.payload.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    foreman_core::observability::init_tracing();

    let mut config = Config::default();
    config.pool.workers = args.workers;
    config.queue.job_capacity = args.job_capacity;
    config.queue.result_capacity = args.result_capacity;
    config.limiter.interval = Duration::from_millis(args.rate_interval_ms);
    config.shutdown.grace_period = Duration::from_secs(args.grace_secs);

    let dispatcher = Arc::new(Dispatcher::new(
        &config,
        Arc::new(DemoProcessor {
            work: Duration::from_millis(args.work_ms),
        }),
    )?);

    // Producer: submit synthetic jobs until done or draining begins.
    let producer = {
        let dispatcher = dispatcher.clone();
        let total = args.jobs;
        tokio::spawn(async move {
            let mut n = 0usize;
            loop {
                if total != 0 && n >= total {
                    break;
                }
                let id = match JobId::from_string(format!("job-{n}")) {
                    Ok(id) => id,
                    Err(_) => break,
                };
                let job = Job::with_id(id, format!("payload-{n}").into_bytes());
                if let Err(err) = dispatcher.submit(job).await {
                    tracing::info!(%err, "producer stopping");
                    break;
                }
                n += 1;
            }
            tracing::info!(submitted = n, "producer finished");
        })
    };

    // Collector: drain results until the pipeline stops.
    let collector = {
        let results = dispatcher.results();
        tokio::spawn(async move {
            let mut collected = 0usize;
            let mut failed = 0usize;
            while let Some(result) = results.dequeue().await {
                collected += 1;
                if result.is_failed() {
                    failed += 1;
                    tracing::warn!(job_id = %result.job_id, error = ?result.error, "job failed");
                } else {
                    tracing::info!(job_id = %result.job_id, worker = result.worker, "job done");
                }
            }
            tracing::info!(collected, failed, "collector finished");
        })
    };

    tracing::info!("foreman running, press Ctrl+C to stop");

    let report = dispatcher
        .run_until(async {
            if let Err(err) = foreman_core::shutdown::interrupt().await {
                tracing::error!(%err, "failed to listen for interrupt");
            }
        })
        .await?;

    producer.await?;
    collector.await?;

    if report.forced {
        tracing::warn!("stopped after grace period expiry, in-flight jobs abandoned");
    } else {
        tracing::info!("stopped cleanly");
    }

    Ok(())
}
