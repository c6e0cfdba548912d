//! Worker pool — fixed-size set of concurrent job executors.
//!
//! `WorkerPool::start` spawns N long-lived tasks, each pulling from the
//! shared job queue until it is closed and drained, and pushing exactly one
//! `JobResult` per consumed job to the result channel. The result enqueue
//! blocks when the channel is full — deliberate backpressure so a slow
//! collector throttles upstream production.
//!
//! Failure containment: a job whose processing fails still yields a result
//! (marked failed), and the worker moves on to the next job. Workers never
//! communicate with each other; the queues are the only coordination.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::job::{Job, JobResult};
use crate::queue::BoundedQueue;
use crate::types::{Error, Result};

/// Processing function executed by workers, one call per job.
///
/// `Err` is a *job* failure: it is recorded in the job's `JobResult` and
/// never terminates the worker or the pool.
#[async_trait]
pub trait JobProcessor: Send + Sync + 'static {
    async fn process(&self, job: &Job) -> std::result::Result<Vec<u8>, String>;
}

/// Fixed-size pool of concurrent workers.
#[derive(Debug)]
pub struct WorkerPool {
    jobs: BoundedQueue<Job>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    workers: usize,
}

impl WorkerPool {
    /// Launch `workers` concurrent workers against the given queues.
    ///
    /// Startup is all-or-nothing: a zero-sized pool is a validation error,
    /// fatal to the caller per the startup failure policy.
    pub fn start(
        workers: usize,
        jobs: BoundedQueue<Job>,
        results: BoundedQueue<JobResult>,
        processor: Arc<dyn JobProcessor>,
    ) -> Result<Self> {
        if workers == 0 {
            return Err(Error::validation("worker pool size must be at least 1"));
        }

        let handles = (0..workers)
            .map(|worker| {
                let jobs = jobs.clone();
                let results = results.clone();
                let processor = processor.clone();
                tokio::spawn(worker_loop(worker, jobs, results, processor))
            })
            .collect();

        tracing::info!(workers, "worker pool started");

        Ok(Self {
            jobs,
            handles: Mutex::new(handles),
            workers,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Close the job queue: no new jobs are accepted, already-enqueued jobs
    /// continue to be drained. Idempotent.
    pub fn close(&self) {
        self.jobs.close();
    }

    /// Wait for every worker to drain and terminate.
    ///
    /// Idempotent: handles are joined at most once; later calls return
    /// immediately.
    pub async fn join(&self) {
        let handles = {
            let mut guard = self.handles.lock().await;
            std::mem::take(&mut *guard)
        };
        for handle in handles {
            // A worker that panicked or was aborted is already gone; joining
            // it is not an error from the pool's point of view.
            let _ = handle.await;
        }
    }

    /// Close the job queue and wait for all workers to terminate.
    /// Safe to invoke multiple times.
    pub async fn stop(&self) {
        self.close();
        self.join().await;
        tracing::info!("worker pool stopped");
    }

    /// Force-cancel still-running workers, abandoning their in-flight job
    /// executions. Last-resort path for grace-period expiry; eventual
    /// results of abandoned jobs are discarded.
    pub async fn abort(&self) {
        let handles = {
            let mut guard = self.handles.lock().await;
            std::mem::take(&mut *guard)
        };
        let abandoned = handles.len();
        for handle in handles {
            handle.abort();
        }
        if abandoned > 0 {
            tracing::warn!(abandoned, "worker pool aborted with workers still running");
        }
    }
}

/// One worker: dequeue → process → enqueue result, until end-of-stream.
async fn worker_loop(
    worker: usize,
    jobs: BoundedQueue<Job>,
    results: BoundedQueue<JobResult>,
    processor: Arc<dyn JobProcessor>,
) {
    tracing::debug!(worker, "worker started");

    while let Some(job) = jobs.dequeue().await {
        tracing::debug!(worker, job_id = %job.id, "processing job");

        let result = match processor.process(&job).await {
            Ok(output) => JobResult::success(job.id.clone(), worker, output),
            Err(reason) => {
                tracing::debug!(worker, job_id = %job.id, %reason, "job failed");
                JobResult::failure(job.id.clone(), worker, reason)
            }
        };

        // Blocking enqueue: a full result channel throttles this worker.
        // The only way this fails is the collector side closing mid-drain
        // (forced shutdown), at which point the worker winds down.
        if results.enqueue(result).await.is_err() {
            tracing::debug!(worker, "result channel closed, worker exiting");
            break;
        }
    }

    tracing::debug!(worker, "worker terminated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobId;
    use std::collections::HashSet;
    use std::time::Duration;

    /// Echoes the payload back, uppercased; fails on the marker payload.
    struct EchoProcessor;

    #[async_trait]
    impl JobProcessor for EchoProcessor {
        async fn process(&self, job: &Job) -> std::result::Result<Vec<u8>, String> {
            if job.payload == b"fail" {
                return Err("marker payload".to_string());
            }
            Ok(job.payload.to_ascii_uppercase())
        }
    }

    fn job(n: usize) -> Job {
        Job::with_id(
            JobId::from_string(format!("job-{n}")).unwrap(),
            format!("payload-{n}").into_bytes(),
        )
    }

    #[tokio::test]
    async fn test_every_job_yields_exactly_one_result() {
        let jobs = BoundedQueue::new("jobs", 10);
        let results = BoundedQueue::new("results", 10);
        let pool =
            WorkerPool::start(3, jobs.clone(), results.clone(), Arc::new(EchoProcessor)).unwrap();

        for n in 0..9 {
            jobs.enqueue(job(n)).await.unwrap();
        }
        pool.stop().await;

        let mut seen = HashSet::new();
        while let Some(result) = results.dequeue().await {
            assert!(!result.is_failed());
            assert!(seen.insert(result.job_id.clone()), "duplicate result");
            if seen.len() == 9 {
                break;
            }
        }
        assert_eq!(seen.len(), 9);
    }

    #[tokio::test]
    async fn test_failed_job_produces_failed_result_and_worker_survives() {
        let jobs = BoundedQueue::new("jobs", 4);
        let results = BoundedQueue::new("results", 4);
        let pool =
            WorkerPool::start(1, jobs.clone(), results.clone(), Arc::new(EchoProcessor)).unwrap();

        jobs.enqueue(Job::with_id(
            JobId::from_string("bad".into()).unwrap(),
            b"fail".to_vec(),
        ))
        .await
        .unwrap();
        jobs.enqueue(Job::with_id(
            JobId::from_string("good".into()).unwrap(),
            b"ok".to_vec(),
        ))
        .await
        .unwrap();
        pool.stop().await;

        let first = results.dequeue().await.unwrap();
        assert_eq!(first.job_id.as_str(), "bad");
        assert!(first.is_failed());
        assert_eq!(first.error.as_deref(), Some("marker payload"));

        // The same (sole) worker processed the next job
        let second = results.dequeue().await.unwrap();
        assert_eq!(second.job_id.as_str(), "good");
        assert!(!second.is_failed());
        assert_eq!(second.output, b"OK");
        assert_eq!(second.worker, first.worker);
    }

    #[tokio::test]
    async fn test_zero_workers_rejected() {
        let jobs = BoundedQueue::new("jobs", 1);
        let results = BoundedQueue::new("results", 1);
        let err = WorkerPool::start(0, jobs, results, Arc::new(EchoProcessor)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let jobs = BoundedQueue::new("jobs", 1);
        let results = BoundedQueue::new("results", 1);
        let pool = WorkerPool::start(2, jobs, results, Arc::new(EchoProcessor)).unwrap();

        pool.stop().await;
        pool.stop().await;
        pool.stop().await;
    }

    #[tokio::test]
    async fn test_result_backpressure_throttles_worker() {
        // Result channel of capacity 1 and no collector: the worker parks on
        // the result enqueue and the second job stays in the job queue.
        let jobs = BoundedQueue::new("jobs", 4);
        let results = BoundedQueue::new("results", 1);
        let _pool =
            WorkerPool::start(1, jobs.clone(), results.clone(), Arc::new(EchoProcessor)).unwrap();

        jobs.enqueue(job(0)).await.unwrap();
        jobs.enqueue(job(1)).await.unwrap();
        jobs.enqueue(job(2)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        // One result buffered, one job being processed or waiting, rest queued
        assert_eq!(results.len(), 1);
        assert!(jobs.len() >= 1);

        // Draining the collector side lets everything flow
        let mut collected = 0;
        while collected < 3 {
            results.dequeue().await.unwrap();
            collected += 1;
        }
    }
}
