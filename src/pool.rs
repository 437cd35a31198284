//! Long-lived worker pool alternative to per-call thread spawning.
//!
//! [`PooledSampler`] builds its threads once and reuses them for every
//! call. Shares are spawned as tasks inside a pool scope; when a call asks
//! for more shares than the pool has threads, the extra shares queue
//! instead of oversubscribing the OS. Output layout and seeding are the
//! same as [`crate::Sampler`], so for a fixed seed both produce identical
//! batches.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace};

use crate::capacity::{effective_workers, worker_limit};
use crate::error::{Result, SampleError};
use crate::partition::Partition;
use crate::point::{SampleBatch, SamplePoint};
use crate::rng::{fresh_seed, WorkerRng};
use crate::sampler::{shares_with_slices, validate, BatchSampler};

const NO_PANIC: usize = usize::MAX;

pub struct PooledSampler {
    pool: ThreadPool,
    seed: Option<u64>,
}

impl PooledSampler {
    /// Builds a pool of `threads` named worker threads.
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(SampleError::zero("threads"));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("mc-pi-pool-{i}"))
            .build()
            .map_err(|e| SampleError::ResourceExhausted {
                worker: None,
                reason: e.to_string(),
            })?;
        debug!(threads, "worker pool started");
        Ok(Self { pool, seed: None })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of threads owned by the pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl std::fmt::Debug for PooledSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledSampler")
            .field("threads", &self.threads())
            .field("seed", &self.seed)
            .finish()
    }
}

impl BatchSampler for PooledSampler {
    fn sample(&self, batch_size: usize, thread_count: usize) -> Result<SampleBatch> {
        validate(batch_size, thread_count)?;

        let workers = effective_workers(batch_size, thread_count, worker_limit());
        let base_seed = self.seed.unwrap_or_else(fresh_seed);
        debug!(
            batch_size,
            requested = thread_count,
            workers,
            pool_threads = self.threads(),
            "sampling batch on pool"
        );

        self.run_shares(batch_size, workers, |worker, chunk| {
            WorkerRng::new(base_seed, worker as u64).fill(chunk)
        })
    }
}

impl PooledSampler {
    /// Runs `fill` for every share as a task in one pool scope.
    ///
    /// The scope waits for every task; a panicking task is caught and
    /// reported as [`SampleError::WorkerPanicked`] once all have finished.
    pub(crate) fn run_shares<F>(&self, batch_size: usize, workers: usize, fill: F) -> Result<SampleBatch>
    where
        F: Fn(usize, &mut [SamplePoint]) + Sync,
    {
        let mut points = vec![SamplePoint::default(); batch_size];
        let panicked = AtomicUsize::new(NO_PANIC);
        let fill = &fill;

        self.pool.scope(|scope| {
            for (worker, chunk) in shares_with_slices(&mut points, Partition::new(batch_size, workers)) {
                let panicked = &panicked;
                scope.spawn(move |_| {
                    trace!(worker, len = chunk.len(), "pool task started");
                    let run = panic::catch_unwind(AssertUnwindSafe(|| fill(worker, chunk)));
                    if run.is_err() {
                        let _ = panicked.compare_exchange(
                            NO_PANIC,
                            worker,
                            Ordering::Relaxed,
                            Ordering::Relaxed,
                        );
                    }
                });
            }
        });

        match panicked.into_inner() {
            NO_PANIC => Ok(SampleBatch::from_points(points)),
            worker => Err(SampleError::WorkerPanicked { worker }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sampler;

    #[test]
    fn test_rejects_empty_pool() {
        assert!(PooledSampler::new(0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_more_shares_than_pool_threads() {
        let pool = PooledSampler::new(2).unwrap();
        assert_eq!(pool.threads(), 2);
        let batch = pool.sample(10_000, 16).unwrap();
        assert_eq!(batch.len(), 10_000);
    }

    #[test]
    fn test_matches_spawning_sampler_for_fixed_seed() {
        let pooled = PooledSampler::new(3).unwrap().with_seed(11);
        let spawned = Sampler::new().with_seed(11);
        assert_eq!(
            pooled.sample(5_003, 4).unwrap(),
            spawned.sample(5_003, 4).unwrap()
        );
    }

    #[test]
    fn test_invalid_arguments() {
        let pool = PooledSampler::new(1).unwrap();
        assert!(pool.sample(0, 1).unwrap_err().is_invalid_argument());
        assert!(pool.sample(1, 0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_task_panic_reports_worker_index() {
        let pool = PooledSampler::new(2).unwrap();
        let finished = AtomicUsize::new(0);
        let result = pool.run_shares(1000, 5, |worker, chunk| {
            if worker == 4 {
                panic!("worker {worker} failed");
            }
            WorkerRng::new(1, worker as u64).fill(chunk);
            finished.fetch_add(1, Ordering::SeqCst);
        });

        assert!(matches!(
            result.unwrap_err(),
            SampleError::WorkerPanicked { worker: 4 }
        ));
        // The other shares still ran to completion before the call returned.
        assert_eq!(finished.load(Ordering::SeqCst), 4);

        // The pool survives a panicking task.
        assert_eq!(pool.sample(1000, 5).unwrap().len(), 1000);
    }
}
