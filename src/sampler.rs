use std::io;
use std::thread;

use tracing::{debug, trace};

use crate::capacity::{default_thread_count, effective_workers, worker_limit};
use crate::error::{Result, SampleError};
use crate::partition::Partition;
use crate::point::{SampleBatch, SamplePoint};
use crate::rng::{fresh_seed, WorkerRng};

/// Something that turns `(batch_size, thread_count)` into a complete batch.
///
/// Implementations block until every worker has finished and either return
/// exactly `batch_size` points or an error, never a short batch.
pub trait BatchSampler {
    fn sample(&self, batch_size: usize, thread_count: usize) -> Result<SampleBatch>;
}

pub(crate) fn validate(batch_size: usize, thread_count: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(SampleError::zero("batch_size"));
    }
    if thread_count == 0 {
        return Err(SampleError::zero("thread_count"));
    }
    Ok(())
}

/// Splits `points` along `partition` and hands each worker its own slice.
pub(crate) fn shares_with_slices(
    points: &mut [SamplePoint],
    partition: Partition,
) -> impl Iterator<Item = (usize, &mut [SamplePoint])> {
    let mut rest = points;
    partition.map(move |share| {
        let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(share.len);
        rest = tail;
        (share.index, chunk)
    })
}

/// Spawns fresh OS threads for every call and joins them before returning.
///
/// Each call draws a new base seed from OS entropy unless one was fixed
/// with [`Sampler::with_seed`]. Sampler values hold no mutable state, so
/// one instance may be shared between caller threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sampler {
    seed: Option<u64>,
}

impl Sampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the base seed, making output reproducible for a given
    /// `(batch_size, thread_count)`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl BatchSampler for Sampler {
    fn sample(&self, batch_size: usize, thread_count: usize) -> Result<SampleBatch> {
        validate(batch_size, thread_count)?;

        let workers = effective_workers(batch_size, thread_count, worker_limit());
        let base_seed = self.seed.unwrap_or_else(fresh_seed);
        debug!(batch_size, requested = thread_count, workers, "sampling batch");

        spawn_shares(batch_size, workers, worker_builder, |worker, chunk| {
            WorkerRng::new(base_seed, worker as u64).fill(chunk)
        })
    }
}

fn worker_builder(worker: usize) -> io::Result<thread::Builder> {
    Ok(thread::Builder::new().name(format!("mc-pi-worker-{worker}")))
}

/// Runs `fill` for every share on its own scoped thread made by `builder`.
///
/// Every thread that was started is joined before this returns, even when
/// a later spawn fails or a worker panics. On error the points are dropped.
pub(crate) fn spawn_shares<B, F>(batch_size: usize, workers: usize, builder: B, fill: F) -> Result<SampleBatch>
where
    B: Fn(usize) -> io::Result<thread::Builder>,
    F: Fn(usize, &mut [SamplePoint]) + Sync,
{
    let mut points = vec![SamplePoint::default(); batch_size];
    let fill = &fill;

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        let mut spawn_error = None;

        for (worker, chunk) in shares_with_slices(&mut points, Partition::new(batch_size, workers)) {
            let spawned = builder(worker).and_then(|b| {
                b.spawn_scoped(scope, move || {
                    trace!(worker, len = chunk.len(), "worker started");
                    fill(worker, chunk);
                })
            });
            match spawned {
                Ok(handle) => handles.push((worker, handle)),
                Err(e) => {
                    spawn_error = Some(SampleError::ResourceExhausted {
                        worker: Some(worker),
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        let mut first_panic = None;
        for (worker, handle) in handles {
            if handle.join().is_err() && first_panic.is_none() {
                first_panic = Some(SampleError::WorkerPanicked { worker });
            }
        }

        match spawn_error.or(first_panic) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    })?;

    Ok(SampleBatch::from_points(points))
}

/// Samples `batch_size` points using `thread_count` freshly spawned workers.
pub fn sample(batch_size: usize, thread_count: usize) -> Result<SampleBatch> {
    Sampler::new().sample(batch_size, thread_count)
}

/// Like [`sample`], with the process-wide default from
/// [`crate::set_thread_count`].
pub fn sample_default(batch_size: usize) -> Result<SampleBatch> {
    sample(batch_size, default_thread_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_single_point() {
        let batch = sample(1, 1).unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_more_threads_than_points() {
        let batch = sample(5, 100).unwrap();
        assert_eq!(batch.len(), 5);
    }

    #[test]
    fn test_rejects_zero_counts() {
        assert!(sample(0, 1).unwrap_err().is_invalid_argument());
        assert!(sample(5, 0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let sampler = Sampler::new().with_seed(7);
        let a = sampler.sample(10_001, 4).unwrap();
        let b = sampler.sample(10_001, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_worker_index_order() {
        // Worker 1's share begins right after worker 0's, drawn from stream 1.
        let seed = 99;
        let batch = Sampler::new().with_seed(seed).sample(9, 2).unwrap();
        let mut stream0 = WorkerRng::new(seed, 0);
        let mut stream1 = WorkerRng::new(seed, 1);
        for p in &batch.points()[..5] {
            assert_eq!(*p, stream0.next_point());
        }
        for p in &batch.points()[5..] {
            assert_eq!(*p, stream1.next_point());
        }
    }

    #[test]
    fn test_unseeded_calls_differ() {
        let a = sample(64, 2).unwrap();
        let b = sample(64, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_spawn_failure_joins_started_workers() {
        let finished = AtomicUsize::new(0);
        let result = spawn_shares(
            1000,
            4,
            |worker| {
                if worker == 2 {
                    Err(io::Error::new(io::ErrorKind::WouldBlock, "thread limit reached"))
                } else {
                    worker_builder(worker)
                }
            },
            |worker, chunk| {
                WorkerRng::new(1, worker as u64).fill(chunk);
                finished.fetch_add(1, Ordering::SeqCst);
            },
        );

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            SampleError::ResourceExhausted { worker: Some(2), .. }
        ));
        assert!(err.to_string().contains("thread limit reached"));
        // Workers 0 and 1 ran to completion; nothing past the failed spawn started.
        assert_eq!(finished.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_worker_panic_is_reported_after_all_joins() {
        let finished = AtomicUsize::new(0);
        let result = spawn_shares(1000, 4, worker_builder, |worker, chunk| {
            if worker == 3 {
                panic!("worker {worker} failed");
            }
            WorkerRng::new(1, worker as u64).fill(chunk);
            finished.fetch_add(1, Ordering::SeqCst);
        });

        assert!(matches!(
            result.unwrap_err(),
            SampleError::WorkerPanicked { worker: 3 }
        ));
        assert_eq!(finished.load(Ordering::SeqCst), 3);
    }
}
