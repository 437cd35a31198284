//! Parallel Monte Carlo sampling engine for estimating π.
//!
//! Points are drawn uniformly from the square `[-1, 1] x [-1, 1]` and
//! classified as inside or outside the unit circle. The fraction inside
//! approaches π/4; turning a stream of batches into an estimate is left to
//! the caller.
//!
//! ```no_run
//! let batch = mc_pi::sample(100_000, 4)?;
//! let pi = 4.0 * batch.inside_count() as f64 / batch.len() as f64;
//! println!("pi ~ {pi:.4} on {} cores", mc_pi::available_parallelism());
//! # Ok::<(), mc_pi::SampleError>(())
//! ```
//!
//! A call partitions the batch into near-equal shares, one per worker,
//! and every worker draws from its own ChaCha8 stream, so workers share no
//! mutable state. Results are laid out in worker-index order.

pub mod capacity;
pub mod error;
pub mod partition;
pub mod point;
pub mod pool;
pub mod rng;
pub mod sampler;

pub use capacity::{available_parallelism, default_thread_count, set_thread_count, MAX_THREADS_ENV};
pub use error::{Result, SampleError};
pub use partition::{Partition, WorkerShare};
pub use point::{is_inside, SampleBatch, SamplePoint};
pub use pool::PooledSampler;
pub use rng::WorkerRng;
pub use sampler::{sample, sample_default, BatchSampler, Sampler};
