//! Async adapter for calling the sampling engine from a tokio runtime.
//!
//! Sampling is CPU-bound and blocks until every worker has joined, so each
//! call is moved onto tokio's blocking pool instead of running on an async
//! worker thread.

use mc_pi::{SampleBatch, SampleError};
use thiserror::Error;
use tokio::task::{self, JoinError};
use tracing::debug;

#[derive(Debug, Error)]
pub enum AsyncSampleError {
    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error("sampling task failed: {0}")]
    Join(#[from] JoinError),
}

/// Totals of one completed call, kept instead of the points themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub len: usize,
    pub inside: usize,
    /// True if every coordinate was finite and inside `[-1, 1]`.
    pub well_formed: bool,
}

impl From<&SampleBatch> for BatchSummary {
    fn from(batch: &SampleBatch) -> Self {
        let well_formed = batch.iter().all(|p| {
            p.x.is_finite() && p.y.is_finite() && (-1.0..=1.0).contains(&p.x) && (-1.0..=1.0).contains(&p.y)
        });
        Self {
            len: batch.len(),
            inside: batch.inside_count(),
            well_formed,
        }
    }
}

/// Runs [`mc_pi::sample`] on the blocking pool and awaits the full batch.
pub async fn sample_async(batch_size: usize, thread_count: usize) -> Result<SampleBatch, AsyncSampleError> {
    let batch = task::spawn_blocking(move || mc_pi::sample(batch_size, thread_count)).await??;
    Ok(batch)
}

/// Fires `calls` concurrent sampling calls and summarises each one.
///
/// Summaries come back in call order. Each batch is dropped as soon as it
/// is summarised, so memory stays bounded by the calls in flight.
pub async fn sample_concurrently(
    calls: usize,
    batch_size: usize,
    thread_count: usize,
) -> Result<Vec<BatchSummary>, AsyncSampleError> {
    debug!(calls, batch_size, thread_count, "starting concurrent calls");

    let mut handles = Vec::with_capacity(calls);
    for _ in 0..calls {
        handles.push(task::spawn_blocking(move || {
            mc_pi::sample(batch_size, thread_count).map(|batch| BatchSummary::from(&batch))
        }));
    }

    let mut summaries = Vec::with_capacity(calls);
    for handle in handles {
        summaries.push(handle.await??);
    }
    Ok(summaries)
}
