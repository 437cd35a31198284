//! Hardware parallelism and process-wide worker settings.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use crate::error::{Result, SampleError};

/// Environment variable capping the workers spawned per call.
pub const MAX_THREADS_ENV: &str = "MC_PI_MAX_THREADS";

// 0 means "not set": fall back to `available_parallelism()`.
static DEFAULT_THREADS: AtomicUsize = AtomicUsize::new(0);

static WORKER_LIMIT: OnceLock<Option<usize>> = OnceLock::new();

/// Number of workers the host can run in parallel. Always at least 1.
///
/// Queried fresh on every call, so CPU affinity masks and cgroup quotas
/// are honoured where the platform reports them.
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Sets the process-wide worker count used by [`crate::sample_default`].
///
/// Read at the start of each `sample_default` call. Changing it while
/// another thread is sampling affects only calls that start afterwards.
pub fn set_thread_count(n: usize) -> Result<()> {
    if n == 0 {
        return Err(SampleError::zero("thread_count"));
    }
    DEFAULT_THREADS.store(n, Ordering::Relaxed);
    Ok(())
}

/// Current process-wide worker count; [`available_parallelism`] until set.
pub fn default_thread_count() -> usize {
    match DEFAULT_THREADS.load(Ordering::Relaxed) {
        0 => available_parallelism(),
        n => n,
    }
}

/// Upper bound on workers per call from `MC_PI_MAX_THREADS`, read once.
pub fn worker_limit() -> Option<usize> {
    *WORKER_LIMIT.get_or_init(|| parse_limit(std::env::var(MAX_THREADS_ENV).ok().as_deref()))
}

fn parse_limit(raw: Option<&str>) -> Option<usize> {
    let raw = raw?.trim();
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            tracing::warn!(value = raw, "ignoring invalid {}", MAX_THREADS_ENV);
            None
        }
    }
}

/// Workers actually spawned for a call: the request clamped to the batch
/// size and to the optional limit.
pub fn effective_workers(batch_size: usize, thread_count: usize, limit: Option<usize>) -> usize {
    let n = thread_count.min(batch_size);
    match limit {
        Some(limit) => n.min(limit),
        None => n,
    }
}
