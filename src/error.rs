//! Error types for the sampling engine.

use thiserror::Error;

/// Errors returned by [`crate::sample`] and the sampler types.
///
/// No variant ever carries a partial batch: a failed call produces nothing.
#[derive(Debug, Error)]
pub enum SampleError {
    /// A caller-supplied count was zero.
    #[error("invalid argument '{name}': {value}")]
    InvalidArgument {
        /// Argument name (`batch_size`, `thread_count`, ...).
        name: &'static str,
        /// Description of the rejected value.
        value: String,
    },

    /// The OS refused to start a worker thread, or a worker pool could not be built.
    #[error("failed to start {}: {reason}", worker_label(.worker))]
    ResourceExhausted {
        /// Index of the worker that could not be started; `None` when a
        /// worker pool failed to build before any share was assigned.
        worker: Option<usize>,
        /// Underlying failure as reported by the OS or pool builder.
        reason: String,
    },

    /// A worker thread panicked before finishing its share.
    #[error("worker {worker} panicked before completing its share")]
    WorkerPanicked {
        /// Index of the worker that panicked.
        worker: usize,
    },
}

impl SampleError {
    pub(crate) fn zero(name: &'static str) -> Self {
        Self::InvalidArgument {
            name,
            value: "must be greater than zero".to_string(),
        }
    }

    /// Returns true for [`SampleError::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Returns true for [`SampleError::ResourceExhausted`].
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, Self::ResourceExhausted { .. })
    }
}

fn worker_label(worker: &Option<usize>) -> String {
    match worker {
        Some(worker) => format!("worker {worker}"),
        None => "worker pool".to_string(),
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SampleError>;
