//! Splitting a batch into per-worker shares.

/// The contiguous range of the output a single worker fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerShare {
    /// Worker index, also used as the worker's random stream id.
    pub index: usize,
    /// Offset of the share's first point in the batch.
    pub start: usize,
    /// Number of points this worker produces. Never zero.
    pub len: usize,
}

/// Iterator over the shares of a batch.
///
/// The worker count is clamped to `batch_size`, and the first
/// `batch_size % workers` shares carry one extra point, so any two shares
/// differ by at most one and the lengths sum to `batch_size`.
#[derive(Debug, Clone)]
pub struct Partition {
    workers: usize,
    base: usize,
    remainder: usize,
    next_index: usize,
    next_start: usize,
}

impl Partition {
    pub fn new(batch_size: usize, workers: usize) -> Self {
        let workers = workers.min(batch_size);
        let (base, remainder) = if workers == 0 {
            (0, 0)
        } else {
            (batch_size / workers, batch_size % workers)
        };
        Self {
            workers,
            base,
            remainder,
            next_index: 0,
            next_start: 0,
        }
    }

    /// Number of shares (and therefore worker threads).
    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Iterator for Partition {
    type Item = WorkerShare;

    fn next(&mut self) -> Option<WorkerShare> {
        if self.next_index >= self.workers {
            return None;
        }
        let index = self.next_index;
        let len = self.base + usize::from(index < self.remainder);
        let share = WorkerShare {
            index,
            start: self.next_start,
            len,
        };
        self.next_index += 1;
        self.next_start += len;
        Some(share)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.workers - self.next_index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Partition {}
