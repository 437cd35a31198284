//! Per-worker random streams.
//!
//! Every worker owns a [`WorkerRng`]: a ChaCha8 generator keyed by the
//! call's base seed, with the worker index as its stream id. Streams with
//! different ids never overlap, so workers of the same call never see
//! correlated draws and never touch each other's state.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::point::SamplePoint;

/// Draws a base seed from OS entropy.
pub fn fresh_seed() -> u64 {
    OsRng.next_u64()
}

/// Uniform point generator private to one worker.
#[derive(Debug, Clone)]
pub struct WorkerRng {
    inner: ChaCha8Rng,
    range: Uniform<f64>,
}

impl WorkerRng {
    pub fn new(base_seed: u64, stream: u64) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(base_seed);
        inner.set_stream(stream);
        Self {
            inner,
            range: Uniform::new_inclusive(-1.0, 1.0),
        }
    }

    /// Draws one point; `x` and `y` are independent draws in `[-1, 1]`.
    #[inline]
    pub fn next_point(&mut self) -> SamplePoint {
        let x = self.range.sample(&mut self.inner);
        let y = self.range.sample(&mut self.inner);
        SamplePoint::new(x, y)
    }

    /// Overwrites every slot of `out` with a fresh point.
    pub fn fill(&mut self, out: &mut [SamplePoint]) {
        for slot in out.iter_mut() {
            *slot = self.next_point();
        }
    }
}
